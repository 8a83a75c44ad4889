//! Explicit chat session state.
//!
//! One session per connection. Conversation history, archived sessions and
//! the transcript are only mutated through these methods; there is no
//! ambient process-wide state.

/// Conversation state for one user connection.
#[derive(Debug, Default)]
pub struct ChatSession {
    /// User inputs, oldest first
    past: Vec<String>,
    /// Bot responses, oldest first, aligned with `past`
    generated: Vec<String>,
    /// Archived transcripts, one per earlier chat
    archived: Vec<Vec<String>>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed interaction.
    pub fn record_turn(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.past.push(user.into());
        self.generated.push(bot.into());
    }

    /// Turns as (user, bot) pairs, newest first for display.
    pub fn turns_newest_first(&self) -> impl Iterator<Item = (&str, &str)> {
        self.past
            .iter()
            .zip(self.generated.iter())
            .rev()
            .map(|(u, g)| (u.as_str(), g.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    /// Archive the current conversation and start fresh.
    pub fn new_chat(&mut self) {
        let mut save = Vec::new();
        for (user, bot) in self.turns_newest_first() {
            save.push(format!("User:{user}"));
            save.push(format!("Bot:{bot}"));
        }
        self.archived.push(save);
        self.past.clear();
        self.generated.clear();
    }

    /// Downloadable transcript of the current conversation, newest first.
    pub fn transcript(&self) -> String {
        let mut lines = Vec::new();
        for (user, bot) in self.turns_newest_first() {
            lines.push(user.to_string());
            lines.push(bot.to_string());
        }
        lines.join("\n")
    }

    pub fn archived(&self) -> &[Vec<String>] {
        &self.archived
    }

    pub fn clear_archived(&mut self) {
        self.archived.clear();
    }
}
