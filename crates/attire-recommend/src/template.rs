//! Prompt template with named placeholders.

use std::path::Path;

use crate::error::RecommendError;

/// Placeholders every template must carry.
pub const PLACEHOLDERS: [&str; 4] = ["time", "timezone", "currently", "hourly"];

/// A plain-text template with `{time}`, `{timezone}`, `{currently}` and
/// `{hourly}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load the template from a plain-text file.
    pub fn load(path: &Path) -> Result<Self, RecommendError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RecommendError::Template(format!("{}: {e}", path.display())))?;
        Ok(Self::new(text))
    }

    /// Substitute all placeholders. Pure: identical inputs always produce
    /// byte-identical output. A placeholder absent from the template is a
    /// formatting failure.
    pub fn fill(
        &self,
        time: &str,
        timezone: &str,
        currently: &str,
        hourly: &str,
    ) -> Result<String, RecommendError> {
        let substitutions = [
            ("time", time),
            ("timezone", timezone),
            ("currently", currently),
            ("hourly", hourly),
        ];

        for (name, _) in &substitutions {
            if !self.text.contains(&format!("{{{name}}}")) {
                return Err(RecommendError::Format((*name).to_string()));
            }
        }

        let mut filled = self.text.clone();
        for (name, value) in substitutions {
            filled = filled.replace(&format!("{{{name}}}"), value);
        }
        Ok(filled)
    }
}
