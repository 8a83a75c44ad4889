//! Recommendation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The template is missing a required placeholder.
    #[error("template missing placeholder {{{0}}}")]
    Format(String),

    /// The template file could not be read.
    #[error("template file error: {0}")]
    Template(String),

    /// The hosted-model call failed or returned an unusable response.
    #[error("generation failed: {0}")]
    Generation(String),
}
