//! Chat session state and the fetch → format → generate pipeline.

pub mod error;
pub mod pipeline;
pub mod session;

pub use error::ChatError;
pub use pipeline::{ChatPipeline, InfoMode};
pub use session::ChatSession;
