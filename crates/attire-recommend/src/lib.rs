//! Prompt formatting and the hosted-model generation boundary.

pub mod error;
pub mod generator;
pub mod template;

pub use error::RecommendError;
pub use generator::{Generator, HostedModel};
pub use template::PromptTemplate;
