//! Prompt registry, task templates, and the payload builder.

pub mod builder;
pub mod registry;
pub mod templates;

pub use builder::{ChatMessage, PromptBuilder, PromptPayload};
pub use registry::{system_prompt, PromptKind};
