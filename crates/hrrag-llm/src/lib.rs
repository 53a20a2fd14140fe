pub mod cache;
pub mod client;
pub mod error;
pub mod prompt;

pub use cache::{CachedChatModel, PromptCache};
pub use client::{ChatModel, GroqClient};
pub use error::LlmError;
pub use prompt::build_prompt;
