mod error;
mod llm;
mod responder;
mod store;
mod tool;

pub use error::SearchbatchError;
pub use llm::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};
pub use responder::Responder;
pub use store::{ConversationStore, InMemoryConversationStore};
pub use tool::{Tool, ToolError};

pub type Value = serde_json::Value;

/// Thread id used when a caller does not pick one.
pub const DEFAULT_THREAD_ID: &str = "42";
