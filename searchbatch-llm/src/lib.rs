mod client;

// OpenAI wire format, shared by every OpenAI-compatible backend
pub mod openai_compatible;

pub use client::{OpenAiClient, OpenAiClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use searchbatch_core::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolSpec};
