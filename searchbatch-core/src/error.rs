use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchbatchError {
    #[error("LLM provider failed: {0}")]
    LlmProvider(String),
    #[error("Tool call failed for '{tool_name}': {reason}")]
    ToolCallFailed { tool_name: String, reason: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Max iterations ({max}) exceeded without a final answer")]
    MaxIterationsExceeded { max: usize },
    #[error("Conversation store failed: {0}")]
    StoreFailed(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
