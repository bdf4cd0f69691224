mod file_store;
mod react;

pub use file_store::{FileConversationStore, SnapshotMetadata, SnapshotRecord};
pub use react::{ReActAgent, ReActAgentBuilder, ToolFailurePolicy, DEFAULT_SYSTEM_PROMPT};
