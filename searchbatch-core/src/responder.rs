use crate::SearchbatchError;

/// Anything that can answer one user message within a named conversation.
///
/// Implementations own whatever history they keep for `thread_id`; callers only
/// see the final response text. Two calls on the same thread must not overlap.
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, thread_id: &str, message: &str) -> Result<String, SearchbatchError>;
}
