use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Message, SearchbatchError};

/// Persists conversation histories keyed by thread id.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    async fn save(&self, thread_id: &str, history: &[Message]) -> Result<(), SearchbatchError>;
    async fn load(&self, thread_id: &str) -> Result<Option<Vec<Message>>, SearchbatchError>;
}

/// Process-lifetime store; clones share the same threads.
#[derive(Default, Clone, Debug)]
pub struct InMemoryConversationStore {
    inner: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn save(&self, thread_id: &str, history: &[Message]) -> Result<(), SearchbatchError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| SearchbatchError::StoreFailed("lock".into()))?;
        guard.insert(thread_id.to_string(), history.to_vec());
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Vec<Message>>, SearchbatchError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| SearchbatchError::StoreFailed("lock".into()))?;
        Ok(guard.get(thread_id).cloned())
    }
}
