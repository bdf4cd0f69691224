use std::sync::Arc;

use searchbatch_agent::{FileConversationStore, ReActAgent};
use searchbatch_core::{
    ConversationStore, LlmRequest, LlmResponse, Message, Responder, SearchbatchError,
    ToolCallingLlm,
};
use tempfile::tempdir;

#[tokio::test]
async fn file_store_appends_and_loads_latest() {
    let dir = tempdir().unwrap();
    let store = FileConversationStore::new(dir.path());

    store.save("thread/1", &[Message::user("one")]).await.unwrap();
    store
        .save("thread/1", &[Message::user("one"), Message::assistant("two", vec![])])
        .await
        .unwrap();

    let loaded = store.load("thread/1").await.unwrap().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].content, "two");

    let path = dir.path().join("thread_1.jsonl");
    assert!(path.exists());
    assert_eq!(store.thread_path("thread/1"), path);
}

#[tokio::test]
async fn file_store_lists_snapshots() {
    let dir = tempdir().unwrap();
    let store = FileConversationStore::new(dir.path());

    store.save("42", &[Message::user("a")]).await.unwrap();
    store
        .save("42", &[Message::user("a"), Message::user("b")])
        .await
        .unwrap();

    let snapshots = store.list_snapshots("42").unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].seq, 1);
    assert_eq!(snapshots[1].seq, 2);
    assert_eq!(snapshots[1].messages, 2);
    assert!(!snapshots[0].created_at.is_empty());
}

#[tokio::test]
async fn file_store_unusable_thread_id_maps_to_fixed_hex_name() {
    let dir = tempdir().unwrap();
    let store = FileConversationStore::new(dir.path());

    assert_eq!(
        store.thread_path("///"),
        dir.path().join("thread-2f2f2f.jsonl")
    );
    assert_eq!(store.thread_path("..."), dir.path().join("thread-2e2e2e.jsonl"));

    store.save("///", &[Message::user("kept")]).await.unwrap();
    let reopened = FileConversationStore::new(dir.path());
    let loaded = reopened.load("///").await.unwrap().unwrap();
    assert_eq!(loaded[0].content, "kept");
}

#[tokio::test]
async fn file_store_unknown_thread_is_empty() {
    let dir = tempdir().unwrap();
    let store = FileConversationStore::new(dir.path().join("missing"));
    assert!(store.load("nope").await.unwrap().is_none());
    assert!(store.list_snapshots("nope").unwrap().is_empty());
}

#[tokio::test]
async fn file_store_rejects_corrupt_lines() {
    let dir = tempdir().unwrap();
    let store = FileConversationStore::new(dir.path());
    std::fs::write(store.thread_path("42"), "not json\n").unwrap();

    let err = store.load("42").await.unwrap_err();
    assert!(matches!(err, SearchbatchError::StoreFailed(_)));
}

struct Echo;

#[async_trait::async_trait]
impl ToolCallingLlm for Echo {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SearchbatchError> {
        Ok(LlmResponse {
            content: format!("seen {} messages", request.messages.len()),
            tool_calls: vec![],
        })
    }
}

#[tokio::test]
async fn conversation_survives_a_new_agent() {
    let dir = tempdir().unwrap();

    let first = ReActAgent::builder()
        .llm(Arc::new(Echo))
        .store(Arc::new(FileConversationStore::new(dir.path())))
        .build()
        .unwrap();
    assert_eq!(first.respond("42", "hi").await.unwrap(), "seen 2 messages");

    let second = ReActAgent::builder()
        .llm(Arc::new(Echo))
        .store(Arc::new(FileConversationStore::new(dir.path())))
        .build()
        .unwrap();
    // system + user + assistant + user
    assert_eq!(second.respond("42", "again").await.unwrap(), "seen 4 messages");
}
