use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use searchbatch_core::{ConversationStore, Message, SearchbatchError};

/// One saved state of a thread, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    pub seq: u64,
    pub created_at: String,
    pub thread_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMetadata {
    pub seq: u64,
    pub created_at: String,
    pub messages: usize,
}

/// Keeps each thread as a JSONL file of snapshots under `base_dir`.
///
/// Every save appends a full snapshot; `load` returns the newest one. Threads
/// survive the process, so a later run can continue the same conversation.
#[derive(Clone, Debug)]
pub struct FileConversationStore {
    base_dir: PathBuf,
}

fn store_err(err: impl std::fmt::Display) -> SearchbatchError {
    SearchbatchError::StoreFailed(err.to_string())
}

impl FileConversationStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn sanitize_thread_id(thread_id: &str) -> String {
        let mut out = String::with_capacity(thread_id.len());
        for ch in thread_id.chars() {
            match ch {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
        let trimmed = out.trim_matches(|c: char| c == '.' || c.is_whitespace() || c == '_');
        // Ids with nothing usable left are hex-encoded so they map to the same
        // file on every run.
        if trimmed.is_empty() {
            let hex: String = thread_id.bytes().map(|b| format!("{b:02x}")).collect();
            return format!("thread-{hex}");
        }
        trimmed.to_string()
    }

    pub fn thread_path(&self, thread_id: &str) -> PathBuf {
        let filename = format!("{}.jsonl", Self::sanitize_thread_id(thread_id));
        self.base_dir.join(filename)
    }

    fn read_records(&self, thread_id: &str) -> Result<Vec<SnapshotRecord>, SearchbatchError> {
        let path = self.thread_path(thread_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&path).map_err(store_err)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(store_err)?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line).map_err(store_err)?);
        }
        Ok(records)
    }

    pub fn list_snapshots(&self, thread_id: &str) -> Result<Vec<SnapshotMetadata>, SearchbatchError> {
        Ok(self
            .read_records(thread_id)?
            .into_iter()
            .map(|record| SnapshotMetadata {
                seq: record.seq,
                created_at: record.created_at,
                messages: record.messages.len(),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ConversationStore for FileConversationStore {
    async fn save(&self, thread_id: &str, history: &[Message]) -> Result<(), SearchbatchError> {
        fs::create_dir_all(&self.base_dir).map_err(store_err)?;

        let seq = self
            .read_records(thread_id)?
            .last()
            .map(|record| record.seq + 1)
            .unwrap_or(1);
        let record = SnapshotRecord {
            seq,
            created_at: Utc::now().to_rfc3339(),
            thread_id: thread_id.to_string(),
            messages: history.to_vec(),
        };
        let line = serde_json::to_string(&record).map_err(store_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.thread_path(thread_id))
            .map_err(store_err)?;
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(store_err)?;
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Vec<Message>>, SearchbatchError> {
        Ok(self
            .read_records(thread_id)?
            .pop()
            .map(|record| record.messages))
    }
}
