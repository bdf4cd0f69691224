use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::PromptSourceError;

/// Input document: `{"prompts": ["...", ...]}`. Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptBatch {
    pub prompts: Vec<String>,
}

impl PromptBatch {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PromptSourceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PromptSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PromptSourceError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl FromStr for PromptBatch {
    type Err = PromptSourceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(raw).map_err(|source| PromptSourceError::Parse {
            origin: "<inline>".to_string(),
            source,
        })
    }
}
