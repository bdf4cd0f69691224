use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ProcessError;

/// One processed prompt. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub prompt: String,
    pub response: String,
    /// UTC, millisecond precision, `Z` suffix.
    pub timestamp: String,
}

/// Append-only newline-delimited JSON log.
///
/// Records are separated by a single `\n` and the file never ends with one,
/// so every line is a complete record and there are no blank lines.
#[derive(Debug)]
pub struct OutputLog {
    path: PathBuf,
    last_stamp: Option<DateTime<Utc>>,
}

impl OutputLog {
    /// Opens the log at `path`.
    ///
    /// With `clear` set the file is truncated (or created) immediately. This
    /// destroys every record from earlier runs and cannot be undone. Without it
    /// the file is left alone and created lazily by the first append.
    pub fn open(path: impl Into<PathBuf>, clear: bool) -> Result<Self, ProcessError> {
        let path = path.into();
        if clear {
            File::create(&path).map_err(|source| ProcessError::Filesystem {
                path: path.clone(),
                source,
            })?;
        }
        Ok(Self {
            path,
            last_stamp: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds a record stamped with the current time.
    pub fn record(&mut self, prompt: &str, response: String) -> OutputRecord {
        self.record_at(prompt, response, Utc::now())
    }

    // Timestamps never go backwards within one log, even if the wall clock does.
    fn record_at(&mut self, prompt: &str, response: String, now: DateTime<Utc>) -> OutputRecord {
        let stamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        OutputRecord {
            prompt: prompt.to_string(),
            response,
            timestamp: stamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn append(&self, record: &OutputRecord) -> Result<(), ProcessError> {
        let line = serde_json::to_string(record)?;
        let fs_err = |source| ProcessError::Filesystem {
            path: self.path.clone(),
            source,
        };

        let needs_separator = self.needs_separator().map_err(fs_err)?;
        let mut buf = Vec::with_capacity(line.len() + 1);
        if needs_separator {
            buf.push(b'\n');
        }
        buf.extend_from_slice(line.as_bytes());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(fs_err)?;
        file.write_all(&buf).map_err(fs_err)?;
        file.flush().map_err(fs_err)
    }

    /// True when the file has content that does not already end in `\n`.
    fn needs_separator(&self) -> io::Result<bool> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    /// Counts the non-blank lines in the file at `path` without parsing them;
    /// a missing file counts as zero.
    pub fn count_lines(path: impl AsRef<Path>) -> Result<usize, ProcessError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(0);
        }
        let fs_err = |source| ProcessError::Filesystem {
            path: path.to_path_buf(),
            source,
        };
        let reader = BufReader::new(File::open(path).map_err(fs_err)?);
        let mut count = 0;
        for line in reader.lines() {
            if !line.map_err(fs_err)?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Reads every record currently in the file at `path`; a missing file is empty.
    pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<OutputRecord>, ProcessError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let fs_err = |source| ProcessError::Filesystem {
            path: path.to_path_buf(),
            source,
        };
        let reader = BufReader::new(File::open(path).map_err(fs_err)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(fs_err)?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}
