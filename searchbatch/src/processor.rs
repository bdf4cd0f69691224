use std::path::PathBuf;

use searchbatch_core::{Responder, DEFAULT_THREAD_ID};

use crate::{OutputLog, Pacing, ProcessError};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub output_path: PathBuf,
    /// Truncate the output file before the first prompt. Irreversible: records
    /// from earlier runs are deleted. When false, new records are appended.
    pub clear_before_run: bool,
    /// All prompts share this conversation.
    pub thread_id: String,
    pub pacing: Pacing,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.json"),
            clear_before_run: true,
            thread_id: DEFAULT_THREAD_ID.to_string(),
            pacing: Pacing::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub written: usize,
    pub output_path: PathBuf,
}

/// Sends each prompt to `responder` in order and appends one record per answer.
///
/// Prompts run strictly one after another since they share one thread. The
/// first failure stops the batch: earlier records stay on disk, later prompts
/// are never sent, and nothing is retried.
pub async fn process_prompts<R>(
    prompts: &[String],
    responder: &R,
    options: &ProcessOptions,
) -> Result<ProcessReport, ProcessError>
where
    R: Responder + ?Sized,
{
    let mut log = OutputLog::open(&options.output_path, options.clear_before_run)?;
    let mut pacer = options.pacing.pacer();
    let total = prompts.len();

    for (index, prompt) in prompts.iter().enumerate() {
        pacer.wait().await;
        tracing::info!(index, total, "processing prompt");

        let response = responder
            .respond(&options.thread_id, prompt)
            .await
            .map_err(|source| ProcessError::Respond { index, source })?;
        let record = log.record(prompt, response);
        log.append(&record)?;

        tracing::debug!(index, chars = record.response.len(), "recorded response");
    }

    Ok(ProcessReport {
        written: total,
        output_path: log.path().to_path_buf(),
    })
}
