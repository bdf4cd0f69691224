use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use searchbatch_core::DEFAULT_THREAD_ID;
use searchbatch_llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use searchbatch_tools::{SafeSearch, SearchOptions};

use crate::{Pacing, ProcessOptions};

/// Run a list of prompts through a web-search agent and log each answer as a JSON line.
#[derive(Debug, Clone, Parser)]
#[command(name = "searchbatch", version)]
pub struct Cli {
    /// JSON file with a `prompts` array.
    #[arg(long, env = "SEARCHBATCH_INPUT", default_value = "data/input.json")]
    pub input: PathBuf,

    /// Newline-delimited JSON output file.
    #[arg(long, env = "SEARCHBATCH_OUTPUT", default_value = "data/output.jsonl")]
    pub output: PathBuf,

    /// Truncate the output file before the run. Earlier records are lost for
    /// good; pass `false` to append instead.
    #[arg(
        long,
        env = "SEARCHBATCH_CLEAR_OUTPUT",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub clear_output: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature, 0.0 (deterministic) to 2.0.
    #[arg(
        long,
        env = "OPENAI_TEMPERATURE",
        default_value_t = 0.5,
        value_parser = parse_temperature
    )]
    pub temperature: f32,

    /// Conversation shared by every prompt of the run.
    #[arg(long, default_value = DEFAULT_THREAD_ID)]
    pub thread_id: String,

    /// Minimum spacing between agent calls, in milliseconds.
    #[arg(long, default_value_t = 10)]
    pub min_interval_ms: u64,

    /// Upper bound on model calls per prompt.
    #[arg(long, default_value_t = 25)]
    pub max_iterations: usize,

    #[arg(long, default_value_t = 5)]
    pub max_results: usize,

    #[arg(long, default_value = "us-en")]
    pub region: String,

    #[arg(long, default_value = "en-us")]
    pub locale: String,

    /// strict, moderate or off.
    #[arg(long, default_value_t = SafeSearch::Strict)]
    pub safe_search: SafeSearch,

    /// Keep conversation threads as files here instead of in memory.
    #[arg(long, env = "SEARCHBATCH_HISTORY_DIR")]
    pub history_dir: Option<PathBuf>,
}

fn parse_temperature(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid temperature '{raw}': {err}"))?;
    if !(0.0..=2.0).contains(&value) {
        return Err(format!("temperature {value} outside 0.0..=2.0"));
    }
    Ok(value)
}

/// Anchors a relative path at the current directory.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

impl Cli {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_results: self.max_results,
            region: self.region.clone(),
            locale: self.locale.clone(),
            safe_search: self.safe_search,
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::min_interval(Duration::from_millis(self.min_interval_ms))
    }

    pub fn process_options(&self) -> io::Result<ProcessOptions> {
        Ok(ProcessOptions {
            output_path: absolute(&self.output)?,
            clear_before_run: self.clear_output,
            thread_id: self.thread_id.clone(),
            pacing: self.pacing(),
        })
    }
}
