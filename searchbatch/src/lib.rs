//! Runs a list of prompts through a tool-using agent, one at a time, and
//! records every answer as a JSON line.

mod app;
mod config;
mod error;
mod output;
mod pacing;
mod processor;
mod prompts;

pub use app::build_agent;
pub use config::Cli;
pub use error::{ProcessError, PromptSourceError};
pub use output::{OutputLog, OutputRecord};
pub use pacing::{Pacer, Pacing};
pub use processor::{process_prompts, ProcessOptions, ProcessReport};
pub use prompts::PromptBatch;
