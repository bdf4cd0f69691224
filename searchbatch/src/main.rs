use anyhow::{Context, Result};
use clap::Parser;
use searchbatch::{build_agent, process_prompts, Cli, OutputLog, PromptBatch};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let run_id = Uuid::new_v4();
    run(cli)
        .instrument(tracing::info_span!("run", %run_id))
        .await
}

async fn run(cli: Cli) -> Result<()> {
    let batch = PromptBatch::from_path(&cli.input)
        .with_context(|| format!("loading prompts from {}", cli.input.display()))?;
    let options = cli
        .process_options()
        .context("resolving output path")?;
    let agent = build_agent(&cli).context("building agent")?;

    if !options.clear_before_run {
        // Nothing tracks which prompts those lines answered.
        match OutputLog::count_lines(&options.output_path) {
            Ok(existing) => tracing::warn!(
                existing,
                "appending to existing output; earlier prompts may be answered again"
            ),
            Err(err) => tracing::warn!(error = %err, "could not count existing records"),
        }
    }

    tracing::info!(
        prompts = batch.len(),
        output = %options.output_path.display(),
        clear = options.clear_before_run,
        "starting batch"
    );
    let report = process_prompts(&batch.prompts, &agent, &options)
        .await
        .context("batch aborted")?;
    tracing::info!(
        written = report.written,
        output = %report.output_path.display(),
        "batch complete"
    );
    Ok(())
}
