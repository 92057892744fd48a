use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use persona_enricher::config::Config;
use persona_enricher::loader::{clean_input_path, CsvProspectLoader};
use persona_enricher::llm_service::LLMServiceClient;
use persona_enricher::pipeline::EnrichmentPipeline;
use persona_enricher::writer::write_reconciled;

const PREVIEW_ROWS: usize = 5;

/// Enrich a prospect list with a marketing persona derived from job titles
#[derive(Debug, Parser)]
#[command(name = "persona-enricher", version)]
struct Args {
    /// Prospect CSV export; prompted for when omitted
    input: Option<PathBuf>,

    /// Rows sent per completion request
    #[arg(long, env = "PERSONA_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Directory for the raw response log
    #[arg(long, env = "PERSONA_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path of the reconciled CSV
    #[arg(long, env = "PERSONA_RECONCILED_PATH")]
    reconciled: Option<PathBuf>,
}

fn prompt_for_input_path() -> Result<PathBuf> {
    print!("Input the absolute path of the input file with prospects and no persona: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input path")?;

    Ok(clean_input_path(&line))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(batch_size) = args.batch_size {
        config.pipeline = config.pipeline.with_batch_size(batch_size);
    }
    if let Some(dir) = args.output_dir {
        config.output.raw_log.dir = dir;
    }
    if let Some(path) = args.reconciled {
        config.output.reconciled_path = path;
    }
    config.log_config();

    let input = match args.input {
        Some(path) => path,
        None => prompt_for_input_path()?,
    };

    let classifier = LLMServiceClient::new(config.llm.clone()).context("Failed to configure LLM client")?;
    let pipeline = EnrichmentPipeline::new(classifier, &config.pipeline)?
        .with_prompt_builder(config.prompt_builder()?);

    let loader = CsvProspectLoader::new(&input, config.pipeline.columns.clone());
    let outcome = pipeline
        .run_from_loader(&loader)
        .await
        .with_context(|| format!("Enrichment of {} failed", input.display()))?;

    for record in outcome.reconciled.records.iter().take(PREVIEW_ROWS) {
        info!("   {}", record.to_row().join(" | "));
    }

    write_reconciled(&outcome.reconciled, &config.output.reconciled_path)?;
    let raw_log = config.output.raw_log.write(&outcome.raw_responses, &Local::now())?;

    println!("Output written to {}", raw_log.display());
    Ok(())
}
