use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod filter;
mod history;
mod llm;
mod output;

use config::AppConfig;
use filter::ExclusionFilter;
use history::{format_for_analysis, HistoryCapture, Platform};
use llm::{PredictorAgent, SummarizerAgent};
use output::OutputManager;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Console,
    Json,
}

#[derive(Parser)]
#[command(name = "cmdcast")]
#[command(about = "🔮 cmdcast - Terminal command history analysis and prediction")]
#[command(long_about = "cmdcast captures your recent shell history, asks an LLM to summarize \
what you were working on, and predicts the commands you are most likely to run next.

History is read from your shell's history file (bash, zsh, or PSReadline on Windows), with an
interactive-shell fallback when no file is available. Commands matching configured ignore
patterns are excluded before anything leaves your machine.")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/config.json")]
    config: PathBuf,

    /// Output format for the analysis report
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    output_format: OutputFormat,

    /// Enable verbose progress output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = AppConfig::load(&cli.config);
    config.validate().context("invalid configuration")?;

    // Agents are built before any capture attempt so missing API keys fail
    // fast instead of after reading history.
    let summarizer =
        SummarizerAgent::new(config.primary_agent.clone()).context("primary agent setup")?;
    let predictor =
        PredictorAgent::new(config.secondary_agent.clone()).context("secondary agent setup")?;

    let platform = Platform::detect();
    if cli.verbose {
        eprintln!("🔍 Capturing command history ({})...", platform.name());
    }

    let filter = ExclusionFilter::new(&config.history.ignore_patterns);
    let capture = HistoryCapture::new(platform, config.history.max_commands);
    let records = capture.capture(&filter).await;

    if records.is_empty() {
        eprintln!("⚠️  No commands found in history.");
        return Ok(ExitCode::SUCCESS);
    }

    if cli.verbose {
        eprintln!("✅ Captured {} commands", records.len());
    }

    let history_text = format_for_analysis(&records, config.history.include_timestamps);

    if cli.verbose {
        eprintln!("📝 Generating command summary...");
    }
    let summary = summarizer
        .summarize(&history_text)
        .await
        .context("primary agent error")?;

    if cli.verbose {
        eprintln!("🔮 Predicting next commands...");
    }
    let predictions = predictor
        .predict(&summary, &history_text)
        .await
        .context("secondary agent error")?;

    let output_manager = OutputManager::new(config.output.clone());
    let report = output_manager.build_report(&records, summary, &predictions);

    match cli.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Console => output_manager.print_report(&report),
    }

    if output_manager.save_to_file() {
        let path = output_manager.save(&report).context("saving report")?;
        // stdout carries the JSON document in json mode; keep it parseable.
        match cli.output_format {
            OutputFormat::Json => eprintln!("💾 Predictions saved to: {}", path.display()),
            OutputFormat::Console => println!("\n💾 Predictions saved to: {}", path.display()),
        }
    }

    Ok(ExitCode::SUCCESS)
}
