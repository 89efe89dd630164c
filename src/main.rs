mod analysis;
mod batch;
mod config;
mod error;
mod indicator;
mod model;
mod report;
mod screener;
mod signal;
mod source;
mod strategy;
mod trend;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use report::Reporter;
use report::terminal::TerminalReporter;
use screener::Fundamentals;
use source::json_file::JsonFileSource;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("input error")]
    Input,
}

#[derive(Parser)]
#[command(
    name = "smallcap-scout",
    about = "Technical analysis and screening for small-cap stocks"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze daily price history for each ticker
    Analyze {
        /// Tickers to analyze; defaults to `tickers` from the config file
        tickers: Vec<String>,
    },
    /// Screen a JSON file of company fundamentals
    Screen {
        /// Path to a JSON array of company fundamentals
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let reporter = TerminalReporter;
    match cli.command {
        Command::Analyze { tickers } => analyze(&config, tickers, &reporter).await,
        Command::Screen { path } => screen(&config, &path, &reporter).await,
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

async fn analyze(
    config: &AppConfig,
    tickers: Vec<String>,
    reporter: &dyn Reporter,
) -> Result<(), Report<AppError>> {
    let tickers = if tickers.is_empty() {
        config.tickers.clone()
    } else {
        tickers
    };
    if tickers.is_empty() {
        warn!("no tickers given on the command line or in the config; nothing to do");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let source = JsonFileSource::new(&config.general.data_dir);
    let batch = batch::run(
        &source,
        &tickers,
        &config.analysis(),
        config.general.max_workers,
        &cancel,
    )
    .await;
    ctrl_c.abort();

    for analysis in &batch.analyses {
        reporter.analysis(analysis);
    }
    for failure in &batch.failures {
        reporter.failure(failure);
    }
    if !batch.skipped.is_empty() {
        warn!(skipped = batch.skipped.len(), "run cancelled before all tickers started");
    }

    info!(
        run_id = %batch.run_id,
        started_at = %batch.started_at,
        analyzed = batch.analyses.len(),
        failed = batch.failures.len(),
        "done"
    );
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("ctrl+c received, finishing tickers already in flight");
        cancel.cancel();
    }
}

async fn screen(
    config: &AppConfig,
    path: &Path,
    reporter: &dyn Reporter,
) -> Result<(), Report<AppError>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .change_context(AppError::Input)
        .attach_with(|| format!("path: {}", path.display()))?;
    let companies: Vec<Fundamentals> = serde_json::from_str(&content)
        .change_context(AppError::Input)
        .attach_with(|| format!("path: {}", path.display()))?;

    info!(companies = companies.len(), "screening");
    let results = screener::screen_all(companies, &config.screener);
    let summary = screener::summarize(&results.passed);
    reporter.screen(&results, summary.as_ref());
    Ok(())
}
