use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use ingest_core::{batch_count, format_duration, ProcessingResult, UploadOutcome};
use ingest_engine::{
    write_rejects_report, BatchUploader, FileProcessor, ReqwestSessionClient, UploadError,
};
use ingest_logging::{ingest_info, ingest_warn};
use log::LevelFilter;
use tokio::io::AsyncReadExt;

use super::config::{load_config, AppConfig, ValidatorKind, DEFAULT_CONFIG_FILE};
use super::console::ConsoleProgress;
use super::logging;
use crate::{Cli, Command, InputArgs, UploadArgs};

const STDIN_MARKER: &str = "-";
const REJECTS_FILE: &str = "rejects.json";
/// Some batches ended with errors.
const EXIT_PARTIAL: u8 = 2;
/// Conventional code for a run stopped by SIGINT.
const EXIT_CANCELLED: u8 = 130;

pub(crate) async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = load_config(&config_path, cli.config.is_some())?;

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logging::initialize(cli.log.unwrap_or(config.log), level);

    let console = ConsoleProgress::new(cli.quiet);
    match cli.command {
        Command::Check(args) => {
            let result = process_input(&config, &args, &console).await?;
            print_processing_summary(&result, config.batch.resolve(args.batch_size));
            Ok(ExitCode::SUCCESS)
        }
        Command::Upload(args) => {
            apply_upload_overrides(&mut config, &args);
            upload(&config, args, &console).await
        }
    }
}

fn apply_upload_overrides(config: &mut AppConfig, args: &UploadArgs) {
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(token) = &args.auth_token {
        config.auth_token = Some(token.clone());
    }
}

async fn process_input(
    config: &AppConfig,
    args: &InputArgs,
    console: &ConsoleProgress,
) -> anyhow::Result<ProcessingResult> {
    let validator = if args.strict {
        ValidatorKind::strict()
    } else {
        config.validator.clone()
    };
    let processor = FileProcessor::new(
        config.processor_settings(args.batch_size),
        validator.build(),
    );

    let result = if args.input.as_os_str() == STDIN_MARKER {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read addresses from stdin")?;
        processor.process_text(&text)
    } else {
        processor
            .process_file(&args.input, console)
            .await
            .with_context(|| format!("failed to process {}", args.input.display()))?
    };

    if let Some(dir) = &args.rejects {
        write_rejects(dir, &result)?;
    }
    Ok(result)
}

fn write_rejects(dir: &Path, result: &ProcessingResult) -> anyhow::Result<()> {
    if result.invalid_entries.is_empty() && result.duplicates.is_empty() {
        ingest_info!("No rejected lines; skipping rejects report");
        return Ok(());
    }
    let path = write_rejects_report(dir, REJECTS_FILE, result)
        .with_context(|| format!("failed to write rejects report into {}", dir.display()))?;
    println!("Rejects report: {}", path.display());
    Ok(())
}

async fn upload(
    config: &AppConfig,
    args: UploadArgs,
    console: &ConsoleProgress,
) -> anyhow::Result<ExitCode> {
    let result = process_input(config, &args.input, console).await?;
    let batch_size = config.batch.resolve(args.input.batch_size);
    print_processing_summary(&result, batch_size);
    if result.valid_entries.is_empty() {
        println!("Nothing to upload.");
        return Ok(ExitCode::SUCCESS);
    }

    let client = ReqwestSessionClient::new(config.client_settings())
        .context("failed to set up the HTTP client")?;
    let uploader = Arc::new(BatchUploader::new(
        Arc::new(client),
        config.uploader_settings(),
    ));
    let interrupt = spawn_interrupt_watcher(uploader.clone());
    let started = Instant::now();

    let outcome = uploader
        .upload_addresses(
            &args.target,
            &result.valid_entries,
            args.replace,
            console,
            Some(batch_size),
        )
        .await;
    interrupt.abort();

    match outcome {
        Ok(outcome) => Ok(print_upload_summary(&outcome, started.elapsed().as_secs())),
        Err(UploadError::Cancelled {
            session,
            results,
            total_batches,
        }) => {
            println!(
                "Cancelled: session {} stopped after {} of {} batches ({} addresses sent).",
                session.session_id,
                results.len(),
                total_batches,
                session.processed_addresses
            );
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Err(err) => Err(err).with_context(|| format!("upload to {} failed", args.target)),
    }
}

/// Cancel the uploader on Ctrl-C; the batch in flight still completes.
fn spawn_interrupt_watcher(uploader: Arc<BatchUploader>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ingest_warn!("Interrupt received; stopping after the current batch");
            uploader.cancel();
        }
    })
}

fn print_processing_summary(result: &ProcessingResult, batch_size: usize) {
    let stats = &result.stats;
    println!(
        "Lines: {} | valid: {} | duplicates: {} | invalid: {}",
        stats.total_lines, stats.valid_count, stats.duplicate_count, stats.invalid_count
    );
    println!(
        "Batches: {} of up to {} | estimated upload time: {}",
        batch_count(stats.valid_count, batch_size),
        batch_size,
        stats.estimated_upload_time
    );
}

fn print_upload_summary(outcome: &UploadOutcome, elapsed_secs: u64) -> ExitCode {
    let summary = &outcome.summary;
    println!(
        "Session {}: {} processed, {} added, {} skipped, {} errors",
        outcome.session.session_id,
        summary.total_processed,
        summary.total_added,
        summary.total_skipped,
        summary.total_errors
    );
    println!(
        "Server totals: {} total, {} completed, {} pending (elapsed {})",
        outcome.final_stats.total,
        outcome.final_stats.completed,
        outcome.final_stats.pending,
        format_duration(elapsed_secs)
    );
    if summary.total_errors > 0 {
        ExitCode::from(EXIT_PARTIAL)
    } else {
        ExitCode::SUCCESS
    }
}
