//! pdfbatch - Merge ordered batches of stored PDF records.
//!
//! A command-line driver over a JSON-directory record store.

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ImportArgs, MergeArgs, StoreArgs};
use pdfbatch::error::PdfBatchError;
use pdfbatch::io::{PdfReader, PdfWriter};
use pdfbatch::observer::{BatchObserver, TracingObserver};
use pdfbatch::orchestrator::Orchestrator;
use pdfbatch::store::JsonStore;
use pdfbatch::utils::{collect_paths_for_patterns, format_file_size};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(exit_code(&err));
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit code for an error, taken from the library error when there is one.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PdfBatchError>()
        .map_or(1, PdfBatchError::exit_code)
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    debug!("{} v{}", pdfbatch::NAME, pdfbatch::VERSION);

    match cli.command {
        Command::Merge(args) => merge(args, cli.quiet).await,
        Command::Import(args) => import(args).await,
        Command::CreateTable(args) => create_table(args).await,
    }
}

async fn open_store(args: &StoreArgs) -> Result<Arc<JsonStore>> {
    let store = JsonStore::open(&args.store)
        .await
        .with_context(|| format!("Failed to open store at {}", args.store.display()))?;
    Ok(Arc::new(store))
}

async fn merge(args: MergeArgs, quiet: bool) -> Result<()> {
    let observer: Arc<dyn BatchObserver> = Arc::new(TracingObserver);
    let config = args.to_config(observer.as_ref()).await?;
    let store = open_store(&args.store).await?;

    let orchestrator = Orchestrator::new(config, store.clone(), store, observer);
    let report = orchestrator.run().await?;

    let stats = &report.statistics;
    info!(
        "Merged {} entries ({} skipped, {} of input) in {:.2}s",
        stats.entries_merged,
        stats.entries_skipped,
        stats.format_input_size(),
        stats.merge_time.as_secs_f64()
    );

    if let Some(path) = &args.export {
        let stats = PdfWriter::new()
            .export(&report.document.content, path)
            .await
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        info!(
            "Exported {} ({}) in {:.2}s",
            stats.output_path.display(),
            stats.format_file_size(),
            stats.write_time.as_secs_f64()
        );
    }

    if !quiet {
        println!(
            "Merged {} row(s) into '{}': {} pages, {}",
            report.rows_received,
            report.document.filename,
            report.statistics.total_pages,
            format_file_size(report.document.size())
        );
    }

    Ok(())
}

async fn import(args: ImportArgs) -> Result<()> {
    let paths = collect_paths_for_patterns(&args.patterns)?;
    if paths.is_empty() {
        bail!(PdfBatchError::invalid_config("No files matched the given patterns"));
    }

    let columns = args.column_map().await?;
    let store = open_store(&args.store).await?;
    store.add_table(args.table).await?;

    let reader = PdfReader::new();
    for (sequence, path) in (args.start_seq..).zip(&paths) {
        let (content, pages) = reader.read_file(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            "Importing {} as sequence {sequence} ({pages} pages, {})",
            path.display(),
            format_file_size(content.len() as u64)
        );

        let row = columns.input_row(args.table, args.binding_id, sequence, &name, content);
        store.insert_row(row).await?;
    }

    info!("Imported {} file(s) into table {}", paths.len(), args.table);
    Ok(())
}

async fn create_table(args: StoreArgs) -> Result<()> {
    let store = open_store(&args).await?;
    let table = store.create_table().await?;
    println!("{table}");
    Ok(())
}
