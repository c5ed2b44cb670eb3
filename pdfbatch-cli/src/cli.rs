//! CLI argument parsing for pdfbatch.
//!
//! Every flag that names a store, table or binding can also be given
//! through a `PDFBATCH_*` environment variable, so the tool can be driven
//! from a workflow runner without building a command line.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use pdfbatch::config::{ColumnMap, CompressionLevel, Config, DEFAULT_ROW_LIMIT};
use pdfbatch::error::Result;
use pdfbatch::observer::BatchObserver;
use pdfbatch::record::TableId;

/// Merge ordered batches of stored PDF records into a single document.
#[derive(Parser, Debug)]
#[command(name = "pdfbatch")]
#[command(version)]
#[command(about = "Merge ordered batches of stored PDF records into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` wins over it.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the rows of one binding into a single output row
    Merge(MergeArgs),

    /// Add PDF files as input rows of a table
    Import(ImportArgs),

    /// Create an empty table and print its id
    CreateTable(StoreArgs),
}

/// Location of the JSON record store.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Directory holding one JSON file per table
    #[arg(long, env = "PDFBATCH_STORE", value_name = "DIR")]
    pub store: PathBuf,
}

/// Arguments of `pdfbatch merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Table holding the input PDFs
    #[arg(long, env = "PDFBATCH_INPUT_TABLE", value_name = "UUID")]
    pub input_table: TableId,

    /// Table receiving the merged PDF
    #[arg(long, env = "PDFBATCH_OUTPUT_TABLE", value_name = "UUID")]
    pub output_table: TableId,

    /// Id tying the input rows to the output row
    #[arg(long, env = "PDFBATCH_BINDING_ID", value_name = "UUID")]
    pub binding_id: Uuid,

    /// Filename stored on the output row
    ///
    /// Defaults to merged.pdf when absent or blank.
    #[arg(short, long, env = "PDFBATCH_OUTPUT_FILENAME", value_name = "NAME")]
    pub output_filename: Option<String>,

    /// Maximum number of input rows to fetch
    #[arg(long, env = "PDFBATCH_ROW_LIMIT", value_name = "N", default_value_t = DEFAULT_ROW_LIMIT)]
    pub row_limit: usize,

    /// TOML file overriding column names
    #[arg(long, env = "PDFBATCH_COLUMNS", value_name = "FILE")]
    pub columns: Option<PathBuf>,

    /// Compression level for the merged PDF
    ///
    /// - none: streams are written as merged
    /// - standard: compress streams (default)
    /// - maximum: compress streams and renumber objects
    #[arg(short, long, env = "PDFBATCH_COMPRESSION", value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Also write the merged PDF to this file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

impl MergeArgs {
    /// Convert the arguments into a validated batch configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the column file cannot be loaded or the resulting
    /// configuration is invalid.
    pub async fn to_config(&self, observer: &dyn BatchObserver) -> Result<Config> {
        let mut config = Config::new(self.input_table, self.output_table, self.binding_id)
            .with_output_filename(self.output_filename.as_deref(), observer);

        config.row_limit = self.row_limit;
        config.compression = CompressionLevel::from_str(&self.compression)?;
        if let Some(path) = &self.columns {
            config.columns = ColumnMap::load(path).await?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments of `pdfbatch import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Table receiving the rows; created if missing
    #[arg(long, env = "PDFBATCH_INPUT_TABLE", value_name = "UUID")]
    pub table: TableId,

    /// Binding id stored on every imported row
    #[arg(long, env = "PDFBATCH_BINDING_ID", value_name = "UUID")]
    pub binding_id: Uuid,

    /// Sequence number of the first file; later files count up from it
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub start_seq: i64,

    /// TOML file overriding column names
    #[arg(long, env = "PDFBATCH_COLUMNS", value_name = "FILE")]
    pub columns: Option<PathBuf>,

    /// PDF files or glob patterns, imported in the order given
    #[arg(required = true, value_name = "FILE")]
    pub patterns: Vec<String>,
}

impl ImportArgs {
    /// Column map for the imported rows.
    pub async fn column_map(&self) -> Result<ColumnMap> {
        match &self.columns {
            Some(path) => ColumnMap::load(path).await,
            None => Ok(ColumnMap::default()),
        }
    }
}
