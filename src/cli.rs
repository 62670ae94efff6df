// src/cli.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "leakatlas - import numbered JSON record dumps into SQLite",
    long_about = "leakatlas reads 0000001.json, 0000002.json, ... from a directory in order, stopping at the first missing number, and writes each record with its passwords, domains, services, usernames and emails into a SQLite database. Every attempted file is remembered, so a rerun only picks up files it has never tried."
)]
pub struct Cli {
    /// Path to the SQLite database. Defaults to <data dir>/leakatlas/leakatlas.db
    #[arg(long, global = true, env = "LEAKATLAS_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates any missing tables and prints table status.
    Init,

    /// Prints which tables exist and their row counts.
    Status,

    /// Imports files from the start index until the first missing file.
    /// Files already in the ledger are skipped, including ones that failed.
    Import(ImportArgs),

    /// Lists files whose last attempt failed.
    Failures {
        #[arg(short, long, help = "List every processed file, not only failures")]
        all: bool,
    },

    /// Clears ledger entries so the next import attempts those files again.
    #[command(verbatim_doc_comment)]
    Forget {
        /// File indexes to clear.
        /// Can be a single index, comma-separated indexes, or a range.
        /// Examples:
        ///   leakatlas forget 414700
        ///   leakatlas forget 414700,414705
        ///   leakatlas forget 414700-414710,414800
        #[arg(value_name = "INDEX_LIST")]
        indexes: String,

        #[arg(long, default_value = "json", help = "File extension of the input documents")]
        ext: String,

        #[arg(short, long, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[arg(short, long, env = "LEAKATLAS_INPUT_DIR", default_value = "../data/database", help = "Directory holding the numbered JSON files")]
    pub input_dir: PathBuf,

    #[arg(short, long, env = "LEAKATLAS_START", default_value_t = 414700, help = "Index of the first file to read")]
    pub start: u64,

    #[arg(long, default_value = "json", help = "File extension of the input documents")]
    pub ext: String,

    #[arg(long, env = "LEAKATLAS_ERROR_LOG", default_value = "import_errors.log", help = "File that failed imports are appended to")]
    pub error_log: PathBuf,

    #[arg(short, long, help = "Print debug logs to stderr")]
    pub verbose: bool,
}
