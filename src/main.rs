// src/main.rs

mod cli;
mod commands;
mod db;
mod error;
mod importer;
mod logging;
mod models;
mod normalize;
mod source;

use clap::Parser;
use cli::{Cli, Commands};
use error::Result;

fn run(cli: Cli) -> Result<()> {
    let db_path = match cli.db {
        Some(path) => path,
        None => db::default_db_path()?,
    };

    match cli.command {
        Commands::Init => commands::handle_init(&db_path),
        Commands::Status => commands::handle_status(&db_path),
        Commands::Import(args) => commands::handle_import(&db_path, args),
        Commands::Failures { all } => commands::handle_failures(&db_path, all),
        Commands::Forget { indexes, ext, yes } => commands::handle_forget(&db_path, &indexes, &ext, yes),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
