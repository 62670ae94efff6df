// src/commands.rs

use crate::cli::ImportArgs;
use crate::db;
use crate::error::{ImportError, Result};
use crate::importer::{self, FileOutcome, ImportConfig};
use crate::logging;
use crate::source::filename_for;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

fn print_status(conn: &Connection) -> Result<()> {
    let status = db::table_status(conn)?;
    let existing: Vec<_> = status.iter().filter(|t| t.rows.is_some()).collect();

    println!("=== Schema Status ===");
    println!("Total expected tables: {}", status.len());
    println!("Existing tables:       {}", existing.len());

    if existing.is_empty() {
        println!("No target tables exist yet.");
        return Ok(());
    }

    println!("\nRow counts:");
    for table in existing {
        println!(" {:16} -> {} rows", table.name, table.rows.unwrap_or(0));
    }
    Ok(())
}

/// 处理 'init' 命令
pub fn handle_init(db_path: &Path) -> Result<()> {
    let conn = db::open_connection(db_path)?;
    db::initialize_db(&conn)?;
    println!("✓ Database initialized at: {}", db_path.display());
    print_status(&conn)
}

/// 处理 'status' 命令
pub fn handle_status(db_path: &Path) -> Result<()> {
    let conn = db::open_connection(db_path)?;
    print_status(&conn)
}

/// 处理 'import' 命令
pub fn handle_import(db_path: &Path, args: ImportArgs) -> Result<()> {
    let config = ImportConfig {
        input_dir: args.input_dir,
        start_index: args.start,
        extension: args.ext,
        error_log: args.error_log,
    };
    if !config.input_dir.is_dir() {
        println!("JSON directory does not exist: {}", config.input_dir.display());
        return Ok(());
    }

    let _guard = logging::init_logging(&config.error_log, args.verbose)?;

    let mut conn = db::open_connection(db_path)?;
    let report = importer::run_import(&mut conn, &config, |doc, outcome| match outcome {
        FileOutcome::Skipped => println!("[SKIP] Already processed: {}", doc.filename),
        FileOutcome::Imported { inserted } => println!(
            "[PROC] Processed: {} ({})",
            doc.filename,
            if *inserted == 1 { "new record" } else { "record already present" }
        ),
        FileOutcome::Failed { error } => {
            println!("[ERR ] Error processing {}: {}", doc.filename, error)
        }
    })?;

    println!("No file found: {}. Stopping.", report.stopped_at.display());
    println!("\n=== IMPORT COMPLETE ===");
    println!("Files seen (contiguous from start):   {}", report.stats.seen);
    println!("Main records inserted (new rows):     {}", report.stats.inserted);
    println!("Files with errors:                    {}", report.stats.errors);
    println!("Error log file:                       {}", config.error_log.display());
    Ok(())
}

/// 处理 'failures' 命令
pub fn handle_failures(db_path: &Path, all: bool) -> Result<()> {
    let conn = db::open_connection(db_path)?;
    let entries = db::ledger_entries(&conn, !all)?;

    if entries.is_empty() {
        println!("{}", if all { "No processed files." } else { "No failed files." });
        return Ok(());
    }

    for entry in &entries {
        let status = if entry.success { "[ OK ]" } else { "[ERR ]" };
        println!("{} {}  {}", status, entry.filename, entry.processed_at);
        if let Some(msg) = &entry.error_msg {
            println!("  └─ {}", msg);
        }
    }
    println!("{} file(s).", entries.len());
    Ok(())
}

/// 解析序号范围字符串 (例如 "1,3,5-7")
fn parse_index_range(s: &str) -> Result<Vec<u64>> {
    let mut ids = BTreeSet::new(); // 自动排序和去重
    for part in s.split(',') {
        let part = part.trim();
        if part.contains('-') {
            let mut range_parts = part.splitn(2, '-');
            let start_str = range_parts.next().unwrap_or("").trim();
            let end_str = range_parts.next().unwrap_or("").trim();

            if start_str.is_empty() || end_str.is_empty() {
                return Err(ImportError::InvalidInput(format!("Invalid range: {}", part)));
            }
            let start: u64 = start_str.parse().map_err(|_| ImportError::InvalidInput(format!("Invalid index: {}", start_str)))?;
            let end: u64 = end_str.parse().map_err(|_| ImportError::InvalidInput(format!("Invalid index: {}", end_str)))?;

            if start > end {
                return Err(ImportError::InvalidInput(format!("Start of range {} cannot be greater than end {}", start, end)));
            }
            ids.extend(start..=end);
        } else if !part.is_empty() {
            let id: u64 = part.parse().map_err(|_| ImportError::InvalidInput(format!("Invalid index: {}", part)))?;
            ids.insert(id);
        }
    }
    Ok(ids.into_iter().collect())
}

/// 处理 'forget' 命令
pub fn handle_forget(db_path: &Path, indexes: &str, ext: &str, yes: bool) -> Result<()> {
    let filenames: Vec<String> = parse_index_range(indexes)?
        .into_iter()
        .map(|i| filename_for(i, ext))
        .collect();

    if filenames.is_empty() {
        println!("No valid indexes given.");
        return Ok(());
    }

    if !yes {
        println!(
            "\nThe following files will be attempted again on the next import: {:?}",
            filenames
        );
        print!("Confirm? (y/N): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut conn = db::open_connection(db_path)?;
    let count = db::forget(&mut conn, &filenames)?;
    println!("✓ Cleared {} ledger entr{}.", count, if count == 1 { "y" } else { "ies" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_list_and_ranges() {
        assert_eq!(parse_index_range("5").unwrap(), vec![5]);
        assert_eq!(parse_index_range("3, 8,5").unwrap(), vec![3, 5, 8]);
        assert_eq!(parse_index_range("3,7-9,12,8").unwrap(), vec![3, 7, 8, 9, 12]);
        assert!(parse_index_range(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(parse_index_range("9-7").is_err());
        assert!(parse_index_range("1-").is_err());
        assert!(parse_index_range("abc").is_err());
        assert!(parse_index_range("-3").is_err());
    }

    #[test]
    fn missing_input_dir_is_reported_without_touching_the_db() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let args = ImportArgs {
            input_dir: dir.path().join("nope"),
            start: 1,
            ext: "json".to_string(),
            error_log: dir.path().join("import_errors.log"),
            verbose: false,
        };

        handle_import(&db_path, args).unwrap();
        assert!(!db_path.exists());
        assert!(!dir.path().join("import_errors.log").exists());
    }

    #[test]
    fn forget_with_yes_clears_entries() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        {
            let conn = db::open_connection(&db_path).unwrap();
            db::initialize_db(&conn).unwrap();
            db::mark_processed(&conn, "0000007.json", false, Some("bad")).unwrap();
            db::mark_processed(&conn, "0000008.json", true, None).unwrap();
        }

        handle_forget(&db_path, "7", "json", true).unwrap();

        let conn = db::open_connection(&db_path).unwrap();
        assert!(!db::is_processed(&conn, "0000007.json").unwrap());
        assert!(db::is_processed(&conn, "0000008.json").unwrap());
    }
}
