// src/importer.rs

use crate::db;
use crate::error::{ImportError, Result};
use crate::models::ImportStats;
use crate::normalize::normalize;
use crate::source::{Document, DocumentSource};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// 一次导入所需的配置（连接另外传入）
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub input_dir: PathBuf,
    pub start_index: u64,
    pub extension: String,
    pub error_log: PathBuf,
}

#[derive(Debug)]
pub enum FileOutcome {
    /// 已有处理记录，包括失败的
    Skipped,
    Imported { inserted: usize },
    Failed { error: ImportError },
}

#[derive(Debug)]
pub struct ImportReport {
    pub stats: ImportStats,
    /// 第一个不存在的文件，扫描在此停止
    pub stopped_at: PathBuf,
}

/// 从 start_index 开始逐个导入，遇到第一个缺失的文件即停止。
/// 单个文件的错误只记入处理记录；处理记录本身写不进去（连接问题）才会中止整个导入。
pub fn run_import<F>(conn: &mut Connection, config: &ImportConfig, mut on_file: F) -> Result<ImportReport>
where
    F: FnMut(&Document, &FileOutcome),
{
    info!(
        dir = %config.input_dir.display(),
        start = config.start_index,
        "Starting import"
    );

    let mut stats = ImportStats::default();
    let mut source = DocumentSource::new(&config.input_dir, &config.extension, config.start_index);

    for doc in source.by_ref() {
        stats.seen += 1;

        if db::is_processed(conn, &doc.filename)? {
            debug!(filename = %doc.filename, "Already processed");
            on_file(&doc, &FileOutcome::Skipped);
            continue;
        }

        let outcome = match process_file(conn, &doc) {
            Ok(inserted) => {
                db::mark_processed(conn, &doc.filename, true, None)?;
                stats.inserted += inserted as u64;
                FileOutcome::Imported { inserted }
            }
            Err(e) => {
                error!(filename = %doc.filename, "Error processing {}: {}", doc.filename, e);
                db::mark_processed(conn, &doc.filename, false, Some(&e.to_string()))?;
                stats.errors += 1;
                FileOutcome::Failed { error: e }
            }
        };
        on_file(&doc, &outcome);
    }

    let stopped_at = source.expected_path();
    info!(
        seen = stats.seen,
        inserted = stats.inserted,
        errors = stats.errors,
        stopped_at = %stopped_at.display(),
        "Import finished"
    );

    Ok(ImportReport { stats, stopped_at })
}

fn process_file(conn: &mut Connection, doc: &Document) -> Result<usize> {
    let bytes = std::fs::read(&doc.path)?;
    let record = normalize(&bytes)?;
    debug!(
        filename = %doc.filename,
        index = doc.index,
        record_id = record.record.id,
        children = record.child_count(),
        "Writing record"
    );
    db::insert_record(conn, &record)
}
