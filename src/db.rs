// src/db.rs

use crate::error::{ImportError, Result};
use crate::models::{LedgerEntry, NormalizedRecord, TableStatus};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub const MAX_ERROR_LEN: usize = 1000;

pub const TABLES: [&str; 7] = [
    "records",
    "passwords",
    "domain_names",
    "services",
    "usernames",
    "email_addresses",
    "processed_files",
];

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY,
        device_ip_addr TEXT,
        timestamp TEXT,
        country TEXT,
        keyboard TEXT
    );
    CREATE TABLE IF NOT EXISTS passwords (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER REFERENCES records(id) ON DELETE CASCADE,
        password TEXT
    );
    CREATE TABLE IF NOT EXISTS domain_names (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER REFERENCES records(id) ON DELETE CASCADE,
        domain TEXT
    );
    CREATE TABLE IF NOT EXISTS services (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER REFERENCES records(id) ON DELETE CASCADE,
        service_url TEXT
    );
    CREATE TABLE IF NOT EXISTS usernames (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER REFERENCES records(id) ON DELETE CASCADE,
        username TEXT
    );
    CREATE TABLE IF NOT EXISTS email_addresses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER REFERENCES records(id) ON DELETE CASCADE,
        email TEXT
    );
    CREATE TABLE IF NOT EXISTS processed_files (
        filename TEXT PRIMARY KEY,
        success INTEGER NOT NULL,
        error_msg TEXT,
        processed_at TEXT NOT NULL
    );
";

/// 获取数据库文件的默认路径 (<data dir>/leakatlas/leakatlas.db)
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(ImportError::DataDirNotFound)?;
    Ok(data_dir.join("leakatlas").join("leakatlas.db"))
}

/// 打开数据库连接，并开启外键约束
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// 初始化数据库，如果表不存在则创建
pub fn initialize_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// 各表是否存在及其行数
pub fn table_status(conn: &Connection) -> Result<Vec<TableStatus>> {
    let mut out = Vec::with_capacity(TABLES.len());
    for name in TABLES {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
                [name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        let rows = if exists {
            Some(conn.query_row(&format!("SELECT COUNT(*) FROM {}", name), [], |row| row.get(0))?)
        } else {
            None
        };
        out.push(TableStatus { name, rows });
    }
    Ok(out)
}

/// 在同一个事务中写入主记录和全部子记录，出错则整体回滚。
/// 主记录已存在时不覆盖，子记录照常追加。返回 1 表示新建，0 表示已存在。
pub fn insert_record(conn: &mut Connection, doc: &NormalizedRecord) -> Result<usize> {
    let tx = conn.transaction()?;
    let r = &doc.record;

    let inserted = tx.execute(
        "INSERT INTO records (id, device_ip_addr, timestamp, country, keyboard)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (id) DO NOTHING",
        params![r.id, r.device_ip_addr, r.timestamp, r.country, r.keyboard],
    )?;

    for (table, column, values) in doc.children() {
        if values.is_empty() {
            continue;
        }
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} (record_id, {}) VALUES (?1, ?2)",
            table, column
        ))?;
        for value in values {
            stmt.execute(params![r.id, value])?;
        }
    }

    tx.commit()?;
    Ok(inserted)
}

/// 文件是否处理过（无论成功失败，失败的也不会自动重试）
pub fn is_processed(conn: &Connection, filename: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM processed_files WHERE filename = ? LIMIT 1",
            [filename],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// 插入或覆盖文件的处理记录，错误信息截断为 MAX_ERROR_LEN 个字符
pub fn mark_processed(
    conn: &Connection,
    filename: &str,
    success: bool,
    error_msg: Option<&str>,
) -> Result<()> {
    let error_msg = error_msg.map(truncate_error);
    let processed_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO processed_files (filename, success, error_msg, processed_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (filename) DO UPDATE
         SET success = excluded.success,
             error_msg = excluded.error_msg,
             processed_at = excluded.processed_at",
        params![filename, success, error_msg, processed_at],
    )?;
    Ok(())
}

fn truncate_error(msg: &str) -> String {
    msg.chars().take(MAX_ERROR_LEN).collect()
}

/// 按文件名列出处理记录，`failed_only` 时只列出失败的
pub fn ledger_entries(conn: &Connection, failed_only: bool) -> Result<Vec<LedgerEntry>> {
    let mut query = String::from("SELECT filename, success, error_msg, processed_at FROM processed_files ");
    if failed_only {
        query.push_str("WHERE success = 0 ");
    }
    query.push_str("ORDER BY filename");

    let mut stmt = conn.prepare(&query)?;
    let entries = stmt
        .query_map([], |row| {
            Ok(LedgerEntry {
                filename: row.get(0)?,
                success: row.get(1)?,
                error_msg: row.get(2)?,
                processed_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// 删除处理记录，下次导入时会重新处理这些文件
pub fn forget(conn: &mut Connection, filenames: &[String]) -> Result<usize> {
    // 逐条删除，避免超出 SQLite 的参数个数上限
    let tx = conn.transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM processed_files WHERE filename = ?")?;
        for filename in filenames {
            count += stmt.execute([filename])?;
        }
    }
    tx.commit()?;
    Ok(count)
}
