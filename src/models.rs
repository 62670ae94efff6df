// src/models.rs

use chrono::NaiveDate;

// records 表的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub device_ip_addr: Option<String>,
    pub timestamp: Option<NaiveDate>,
    pub country: Option<String>,
    pub keyboard: Option<String>,
}

/// 一个文档解析后的结果：主记录 + 五个子集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub record: Record,
    pub passwords: Vec<Option<String>>,
    pub domain_names: Vec<Option<String>>,
    pub services: Vec<Option<String>>,
    pub usernames: Vec<Option<String>>,
    pub email_addresses: Vec<Option<String>>,
}

impl NormalizedRecord {
    /// 每个子表的 (表名, 值列, 值)，按插入顺序
    pub fn children(&self) -> [(&'static str, &'static str, &[Option<String>]); 5] {
        [
            ("passwords", "password", &self.passwords),
            ("domain_names", "domain", &self.domain_names),
            ("services", "service_url", &self.services),
            ("usernames", "username", &self.usernames),
            ("email_addresses", "email", &self.email_addresses),
        ]
    }

    pub fn child_count(&self) -> usize {
        self.children().iter().map(|(_, _, values)| values.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub filename: String,
    pub success: bool,
    pub error_msg: Option<String>,
    pub processed_at: String, // RFC3339 字符串
}

#[derive(Debug)]
pub struct TableStatus {
    pub name: &'static str,
    pub rows: Option<i64>, // 表不存在时为 None
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub seen: u64,
    pub inserted: u64,
    pub errors: u64,
}
