// src/source.rs

use std::path::PathBuf;

pub const INDEX_WIDTH: usize = 7;

/// 序号补零到 7 位，例如 0414700.json
pub fn filename_for(index: u64, extension: &str) -> String {
    format!("{:0width$}.{}", index, extension, width = INDEX_WIDTH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub index: u64,
    pub filename: String,
    pub path: PathBuf,
}

/// 从 start 开始逐个读取，遇到第一个缺失的文件即停止
#[derive(Debug)]
pub struct DocumentSource {
    dir: PathBuf,
    extension: String,
    next: u64,
    done: bool,
}

impl DocumentSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, start: u64) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            next: start,
            done: false,
        }
    }

    /// 结束后即为缺失的那个文件
    pub fn expected_path(&self) -> PathBuf {
        self.dir.join(filename_for(self.next, &self.extension))
    }
}

impl Iterator for DocumentSource {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        if self.done {
            return None;
        }
        let filename = filename_for(self.next, &self.extension);
        let path = self.dir.join(&filename);
        if !path.exists() {
            self.done = true;
            return None;
        }
        let doc = Document {
            index: self.next,
            filename,
            path,
        };
        self.next += 1;
        Some(doc)
    }
}
