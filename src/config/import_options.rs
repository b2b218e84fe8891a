// ==========================================
// 内容频道导入引擎 - 导入选项
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// BatchWriter 默认刷新阈值（跨实体累计行数）
pub const DEFAULT_FLUSH_THRESHOLD: usize = 10_000;

/// 导入选项（由 ConfigManager 从 config_kv 汇总）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub flush_threshold: usize,
    /// 频道快照所在目录
    pub content_database_dir: PathBuf,
}

impl ImportOptions {
    pub fn with_flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    pub fn with_content_database_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_database_dir = dir.into();
        self
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            content_database_dir: default_content_database_dir(),
        }
    }
}

/// 默认快照目录: <data_dir>/kolibri/content/databases
///
/// 平台无数据目录时退回当前目录下的相对路径
pub fn default_content_database_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kolibri")
        .join("content")
        .join("databases")
}
