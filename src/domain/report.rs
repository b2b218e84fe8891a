// ==========================================
// 内容频道导入引擎 - 导入结果
// ==========================================

use crate::domain::types::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// ImportReport - 单次导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub import_id: Uuid,
    pub channel_id: String,
    pub schema_version: SchemaVersion,
    /// 实际采用的导入策略名
    pub strategy: String,
    pub tree_id: i64,
    /// 表名 → 写入行数
    pub entity_counts: BTreeMap<String, usize>,
    pub elapsed_ms: u64,
}

impl ImportReport {
    pub fn total_rows(&self) -> usize {
        self.entity_counts.values().sum()
    }

    pub fn rows_for(&self, entity: &str) -> usize {
        self.entity_counts.get(entity).copied().unwrap_or(0)
    }
}

// ==========================================
// ImportOutcome - 本地导入流程结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportOutcome {
    Imported(ImportReport),
    /// 主库中已有相同或更新版本的频道
    Skipped {
        channel_id: String,
        existing_version: i64,
        snapshot_version: i64,
    },
}

impl ImportOutcome {
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            ImportOutcome::Imported(report) => Some(report),
            ImportOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ImportOutcome::Skipped { .. })
    }
}
