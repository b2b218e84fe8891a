// ==========================================
// 内容频道导入引擎 - 版本分派
// ==========================================
// 职责: 快照 schema 版本 → 导入策略
// 规则: 精确查表；查不到时按是否为数字区分
// - 数字且大于当前版本: FutureSchemaVersion
// - 数字且不大于当前版本: UnsupportedSchemaVersion
// - 非数字: InvalidSchemaVersion
// ==========================================

use crate::domain::types::{
    SchemaVersion, CONTENT_SCHEMA_VERSION, NO_VERSION, V020BETA1, V040BETA3, VERSION_1, VERSION_2,
};
use crate::domain::SnapshotMetadata;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::strategy::Strategy;
use std::cmp::Ordering;

/// 策略种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Current,
    NoVersion,
}

impl StrategyKind {
    pub fn build(self) -> Strategy {
        match self {
            StrategyKind::Current => Strategy::current(),
            StrategyKind::NoVersion => Strategy::no_version(),
        }
    }
}

/// 版本 → 策略
const VERSION_TABLE: &[(&str, StrategyKind)] = &[
    (V020BETA1, StrategyKind::NoVersion),
    (V040BETA3, StrategyKind::NoVersion),
    (NO_VERSION, StrategyKind::NoVersion),
    (VERSION_1, StrategyKind::Current),
    (VERSION_2, StrategyKind::Current),
];

/// 读取快照用于分派的版本（声明的最低版本优先，否则取推断版本）
pub fn detect(metadata: &SnapshotMetadata) -> SchemaVersion {
    metadata.schema_version().clone()
}

/// 精确查表得到策略种类
pub fn resolve_kind(version: &SchemaVersion) -> ImportResult<StrategyKind> {
    if let Some((_, kind)) = VERSION_TABLE.iter().find(|(v, _)| *v == version.as_str()) {
        return Ok(*kind);
    }

    let current = SchemaVersion::current();
    let current_number = current.as_number().unwrap_or_default();
    match version.compare_number(current_number) {
        Some(Ordering::Greater) => Err(ImportError::FutureSchemaVersion {
            version: version.to_string(),
            current: CONTENT_SCHEMA_VERSION.to_string(),
        }),
        Some(_) => Err(ImportError::UnsupportedSchemaVersion {
            version: version.to_string(),
        }),
        None => Err(ImportError::InvalidSchemaVersion {
            version: version.to_string(),
        }),
    }
}

/// 版本 → 策略
pub fn resolve(version: &SchemaVersion) -> ImportResult<Strategy> {
    resolve_kind(version).map(StrategyKind::build)
}
