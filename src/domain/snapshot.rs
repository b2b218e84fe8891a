// ==========================================
// 内容频道导入引擎 - 快照元数据
// ==========================================
// 来源: 快照库 content_channelmetadata 首行 + 结构推断
// ==========================================

use crate::domain::types::SchemaVersion;
use serde::{Deserialize, Serialize};

/// 快照元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// 频道 ID
    pub id: String,
    /// 频道名称
    pub name: String,
    /// 频道内容版本（每次发布递增）
    pub version: i64,
    /// 快照声明的最低 schema 版本（早期快照没有这一列）
    pub min_schema_version: Option<SchemaVersion>,
    /// 根据快照表结构推断出的 schema 版本
    pub inferred_schema_version: SchemaVersion,
    /// 根节点 ID
    pub root_id: String,
}

impl SnapshotMetadata {
    /// 用于版本分派的 schema 版本：优先取声明值，缺省时回落到推断值
    pub fn schema_version(&self) -> &SchemaVersion {
        self.min_schema_version
            .as_ref()
            .unwrap_or(&self.inferred_schema_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{NO_VERSION, VERSION_2};

    fn metadata(min_schema_version: Option<&str>) -> SnapshotMetadata {
        SnapshotMetadata {
            id: "c1".to_string(),
            name: "Channel".to_string(),
            version: 3,
            min_schema_version: min_schema_version.map(SchemaVersion::from),
            inferred_schema_version: SchemaVersion::new(NO_VERSION),
            root_id: "root".to_string(),
        }
    }

    #[test]
    fn test_declared_version_wins() {
        assert_eq!(metadata(Some(VERSION_2)).schema_version().as_str(), VERSION_2);
    }

    #[test]
    fn test_falls_back_to_inferred_version() {
        assert_eq!(metadata(None).schema_version().as_str(), NO_VERSION);
    }
}
