// ==========================================
// 内容频道导入引擎 - 领域模型层
// ==========================================
// 职责: 定义实体类型、行数据、版本标识、导入结果
// 红线: 不含数据访问逻辑,不含导入流程
// ==========================================

pub mod entity;
pub mod report;
pub mod row;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use entity::{
    registration, tables, Column, EntityRegistration, EntityType, CONTENT_ENTITIES,
    TREE_ID_COLUMN,
};
pub use report::{ImportOutcome, ImportReport};
pub use row::{Row, RowKey};
pub use snapshot::SnapshotMetadata;
pub use types::{SchemaVersion, WriteMode};
