// ==========================================
// 内容频道导入引擎 - 导入层
// ==========================================
// 职责: 将频道快照按 schema 版本映射后导入主库
// 组成: 版本分派 → 映射策略 → 行/表映射 → tree_id 分配 → 批量写入
// ==========================================

// 模块声明
pub mod batch_writer;
pub mod channel_importer;
pub mod error;
pub mod import_context;
pub mod local_import;
pub mod metadata;
pub mod row_mapper;
pub mod strategy;
pub mod table_mapper;
pub mod tree_id;
pub mod version_resolver;

// 重导出核心类型
pub use batch_writer::{BatchWriter, WriteTarget};
pub use channel_importer::ChannelImporter;
pub use error::{ImportError, ImportResult};
pub use import_context::ImportContext;
pub use local_import::{content_database_path, import_channel_from_local_db};
pub use metadata::{infer_schema_version, read_snapshot_metadata};
pub use row_mapper::RowMapper;
pub use strategy::{ColumnSource, MappingRule, Procedure, RowSource, Strategy};
pub use table_mapper::{TableMapper, UniqueRows};
pub use tree_id::{allocate_tree_id, find_unique_tree_id};
pub use version_resolver::StrategyKind;
