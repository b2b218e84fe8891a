// ==========================================
// 内容频道导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite)
// 定位: 将自包含的频道快照按 schema 版本导入主库，整次导入原子提交
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体类型、行、版本
pub mod domain;

// 数据仓储层 - 快照源与主库
pub mod repository;

// 导入层 - 版本分派与映射写入
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/内容表结构）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigManager, ImportConfigReader, ImportOptions};
pub use domain::{ImportOutcome, ImportReport, Row, SchemaVersion, SnapshotMetadata, WriteMode};
pub use importer::{import_channel_from_local_db, ChannelImporter, ImportError, ImportResult};
pub use repository::{
    DestinationStore, RepositoryError, RepositoryResult, SourceStore, SqliteDestinationStore,
    SqliteSourceStore,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "内容频道导入引擎";
