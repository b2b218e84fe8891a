// ==========================================
// 内容频道导入引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含映射规则
// ==========================================
// 职责: 快照源与主库的数据访问接口,屏蔽数据库细节
// 约束: 值一律参数化；表名/列名来自反射，统一转义
// ==========================================

pub mod channel_repo;
pub mod destination_store;
pub mod destination_store_impl;
pub mod error;
pub mod source_store;
pub mod source_store_impl;
pub mod table_reflection;

// 重导出核心仓储
pub use channel_repo::ChannelRepository;
pub use destination_store::DestinationStore;
pub use destination_store_impl::SqliteDestinationStore;
pub use error::{RepositoryError, RepositoryResult};
pub use source_store::SourceStore;
pub use source_store_impl::SqliteSourceStore;
