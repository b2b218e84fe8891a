// ==========================================
// 内容频道导入引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 仓储层错误原样透传，保留诊断信息
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 版本分派错误 =====
    #[error("快照 schema 版本 {version} 高于当前支持的版本 {current}")]
    FutureSchemaVersion { version: String, current: String },

    #[error("不支持的快照 schema 版本: {version}")]
    UnsupportedSchemaVersion { version: String },

    #[error("无法识别的快照 schema 版本: {version}")]
    InvalidSchemaVersion { version: String },

    // ===== 映射配置错误 =====
    #[error("映射配置无效 (实体 {entity}, 列 {column}): {message}")]
    InvalidMappingConfiguration {
        entity: String,
        column: String,
        message: String,
    },

    // ===== 快照错误 =====
    #[error("快照缺少频道元数据: {0}")]
    MetadataMissing(String),

    // ===== 配置错误 =====
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>（经由仓储层分类）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
