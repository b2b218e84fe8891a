// ==========================================
// 内容频道导入引擎 - 快照源 Store Trait
// ==========================================
// 职责: 只读访问频道快照（表结构、行迭代、按键查询）
// 红线: 不含映射规则，不做任何写入
// ==========================================

use crate::domain::{EntityType, Row};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;

// ==========================================
// SourceStore Trait
// ==========================================
// 实现者: SqliteSourceStore（只读 rusqlite 连接）
pub trait SourceStore {
    /// 获取实体类型定义
    ///
    /// # 返回
    /// - Err(NotFound): 快照中没有这张表
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType>;

    /// 按源端迭代顺序读取某实体的全部行
    fn fetch_rows(&self, entity: &str) -> RepositoryResult<Vec<Row>>;

    /// 按某列取第一条匹配行（用于引用记录的解析）
    fn fetch_row_by_key(
        &self,
        entity: &str,
        column: &str,
        key: &Value,
    ) -> RepositoryResult<Option<Row>>;

    /// 快照中是否存在该实体（NotFound 以外的错误照常上抛）
    fn has_entity_type(&self, name: &str) -> RepositoryResult<bool> {
        match self.get_entity_type(name) {
            Ok(_) => Ok(true),
            Err(RepositoryError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<T: SourceStore + ?Sized> SourceStore for &T {
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType> {
        (**self).get_entity_type(name)
    }

    fn fetch_rows(&self, entity: &str) -> RepositoryResult<Vec<Row>> {
        (**self).fetch_rows(entity)
    }

    fn fetch_row_by_key(
        &self,
        entity: &str,
        column: &str,
        key: &Value,
    ) -> RepositoryResult<Option<Row>> {
        (**self).fetch_row_by_key(entity, column, key)
    }
}
