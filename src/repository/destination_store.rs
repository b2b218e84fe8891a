// ==========================================
// 内容频道导入引擎 - 主库 Store Trait
// ==========================================
// 职责: 主库写入接口（批量插入、按主键 upsert、事务控制）
// 红线: 不含映射规则；事务边界由导入引擎决定
// ==========================================

use crate::domain::{EntityType, Row};
use crate::repository::error::RepositoryResult;
use rusqlite::types::Value;

// ==========================================
// DestinationStore Trait
// ==========================================
// 实现者: SqliteDestinationStore（rusqlite 读写连接）
pub trait DestinationStore {
    /// 获取实体类型定义
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType>;

    /// 某列的去重取值（升序）
    fn distinct_values(&self, entity: &str, column: &str) -> RepositoryResult<Vec<Value>>;

    /// 批量插入（不指定冲突目标，主键冲突即失败）
    ///
    /// # 返回
    /// - Ok(usize): 插入行数
    fn bulk_insert(&self, entity: &EntityType, rows: &[Row]) -> RepositoryResult<usize>;

    /// 按主键 upsert 单行
    fn upsert(&self, entity: &EntityType, row: &Row) -> RepositoryResult<()>;

    /// 将已提交给连接的写入推进到存储（释放缓存语句等）
    fn flush(&self) -> RepositoryResult<()>;

    fn begin(&self) -> RepositoryResult<()>;

    fn commit(&self) -> RepositoryResult<()>;

    fn rollback(&self) -> RepositoryResult<()>;
}

impl<T: DestinationStore + ?Sized> DestinationStore for &T {
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType> {
        (**self).get_entity_type(name)
    }

    fn distinct_values(&self, entity: &str, column: &str) -> RepositoryResult<Vec<Value>> {
        (**self).distinct_values(entity, column)
    }

    fn bulk_insert(&self, entity: &EntityType, rows: &[Row]) -> RepositoryResult<usize> {
        (**self).bulk_insert(entity, rows)
    }

    fn upsert(&self, entity: &EntityType, row: &Row) -> RepositoryResult<()> {
        (**self).upsert(entity, row)
    }

    fn flush(&self) -> RepositoryResult<()> {
        (**self).flush()
    }

    fn begin(&self) -> RepositoryResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> RepositoryResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> RepositoryResult<()> {
        (**self).rollback()
    }
}
