// ==========================================
// 内容频道导入引擎 - 表映射器 (TableMapper)
// ==========================================
// 职责: 产出喂给某个目标实体的源行序列
// - 默认: 读取源端同名实体的全部行；源端无此实体时为空序列
// - 替代行来源: 读取另一张源表并去重（源表缺失为 NotFound，去重列缺失为配置错误）
// ==========================================

use crate::domain::{EntityType, Row, RowKey};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::strategy::{MappingRule, RowSource};
use crate::repository::SourceStore;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMapper {
    /// 同名实体
    Direct { entity: String },
    /// 替代行来源（按 key 去重）
    UniqueBy { entity: String, key: String },
}

impl TableMapper {
    pub fn new(destination: &str, rule: &MappingRule) -> Self {
        match &rule.row_source {
            None => TableMapper::Direct {
                entity: destination.to_string(),
            },
            Some(RowSource::UniqueBy { entity, key }) => TableMapper::UniqueBy {
                entity: entity.clone(),
                key: key.clone(),
            },
        }
    }

    /// 实际读取的源实体类型
    ///
    /// # 返回
    /// - Ok(None): 默认行来源且快照中没有该实体
    pub fn source_entity<S: SourceStore>(&self, source: &S) -> ImportResult<Option<EntityType>> {
        match self {
            TableMapper::Direct { entity } => {
                if source.has_entity_type(entity)? {
                    Ok(Some(source.get_entity_type(entity)?))
                } else {
                    Ok(None)
                }
            }
            TableMapper::UniqueBy { entity, key } => {
                Ok(Some(unique_source_entity(source, entity, key)?))
            }
        }
    }

    /// 源行序列（保持源端顺序）
    pub fn rows<S: SourceStore>(
        &self,
        source: &S,
    ) -> ImportResult<Box<dyn Iterator<Item = Row>>> {
        match self {
            TableMapper::Direct { entity } => {
                if !source.has_entity_type(entity)? {
                    return Ok(Box::new(std::iter::empty()));
                }
                Ok(Box::new(source.fetch_rows(entity)?.into_iter()))
            }
            TableMapper::UniqueBy { entity, key } => {
                unique_source_entity(source, entity, key)?;
                let rows = source.fetch_rows(entity)?;
                Ok(Box::new(UniqueRows::new(rows.into_iter(), key)))
            }
        }
    }
}

/// 替代行来源的实体类型；去重列必须存在，否则每行的键都是 NULL
fn unique_source_entity<S: SourceStore>(
    source: &S,
    entity: &str,
    key: &str,
) -> ImportResult<EntityType> {
    let entity_type = source.get_entity_type(entity)?;
    if !entity_type.has_column(key) {
        return Err(ImportError::InvalidMappingConfiguration {
            entity: entity.to_string(),
            column: key.to_string(),
            message: format!("去重列 {} 不在源实体 {} 中", key, entity),
        });
    }
    Ok(entity_type)
}

// ==========================================
// UniqueRows - 按列去重（先到先得）
// ==========================================
pub struct UniqueRows<I> {
    inner: I,
    key: String,
    seen: HashSet<RowKey>,
}

impl<I: Iterator<Item = Row>> UniqueRows<I> {
    pub fn new(inner: I, key: &str) -> Self {
        Self {
            inner,
            key: key.to_string(),
            seen: HashSet::new(),
        }
    }
}

impl<I: Iterator<Item = Row>> Iterator for UniqueRows<I> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        for row in self.inner.by_ref() {
            if self.seen.insert(row.key(&self.key)) {
                return Some(row);
            }
        }
        None
    }
}
