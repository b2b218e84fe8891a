// ==========================================
// 内容频道导入引擎 - 行映射器 (RowMapper)
// ==========================================
// 职责: 源行 → 主库行（仅可写列，不含代理主键）
// 绑定: 导入每个实体前按源实体类型校验规则，首行之前暴露配置错误
// 取值:
// - 无规则: 读源行同名列，缺列视为缺省
// - ColumnAlias: 读源行另一列
// - Computed: 交给 ImportContext 求值
// 值为 NULL 的列不写入，由主库默认值补齐
// ==========================================

use crate::domain::{EntityType, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_context::ImportContext;
use crate::importer::strategy::{ColumnSource, MappingRule, Procedure};
use crate::repository::SourceStore;
use rusqlite::types::Value;

/// 绑定后的单列取值方式
#[derive(Debug, Clone, PartialEq, Eq)]
enum BoundColumn {
    /// 源行中的列（同名或改名）
    Source(String),
    Computed(Procedure),
}

#[derive(Debug, Clone)]
pub struct RowMapper {
    /// (目标列, 取值方式)，按目标表列顺序
    columns: Vec<(String, BoundColumn)>,
}

impl RowMapper {
    /// 将规则绑定到目标实体与源实体类型
    ///
    /// # 参数
    /// - destination: 目标实体类型
    /// - rule: 该实体的映射规则
    /// - source: 行来源实体类型（快照中不存在时为 None，此时不会有行，跳过别名校验）
    pub fn bind(
        destination: &EntityType,
        rule: &MappingRule,
        source: Option<&EntityType>,
    ) -> ImportResult<Self> {
        let invalid = |column: &str, message: String| ImportError::InvalidMappingConfiguration {
            entity: destination.name().to_string(),
            column: column.to_string(),
            message,
        };

        let surrogate = destination.surrogate_key().map(|c| c.name.as_str());
        for column in rule.columns.keys() {
            if !destination.has_column(column) {
                return Err(invalid(column, "目标实体没有该列".to_string()));
            }
            if surrogate == Some(column.as_str()) {
                return Err(invalid(column, "代理主键由主库分配，不可映射".to_string()));
            }
        }

        let mut columns = Vec::new();
        for column in destination.writable_columns() {
            let bound = match rule.columns.get(&column.name) {
                None => BoundColumn::Source(column.name.clone()),
                Some(ColumnSource::Computed(procedure)) => BoundColumn::Computed(*procedure),
                Some(ColumnSource::ColumnAlias(alias)) => {
                    if let Some(source) = source {
                        if !source.has_column(alias) {
                            return Err(invalid(
                                &column.name,
                                format!("源实体 {} 没有列 {}", source.name(), alias),
                            ));
                        }
                    }
                    BoundColumn::Source(alias.clone())
                }
            };
            columns.push((column.name.clone(), bound));
        }

        Ok(Self { columns })
    }

    /// 目标列数量
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 解析单个目标列的值（None 表示缺省）
    pub fn resolve<S: SourceStore>(
        &self,
        row: &Row,
        column: &str,
        ctx: &mut ImportContext<'_, S>,
    ) -> ImportResult<Option<Value>> {
        match self.columns.iter().find(|(name, _)| name == column) {
            Some((_, bound)) => Self::resolve_bound(bound, row, ctx),
            None => Ok(None),
        }
    }

    fn resolve_bound<S: SourceStore>(
        bound: &BoundColumn,
        row: &Row,
        ctx: &mut ImportContext<'_, S>,
    ) -> ImportResult<Option<Value>> {
        let value = match bound {
            BoundColumn::Source(name) => row.get(name).cloned(),
            BoundColumn::Computed(procedure) => Some(ctx.compute(*procedure, row)?),
        };
        Ok(value.filter(|v| *v != Value::Null))
    }

    /// 映射一整行
    pub fn map_row<S: SourceStore>(
        &self,
        row: &Row,
        ctx: &mut ImportContext<'_, S>,
    ) -> ImportResult<Row> {
        let mut mapped = Row::new();
        for (column, bound) in &self.columns {
            if let Some(value) = Self::resolve_bound(bound, row, ctx)? {
                mapped.insert(column.clone(), value);
            }
        }
        Ok(mapped)
    }
}
