// ==========================================
// 内容频道导入引擎 - 映射策略 (Strategy)
// ==========================================
// 职责: 按实体声明列映射规则与替代行来源
// - base: 与版本无关的结构规则（层级实体打 tree_id）
// - current: 当前 schema，直接沿用 base
// - no_version: 早期快照（无 LocalFile 表、许可证为外键）
// 组合: Strategy::layered(base, overlay)，同列以 overlay 为准
// ==========================================

use crate::domain::entity::{tables, CONTENT_ENTITIES, TREE_ID_COLUMN};
use std::collections::BTreeMap;

// ==========================================
// Procedure - 计算列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// 本次导入分配的 tree_id
    TreeId,
    /// 固定返回 NULL（列被省略，由主库默认值补齐）
    Null,
    /// 快照所属频道 ID
    ChannelId,
    /// 经 license_id 查得的许可证名称
    LicenseName,
    /// 经 license_id 查得的许可证描述
    LicenseDescription,
    /// 固定返回 "unversioned"
    NoVersionMarker,
}

// ==========================================
// ColumnSource - 单列取值规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// 读取源行的另一列（纯改名）
    ColumnAlias(String),
    Computed(Procedure),
}

impl ColumnSource {
    pub fn alias(column: &str) -> Self {
        ColumnSource::ColumnAlias(column.to_string())
    }
}

// ==========================================
// RowSource - 替代行来源
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSource {
    /// 读取另一张源表，按 key 去重（先到先得，保持原顺序）
    UniqueBy { entity: String, key: String },
}

// ==========================================
// MappingRule - 单实体映射规则
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingRule {
    /// 目标列 → 取值规则
    pub columns: BTreeMap<String, ColumnSource>,
    pub row_source: Option<RowSource>,
}

/// 未登记实体使用的空规则
static EMPTY_RULE: MappingRule = MappingRule {
    columns: BTreeMap::new(),
    row_source: None,
};

impl MappingRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: &str, source: ColumnSource) -> Self {
        self.columns.insert(column.to_string(), source);
        self
    }

    pub fn row_source(mut self, row_source: RowSource) -> Self {
        self.row_source = Some(row_source);
        self
    }

    /// 叠加规则：同名列以 overlay 为准，overlay 设置了行来源时覆盖
    fn overlaid_with(mut self, overlay: MappingRule) -> Self {
        self.columns.extend(overlay.columns);
        if overlay.row_source.is_some() {
            self.row_source = overlay.row_source;
        }
        self
    }
}

// ==========================================
// Strategy - 实体 → 映射规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    name: String,
    rules: BTreeMap<String, MappingRule>,
}

impl Strategy {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, entity: &str, rule: MappingRule) -> Self {
        self.rules.insert(entity.to_string(), rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 取实体规则；未登记的实体返回空规则
    pub fn rule_for(&self, entity: &str) -> &MappingRule {
        self.rules.get(entity).unwrap_or(&EMPTY_RULE)
    }

    /// 与版本无关的结构规则：每个层级实体都写入本次分配的 tree_id
    pub fn base() -> Self {
        CONTENT_ENTITIES
            .iter()
            .filter(|r| r.hierarchical)
            .fold(Self::new("base"), |strategy, registration| {
                strategy.with_rule(
                    registration.name,
                    MappingRule::new().column(TREE_ID_COLUMN, ColumnSource::Computed(Procedure::TreeId)),
                )
            })
    }

    /// 在 base 之上叠加 overlay（名称取 overlay）
    pub fn layered(base: Strategy, overlay: Strategy) -> Self {
        let mut rules = base.rules;
        for (entity, rule) in overlay.rules {
            let merged = match rules.remove(&entity) {
                Some(existing) => existing.overlaid_with(rule),
                None => rule,
            };
            rules.insert(entity, merged);
        }

        Self {
            name: overlay.name,
            rules,
        }
    }

    /// 当前 schema 的快照：表名列名一一对应，只需结构规则
    pub fn current() -> Self {
        Self::layered(Self::base(), Self::new("current"))
    }

    /// 早期（未声明版本）快照
    pub fn no_version() -> Self {
        let overlay = Self::new("no_version")
            .with_rule(
                tables::CONTENT_NODE,
                MappingRule::new()
                    .column("channel_id", ColumnSource::Computed(Procedure::ChannelId))
                    .column("available", ColumnSource::Computed(Procedure::Null))
                    .column("license_name", ColumnSource::Computed(Procedure::LicenseName))
                    .column(
                        "license_description",
                        ColumnSource::Computed(Procedure::LicenseDescription),
                    ),
            )
            .with_rule(
                tables::FILE,
                MappingRule::new()
                    .column("local_file_id", ColumnSource::alias("checksum"))
                    .column("available", ColumnSource::Computed(Procedure::Null)),
            )
            .with_rule(
                tables::LOCAL_FILE,
                // 早期快照没有 LocalFile 表，按 checksum 从 File 表生成
                MappingRule::new()
                    .row_source(RowSource::UniqueBy {
                        entity: tables::FILE.to_string(),
                        key: "checksum".to_string(),
                    })
                    .column("id", ColumnSource::alias("checksum"))
                    .column("extension", ColumnSource::alias("extension"))
                    .column("file_size", ColumnSource::alias("file_size"))
                    .column("available", ColumnSource::Computed(Procedure::Null)),
            )
            .with_rule(
                tables::CHANNEL_METADATA,
                MappingRule::new()
                    .column(
                        "min_schema_version",
                        ColumnSource::Computed(Procedure::NoVersionMarker),
                    )
                    .column("root_id", ColumnSource::alias("root_pk")),
            );

        Self::layered(Self::base(), overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_stamps_tree_id_on_hierarchical_entities() {
        let base = Strategy::base();
        assert_eq!(
            base.rule_for(tables::CONTENT_NODE).columns.get(TREE_ID_COLUMN),
            Some(&ColumnSource::Computed(Procedure::TreeId))
        );
        assert!(base.rule_for(tables::FILE).columns.is_empty());
    }

    #[test]
    fn test_unlisted_entity_gets_empty_rule() {
        let rule = Strategy::current().rule_for(tables::LANGUAGE).clone();
        assert_eq!(rule, MappingRule::default());
    }

    #[test]
    fn test_layering_keeps_base_rules_and_overrides_per_column() {
        let base = Strategy::new("b").with_rule(
            "t",
            MappingRule::new()
                .column("a", ColumnSource::alias("x"))
                .column("b", ColumnSource::alias("y")),
        );
        let overlay = Strategy::new("o").with_rule(
            "t",
            MappingRule::new().column("b", ColumnSource::Computed(Procedure::Null)),
        );

        let layered = Strategy::layered(base, overlay);
        let rule = layered.rule_for("t");
        assert_eq!(layered.name(), "o");
        assert_eq!(rule.columns.get("a"), Some(&ColumnSource::alias("x")));
        assert_eq!(
            rule.columns.get("b"),
            Some(&ColumnSource::Computed(Procedure::Null))
        );
    }

    #[test]
    fn test_no_version_keeps_tree_id_from_base() {
        let strategy = Strategy::no_version();
        let node = strategy.rule_for(tables::CONTENT_NODE);
        assert_eq!(
            node.columns.get(TREE_ID_COLUMN),
            Some(&ColumnSource::Computed(Procedure::TreeId))
        );
        assert_eq!(
            node.columns.get("channel_id"),
            Some(&ColumnSource::Computed(Procedure::ChannelId))
        );
        assert!(strategy.rule_for(tables::LOCAL_FILE).row_source.is_some());
    }
}
