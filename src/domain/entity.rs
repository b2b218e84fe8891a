// ==========================================
// 内容频道导入引擎 - 实体类型与实体目录
// ==========================================
// 职责:
// - EntityType: 一张表及其有序列（由存储层反射得到）
// - EntityRegistration: 主库内容实体的静态登记（写入模式/是否层级实体）
// - CONTENT_ENTITIES: 导入时遍历的实体声明顺序（含多对多关联表）
// ==========================================

use crate::domain::types::WriteMode;
use serde::Serialize;

/// 层级实体上标记所属树的列
pub const TREE_ID_COLUMN: &str = "tree_id";

// ==========================================
// 表名
// ==========================================
pub mod tables {
    pub const CONTENT_TAG: &str = "content_contenttag";
    pub const CONTENT_NODE: &str = "content_contentnode";
    pub const CONTENT_NODE_HAS_PREREQUISITE: &str = "content_contentnode_has_prerequisite";
    pub const CONTENT_NODE_RELATED: &str = "content_contentnode_related";
    pub const CONTENT_NODE_TAGS: &str = "content_contentnode_tags";
    pub const LANGUAGE: &str = "content_language";
    pub const LOCAL_FILE: &str = "content_localfile";
    pub const FILE: &str = "content_file";
    pub const ASSESSMENT_METADATA: &str = "content_assessmentmetadata";
    pub const CHANNEL_METADATA: &str = "content_channelmetadata";

    /// 仅存在于早期快照中，主库没有对应表
    pub const LICENSE: &str = "content_license";
}

// ==========================================
// Column - 列定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    /// 声明类型（如 INTEGER / TEXT），可能为空
    pub decl_type: String,
    pub primary_key: bool,
    pub not_null: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.into(),
            primary_key: false,
            not_null: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

// ==========================================
// EntityType - 实体类型（一张表）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityType {
    name: String,
    columns: Vec<Column>,
}

impl EntityType {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// 主键列（按声明顺序）
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// 自增整数代理主键
    ///
    /// 仅当主键只有一列且声明为 INTEGER 时成立（SQLite rowid 别名），
    /// 这类列由主库分配，导入时不得写入
    pub fn surrogate_key(&self) -> Option<&Column> {
        let mut pks = self.columns.iter().filter(|c| c.primary_key);
        match (pks.next(), pks.next()) {
            (Some(pk), None) if pk.decl_type.eq_ignore_ascii_case("INTEGER") => Some(pk),
            _ => None,
        }
    }

    /// 导入时可写入的列（排除代理主键）
    pub fn writable_columns(&self) -> impl Iterator<Item = &Column> {
        let surrogate = self.surrogate_key().map(|c| c.name.clone());
        self.columns
            .iter()
            .filter(move |c| surrogate.as_deref() != Some(c.name.as_str()))
    }
}

// ==========================================
// EntityRegistration - 主库内容实体登记
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRegistration {
    pub name: &'static str,
    pub write_mode: WriteMode,
    /// 层级实体的每一行都要打上本次导入分配的 tree_id
    pub hierarchical: bool,
}

impl EntityRegistration {
    const fn bulk(name: &'static str) -> Self {
        Self {
            name,
            write_mode: WriteMode::BulkInsert,
            hierarchical: false,
        }
    }

    const fn merge(name: &'static str) -> Self {
        Self {
            name,
            write_mode: WriteMode::Merge,
            hierarchical: false,
        }
    }

    const fn hierarchical(name: &'static str) -> Self {
        Self {
            name,
            write_mode: WriteMode::BulkInsert,
            hierarchical: true,
        }
    }
}

/// 导入顺序即声明顺序
///
/// ContentTag / Language / LocalFile 可能被多个频道共享，必须 Merge
pub const CONTENT_ENTITIES: &[EntityRegistration] = &[
    EntityRegistration::merge(tables::CONTENT_TAG),
    EntityRegistration::hierarchical(tables::CONTENT_NODE),
    EntityRegistration::bulk(tables::CONTENT_NODE_HAS_PREREQUISITE),
    EntityRegistration::bulk(tables::CONTENT_NODE_RELATED),
    EntityRegistration::bulk(tables::CONTENT_NODE_TAGS),
    EntityRegistration::merge(tables::LANGUAGE),
    EntityRegistration::merge(tables::LOCAL_FILE),
    EntityRegistration::bulk(tables::FILE),
    EntityRegistration::bulk(tables::ASSESSMENT_METADATA),
    EntityRegistration::bulk(tables::CHANNEL_METADATA),
];

/// 按表名查找登记
pub fn registration(name: &str) -> Option<&'static EntityRegistration> {
    CONTENT_ENTITIES.iter().find(|r| r.name == name)
}
