// ==========================================
// 内容频道导入引擎 - 领域类型定义
// ==========================================
// 职责: schema 版本标识、写入模式
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ==========================================
// Schema 版本常量
// ==========================================

/// 未声明版本的早期快照
pub const NO_VERSION: &str = "unversioned";

/// v0.2.0-beta1 导出的快照（结构同 NO_VERSION）
pub const V020BETA1: &str = "v0.2.0-beta1";

/// v0.4.0-beta3 导出的快照（结构同 NO_VERSION）
pub const V040BETA3: &str = "v0.4.0-beta3";

/// 第一个带编号的 schema 版本
pub const VERSION_1: &str = "1";

/// 第二个带编号的 schema 版本
pub const VERSION_2: &str = "2";

/// 当前主库所使用的 schema 版本
pub const CONTENT_SCHEMA_VERSION: &str = VERSION_2;

// ==========================================
// SchemaVersion - 快照结构版本
// ==========================================
// 不透明标识：既可能是整数（"1"），也可能是命名哨兵（"unversioned"）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// 当前主库的 schema 版本
    pub fn current() -> Self {
        Self::new(CONTENT_SCHEMA_VERSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 按整数解析（命名哨兵返回 None）
    pub fn as_number(&self) -> Option<i64> {
        self.0.trim().parse::<i64>().ok()
    }

    /// 与整数版本比较（非数字返回 None）
    ///
    /// 形如 `[+-]数字` 即为数字版本；超出 i64 范围时按符号定大小
    pub fn compare_number(&self, other: i64) -> Option<Ordering> {
        let raw = self.0.trim();
        let digits = raw.strip_prefix(|c| c == '+' || c == '-').unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        match raw.parse::<i64>() {
            Ok(n) => Some(n.cmp(&other)),
            Err(_) if raw.starts_with('-') => Some(Ordering::Less),
            Err(_) => Some(Ordering::Greater),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ==========================================
// 写入模式 (Write Mode)
// ==========================================
// Merge: 可能被多个频道共享的实体，逐行按主键 upsert
// BulkInsert: 其余实体，批量插入，不允许与已有主键冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteMode {
    BulkInsert,
    Merge,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::BulkInsert => write!(f, "BULK_INSERT"),
            WriteMode::Merge => write!(f, "MERGE"),
        }
    }
}
