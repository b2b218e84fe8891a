// ==========================================
// 内容频道导入引擎 - 行数据
// ==========================================
// 职责: 列名 → 值 的松散类型行（源端读出，主库写入）
// ==========================================

use rusqlite::types::Value;
use std::collections::BTreeMap;

// ==========================================
// Row - 一行数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(column.into(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 列名（按字典序）
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 值（与 columns() 同序）
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 取某列作为可哈希键；缺列视为 NULL
    pub fn key(&self, column: &str) -> RowKey {
        self.get(column).map(RowKey::from).unwrap_or(RowKey::Null)
    }

    /// 读取文本列（NULL/缺列/非文本返回 None）
    pub fn get_text(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 读取整数列（NULL/缺列/非整数返回 None）
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Row {
    fn from(pairs: [(&str, Value); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

// ==========================================
// RowKey - 可哈希的列值
// ==========================================
// rusqlite::types::Value 含浮点，不实现 Hash；去重与缓存统一走 RowKey
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Null,
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&Value> for RowKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RowKey::Null,
            Value::Integer(i) => RowKey::Integer(*i),
            Value::Real(f) => RowKey::Real(f.to_bits()),
            Value::Text(s) => RowKey::Text(s.clone()),
            Value::Blob(b) => RowKey::Blob(b.clone()),
        }
    }
}
