// ==========================================
// 内容频道导入引擎 - 单次导入上下文
// ==========================================
// 职责: 计算列求值 + 单次导入范围内的查询缓存
// 生命周期: 在 ChannelImporter::import 内创建，随导入结束丢弃
// ==========================================

use crate::domain::entity::tables;
use crate::domain::types::NO_VERSION;
use crate::domain::{Row, RowKey};
use crate::importer::error::ImportResult;
use crate::importer::strategy::Procedure;
use crate::repository::SourceStore;
use rusqlite::types::Value;
use std::collections::HashMap;
use tracing::debug;

const LICENSE_ID_COLUMN: &str = "license_id";

pub struct ImportContext<'a, S: SourceStore> {
    source: &'a S,
    channel_id: String,
    tree_id: i64,
    /// license_id → 许可证行（未找到记为 None，同样缓存）
    licenses: HashMap<RowKey, Option<Row>>,
}

impl<'a, S: SourceStore> ImportContext<'a, S> {
    pub fn new(source: &'a S, channel_id: &str, tree_id: i64) -> Self {
        Self {
            source,
            channel_id: channel_id.to_string(),
            tree_id,
            licenses: HashMap::new(),
        }
    }

    /// 对一行源数据求计算列的值
    pub fn compute(&mut self, procedure: Procedure, row: &Row) -> ImportResult<Value> {
        match procedure {
            Procedure::TreeId => Ok(Value::Integer(self.tree_id)),
            Procedure::Null => Ok(Value::Null),
            Procedure::ChannelId => Ok(Value::Text(self.channel_id.clone())),
            Procedure::NoVersionMarker => Ok(Value::Text(NO_VERSION.to_string())),
            Procedure::LicenseName => self.license_field(row, "license_name"),
            Procedure::LicenseDescription => self.license_field(row, "license_description"),
        }
    }

    fn license_field(&mut self, row: &Row, field: &str) -> ImportResult<Value> {
        let license = self.license(row)?;
        Ok(license
            .and_then(|l| l.get(field).cloned())
            .unwrap_or(Value::Null))
    }

    /// 按 license_id 查许可证（同一 id 只查一次）
    fn license(&mut self, row: &Row) -> ImportResult<Option<&Row>> {
        let license_id = match row.get(LICENSE_ID_COLUMN) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Integer(0)) => return Ok(None),
            Some(Value::Text(s)) if s.is_empty() => return Ok(None),
            Some(value) => value,
        };

        let key = RowKey::from(license_id);
        if !self.licenses.contains_key(&key) {
            debug!(license_id = ?license_id, "查询许可证");
            let license = self
                .source
                .fetch_row_by_key(tables::LICENSE, "id", license_id)?;
            self.licenses.insert(key.clone(), license);
        }

        Ok(self.licenses.get(&key).and_then(Option::as_ref))
    }

    /// 已缓存的许可证数量
    pub fn cached_licenses(&self) -> usize {
        self.licenses.len()
    }
}
