// ==========================================
// 内容频道导入引擎 - SQLite 表结构反射与行读取
// ==========================================
// 源端与主库共用：PRAGMA table_info → EntityType，SELECT → Row
// ==========================================

use crate::db::quote_ident;
use crate::domain::{Column, EntityType, Row};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// 反射一张表的列定义
///
/// 表不存在时 PRAGMA table_info 返回空集，视为 NotFound
pub fn reflect_entity_type(conn: &Connection, name: &str) -> RepositoryResult<EntityType> {
    let sql = format!("PRAGMA table_info({})", quote_ident(name));
    let mut stmt = conn.prepare(&sql)?;

    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let decl_type: Option<String> = row.get(2)?;
            let not_null: i64 = row.get(3)?;
            let pk: i64 = row.get(5)?;
            Ok(Column {
                name,
                decl_type: decl_type.unwrap_or_default(),
                primary_key: pk > 0,
                not_null: not_null != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepositoryError::entity_not_found(name));
    }

    Ok(EntityType::new(name, columns))
}

/// 执行查询并把每一行收集为 Row
pub fn query_rows<P>(conn: &Connection, sql: &str, params: P) -> RepositoryResult<Vec<Row>>
where
    P: IntoIterator,
    P::Item: rusqlite::ToSql,
{
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (idx, name) in names.iter().enumerate() {
            let value: Value = row.get(idx)?;
            record.insert(name.clone(), value);
        }
        out.push(record);
    }
    Ok(out)
}
