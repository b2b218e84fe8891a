// ==========================================
// 内容频道导入引擎 - SQLite 主库实现
// ==========================================
// 写入策略:
// - bulk_insert: 预编译语句逐行执行（同一事务内）
// - upsert: INSERT ... ON CONFLICT(pk) DO UPDATE
// - 行内缺失的列不出现在 INSERT 中，由列默认值补齐
// ==========================================

use crate::db::quote_ident;
use crate::domain::{EntityType, Row};
use crate::repository::destination_store::DestinationStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::table_reflection::reflect_entity_type;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteDestinationStore
// ==========================================
pub struct SqliteDestinationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDestinationStore {
    /// 从已有连接创建（与其他仓储共享同一连接）
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn execute_tx(&self, sql: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| RepositoryError::DatabaseTransactionError(format!("{}: {}", sql, e)))?;
        Ok(())
    }
}

/// INSERT 语句（列集合取自行本身）
fn insert_sql(entity: &EntityType, row: &Row) -> String {
    let table = quote_ident(entity.name());
    if row.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", table);
    }

    let columns: Vec<String> = row.columns().map(quote_ident).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// UPSERT 语句：冲突目标为主键列，更新行内其余列
fn upsert_sql(entity: &EntityType, row: &Row) -> RepositoryResult<String> {
    let pk = entity.primary_key_columns();
    if pk.is_empty() {
        return Err(RepositoryError::InternalError(format!(
            "实体 {} 没有主键，无法 upsert",
            entity.name()
        )));
    }

    let updates: Vec<String> = row
        .columns()
        .filter(|c| !pk.contains(c))
        .map(|c| format!("{0} = excluded.{0}", quote_ident(c)))
        .collect();

    let conflict_target: Vec<String> = pk.iter().map(|c| quote_ident(c)).collect();
    let action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    Ok(format!(
        "{} ON CONFLICT({}) {}",
        insert_sql(entity, row),
        conflict_target.join(", "),
        action
    ))
}

impl DestinationStore for SqliteDestinationStore {
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType> {
        let conn = self.lock()?;
        reflect_entity_type(&conn, name)
    }

    fn distinct_values(&self, entity: &str, column: &str) -> RepositoryResult<Vec<Value>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT DISTINCT {1} FROM {0} ORDER BY {1}",
            quote_ident(entity),
            quote_ident(column)
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn bulk_insert(&self, entity: &EntityType, rows: &[Row]) -> RepositoryResult<usize> {
        let conn = self.lock()?;

        let mut count = 0;
        for row in rows {
            let mut stmt = conn.prepare_cached(&insert_sql(entity, row))?;
            stmt.execute(params_from_iter(row.values()))?;
            count += 1;
        }

        Ok(count)
    }

    fn upsert(&self, entity: &EntityType, row: &Row) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&upsert_sql(entity, row)?)?;
        stmt.execute(params_from_iter(row.values()))?;
        Ok(())
    }

    fn flush(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.flush_prepared_statement_cache();
        Ok(())
    }

    fn begin(&self) -> RepositoryResult<()> {
        self.execute_tx("BEGIN TRANSACTION")
    }

    fn commit(&self) -> RepositoryResult<()> {
        self.execute_tx("COMMIT")
    }

    fn rollback(&self) -> RepositoryResult<()> {
        self.execute_tx("ROLLBACK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_content_schema;
    use crate::domain::tables;

    fn store() -> SqliteDestinationStore {
        let conn = Connection::open_in_memory().unwrap();
        init_content_schema(&conn).unwrap();
        SqliteDestinationStore::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn tag(id: &str, name: &str) -> Row {
        Row::from([
            ("id", Value::Text(id.to_string())),
            ("tag_name", Value::Text(name.to_string())),
        ])
    }

    fn count(store: &SqliteDestinationStore, table: &str) -> i64 {
        let conn = store.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_upsert_updates_existing_row() {
        let store = store();
        let entity = store.get_entity_type(tables::CONTENT_TAG).unwrap();

        store.upsert(&entity, &tag("t1", "old")).unwrap();
        store.upsert(&entity, &tag("t1", "new")).unwrap();

        assert_eq!(count(&store, tables::CONTENT_TAG), 1);
        let conn = store.lock().unwrap();
        let name: String = conn
            .query_row("SELECT tag_name FROM content_contenttag WHERE id='t1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "new");
    }

    #[test]
    fn test_bulk_insert_rejects_conflicting_identity() {
        let store = store();
        let entity = store.get_entity_type(tables::CONTENT_TAG).unwrap();

        assert_eq!(store.bulk_insert(&entity, &[tag("t1", "a")]).unwrap(), 1);
        let err = store.bulk_insert(&entity, &[tag("t1", "b")]).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_omitted_columns_take_defaults() {
        let store = store();
        let entity = store.get_entity_type(tables::LOCAL_FILE).unwrap();
        let row = Row::from([("id", Value::Text("abc".to_string()))]);
        store.bulk_insert(&entity, &[row]).unwrap();

        let conn = store.lock().unwrap();
        let (extension, available): (String, i64) = conn
            .query_row(
                "SELECT extension, available FROM content_localfile WHERE id='abc'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(extension, "");
        assert_eq!(available, 0);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let store = store();
        let entity = store.get_entity_type(tables::CONTENT_TAG).unwrap();

        store.begin().unwrap();
        store.bulk_insert(&entity, &[tag("t1", "a")]).unwrap();
        store.rollback().unwrap();

        assert_eq!(count(&store, tables::CONTENT_TAG), 0);
    }

    #[test]
    fn test_distinct_values_sorted() {
        let store = store();
        {
            let conn = store.lock().unwrap();
            conn.execute_batch(
                "INSERT INTO content_contentnode (id, title, content_id, channel_id, tree_id)
                 VALUES ('a', 'A', 'a', 'c', 3), ('b', 'B', 'b', 'c', 1), ('c', 'C', 'c', 'c', 3);",
            )
            .unwrap();
        }
        let values = store
            .distinct_values(tables::CONTENT_NODE, "tree_id")
            .unwrap();
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(3)]);
    }
}
