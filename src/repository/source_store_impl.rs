// ==========================================
// 内容频道导入引擎 - SQLite 快照源实现
// ==========================================

use crate::db::{open_sqlite_readonly, quote_ident};
use crate::domain::{EntityType, Row};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::source_store::SourceStore;
use crate::repository::table_reflection::{query_rows, reflect_entity_type};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteSourceStore
// ==========================================
pub struct SqliteSourceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSourceStore {
    /// 以只读方式打开快照文件
    ///
    /// # 参数
    /// - db_path: 快照库路径（必须已存在）
    pub fn open<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let path = db_path.as_ref();
        let conn = open_sqlite_readonly(path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// 从已有连接创建（测试中使用内存库）
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl SourceStore for SqliteSourceStore {
    fn get_entity_type(&self, name: &str) -> RepositoryResult<EntityType> {
        let conn = self.lock()?;
        reflect_entity_type(&conn, name)
    }

    fn fetch_rows(&self, entity: &str) -> RepositoryResult<Vec<Row>> {
        let conn = self.lock()?;
        // 先反射，缺表时给出 NotFound 而不是 SQL 错误
        reflect_entity_type(&conn, entity)?;

        let sql = format!("SELECT * FROM {}", quote_ident(entity));
        query_rows(&conn, &sql, Vec::<Value>::new())
    }

    fn fetch_row_by_key(
        &self,
        entity: &str,
        column: &str,
        key: &Value,
    ) -> RepositoryResult<Option<Row>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            quote_ident(entity),
            quote_ident(column)
        );
        let mut rows = query_rows(&conn, &sql, [key])?;
        Ok(rows.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteSourceStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE content_license (id INTEGER PRIMARY KEY, license_name TEXT);
             INSERT INTO content_license VALUES (1, 'CC BY'), (2, 'CC BY-SA');",
        )
        .unwrap();
        SqliteSourceStore::from_connection(conn)
    }

    #[test]
    fn test_fetch_rows_in_source_order() {
        let rows = store().fetch_rows("content_license").unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.get_text("license_name")).collect();
        assert_eq!(names, vec!["CC BY", "CC BY-SA"]);
    }

    #[test]
    fn test_fetch_row_by_key() {
        let store = store();
        let row = store
            .fetch_row_by_key("content_license", "id", &Value::Integer(2))
            .unwrap()
            .unwrap();
        assert_eq!(row.get_text("license_name"), Some("CC BY-SA"));

        let missing = store
            .fetch_row_by_key("content_license", "id", &Value::Integer(9))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_missing_entity() {
        let store = store();
        assert!(!store.has_entity_type("content_localfile").unwrap());
        assert!(matches!(
            store.fetch_rows("content_localfile"),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
