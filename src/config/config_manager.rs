// ==========================================
// 内容频道导入引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)，表或键缺失时取默认值
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_options::{default_content_database_dir, DEFAULT_FLUSH_THRESHOLD};
use crate::db::{open_sqlite_connection, table_exists};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// config_kv 表结构（配置写入前按需创建）
const CONFIG_KV_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
)
"#;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 主库文件路径
    pub fn new<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
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

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置表或配置键不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.lock()?;
        if !table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(CONFIG_KV_SQL, [])?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_flush_threshold(&self) -> ImportResult<usize> {
        let raw = match self.get_global_config_value(config_keys::FLUSH_THRESHOLD)? {
            Some(v) => v,
            None => return Ok(DEFAULT_FLUSH_THRESHOLD),
        };

        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            Ok(_) => Err(ImportError::ConfigValueError {
                key: config_keys::FLUSH_THRESHOLD.to_string(),
                value: raw,
                message: "刷新阈值必须大于 0".to_string(),
            }),
            Err(e) => Err(ImportError::ConfigValueError {
                key: config_keys::FLUSH_THRESHOLD.to_string(),
                value: raw,
                message: e.to_string(),
            }),
        }
    }

    fn get_content_database_dir(&self) -> ImportResult<PathBuf> {
        Ok(self
            .get_global_config_value(config_keys::CONTENT_DATABASE_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_content_database_dir))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 批量写入
    pub const FLUSH_THRESHOLD: &str = "import/flush_threshold";

    // 快照位置
    pub const CONTENT_DATABASE_DIR: &str = "import/content_database_dir";
}
