// ==========================================
// 内容频道导入引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 源快照库一律只读打开，主库读写打开
// - 提供当前 schema 的内容表建表语句（测试与 CLI 共用）
// ==========================================

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - busy_timeout 需要“每个连接”单独配置
/// - 内容表之间不声明外键，这里不开启 foreign_keys
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接（读写）并应用统一配置
pub fn open_sqlite_connection<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 以只读方式打开快照库
///
/// 快照文件不存在时返回错误，不会创建空库
pub fn open_sqlite_readonly<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 判断表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
            [table],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    Ok(found)
}

/// 标识符加引号（表名/列名来自 schema 反射，仍统一转义）
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// 当前 schema（版本 2）的内容表
pub const CONTENT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS content_contenttag (
    id TEXT PRIMARY KEY,
    tag_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS content_contentnode (
    id TEXT PRIMARY KEY,
    parent_id TEXT,
    license_name TEXT,
    license_description TEXT,
    title TEXT NOT NULL,
    content_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    description TEXT,
    sort_order REAL,
    license_owner TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL DEFAULT 'topic',
    available INTEGER NOT NULL DEFAULT 0,
    stemmed_metaphone TEXT NOT NULL DEFAULT '',
    lang_id TEXT,
    coach_content INTEGER NOT NULL DEFAULT 0,
    lft INTEGER NOT NULL DEFAULT 0,
    rght INTEGER NOT NULL DEFAULT 0,
    tree_id INTEGER NOT NULL,
    level INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS content_contentnode_tree_id
    ON content_contentnode (tree_id);

CREATE TABLE IF NOT EXISTS content_contentnode_has_prerequisite (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_contentnode_id TEXT NOT NULL,
    to_contentnode_id TEXT NOT NULL,
    UNIQUE (from_contentnode_id, to_contentnode_id)
);

CREATE TABLE IF NOT EXISTS content_contentnode_related (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_contentnode_id TEXT NOT NULL,
    to_contentnode_id TEXT NOT NULL,
    UNIQUE (from_contentnode_id, to_contentnode_id)
);

CREATE TABLE IF NOT EXISTS content_contentnode_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contentnode_id TEXT NOT NULL,
    contenttag_id TEXT NOT NULL,
    UNIQUE (contentnode_id, contenttag_id)
);

CREATE TABLE IF NOT EXISTS content_language (
    id TEXT PRIMARY KEY,
    lang_code TEXT NOT NULL,
    lang_subcode TEXT,
    lang_name TEXT,
    lang_direction TEXT NOT NULL DEFAULT 'ltr'
);

CREATE TABLE IF NOT EXISTS content_localfile (
    id TEXT PRIMARY KEY,
    extension TEXT NOT NULL DEFAULT '',
    available INTEGER NOT NULL DEFAULT 0,
    file_size INTEGER
);

CREATE TABLE IF NOT EXISTS content_file (
    id TEXT PRIMARY KEY,
    local_file_id TEXT NOT NULL,
    available INTEGER NOT NULL DEFAULT 0,
    contentnode_id TEXT NOT NULL,
    preset TEXT NOT NULL DEFAULT '',
    lang_id TEXT,
    supplementary INTEGER NOT NULL DEFAULT 0,
    thumbnail INTEGER NOT NULL DEFAULT 0,
    priority INTEGER
);

CREATE TABLE IF NOT EXISTS content_assessmentmetadata (
    id TEXT PRIMARY KEY,
    assessment_item_ids TEXT NOT NULL DEFAULT '[]',
    number_of_assessments INTEGER NOT NULL DEFAULT 0,
    mastery_model TEXT NOT NULL DEFAULT '{}',
    randomize INTEGER NOT NULL DEFAULT 0,
    is_manipulable INTEGER NOT NULL DEFAULT 0,
    contentnode_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS content_channelmetadata (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 0,
    thumbnail TEXT NOT NULL DEFAULT '',
    last_updated TEXT,
    min_schema_version TEXT NOT NULL DEFAULT '',
    root_id TEXT NOT NULL
);
"#;

/// 在主库上创建当前 schema 的内容表（幂等）
pub fn init_content_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CONTENT_SCHEMA_SQL)
}
