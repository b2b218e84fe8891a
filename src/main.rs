// ==========================================
// 内容频道导入引擎 - 命令行入口
// ==========================================
// 用法:
//   channel-import <db_path> <channel_id> [content_database_dir]
//
// 快照目录未指定时取 config_kv 中的 import/content_database_dir，再退回默认目录
// CHANNEL_IMPORT_LOG_FORMAT=json 时输出 JSON 日志
// ==========================================

use anyhow::{bail, Context};
use channel_import::config::{ConfigManager, ImportConfigReader};
use channel_import::db::{init_content_schema, open_sqlite_connection};
use channel_import::{import_channel_from_local_db, logging};
use std::sync::{Arc, Mutex};

const LOG_FORMAT_ENV: &str = "CHANNEL_IMPORT_LOG_FORMAT";

fn main() -> anyhow::Result<()> {
    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    let mut args = std::env::args().skip(1);
    let (db_path, channel_id) = match (args.next(), args.next()) {
        (Some(db_path), Some(channel_id)) => (db_path, channel_id.trim().to_string()),
        _ => bail!("用法: channel-import <db_path> <channel_id> [content_database_dir]"),
    };
    let content_database_dir = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    tracing::info!("{} v{}", channel_import::APP_NAME, channel_import::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开主库: {}", db_path))?;
    init_content_schema(&conn).context("初始化内容表失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(Arc::clone(&conn))?;
    let mut options = config.load_import_options().context("读取导入配置失败")?;
    if let Some(dir) = content_database_dir {
        options = options.with_content_database_dir(dir);
    }

    let outcome = import_channel_from_local_db(conn, &channel_id, &options)
        .with_context(|| format!("频道 {} 导入失败", channel_id))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
