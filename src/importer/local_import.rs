// ==========================================
// 内容频道导入引擎 - 本地快照导入流程
// ==========================================
// 流程:
// 1. 定位 <content_database_dir>/<channel_id>.sqlite3
// 2. 读取元数据并完成版本分派
// 3. 主库已有相同或更新版本 → 跳过；已有旧版本 → 先删除旧内容树
// 4. 运行导入引擎
// 5. 收尾（单一事务）: 补齐根节点、记录 last_updated
// 可用性标记的重算不在此处
// ==========================================

use crate::config::ImportOptions;
use crate::domain::ImportOutcome;
use crate::importer::channel_importer::ChannelImporter;
use crate::importer::error::ImportResult;
use crate::importer::metadata::read_snapshot_metadata;
use crate::importer::version_resolver;
use crate::repository::{
    ChannelRepository, RepositoryError, SqliteDestinationStore, SqliteSourceStore,
};
use chrono::Local;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// 快照文件路径
pub fn content_database_path(dir: &Path, channel_id: &str) -> PathBuf {
    dir.join(format!("{}.sqlite3", channel_id))
}

/// 从本地快照目录导入频道
///
/// # 参数
/// - conn: 主库连接（与其他仓储共享）
/// - channel_id: 频道 ID
/// - options: 导入选项（快照目录、刷新阈值）
#[instrument(skip(conn, options), fields(content_database_dir = %options.content_database_dir.display()))]
pub fn import_channel_from_local_db(
    conn: Arc<Mutex<Connection>>,
    channel_id: &str,
    options: &ImportOptions,
) -> ImportResult<ImportOutcome> {
    // 1. 定位快照
    let path = content_database_path(&options.content_database_dir, channel_id);
    if !path.is_file() {
        return Err(RepositoryError::NotFound {
            entity: "ContentDatabase".to_string(),
            id: path.display().to_string(),
        }
        .into());
    }

    // 2. 元数据与版本分派
    let source = SqliteSourceStore::open(&path)?;
    let metadata = read_snapshot_metadata(&source)?;
    version_resolver::resolve_kind(&version_resolver::detect(&metadata))?;

    // 3. 与已导入版本比较
    let channels = ChannelRepository::from_connection(Arc::clone(&conn));
    if let Some(existing_version) = channels.get_channel_version(&metadata.id)? {
        if existing_version >= metadata.version {
            warn!(
                channel_id = %metadata.id,
                existing_version = existing_version,
                snapshot_version = metadata.version,
                "主库已有相同或更新版本的频道，取消导入"
            );
            return Ok(ImportOutcome::Skipped {
                channel_id: metadata.id,
                existing_version,
                snapshot_version: metadata.version,
            });
        }

        info!(
            channel_id = %metadata.id,
            existing_version = existing_version,
            snapshot_version = metadata.version,
            "主库已有旧版本频道，先删除旧内容"
        );
        let removed = channels.delete_channel(&metadata.id)?;
        info!(removed_nodes = removed, "旧版本内容已删除");
    }

    // 4. 导入
    let destination = SqliteDestinationStore::from_connection(Arc::clone(&conn))?;
    let report = ChannelImporter::new(source, destination, options.clone()).import(&metadata)?;

    // 5. 收尾
    let created_root = channels.finalize_import(&metadata, report.tree_id, Local::now().naive_local())?;
    if created_root {
        info!(root_id = %metadata.root_id, "快照缺少根节点，已补建");
    }

    Ok(ImportOutcome::Imported(report))
}
