// ==========================================
// 内容频道导入引擎 - 频道仓储
// ==========================================
// 职责: 本地导入流程在主库上的前置检查与收尾
// - 查询已导入频道的版本
// - 删除旧版本频道的内容树
// - 补齐根节点、记录 last_updated
// 红线: 共享实体（LocalFile / ContentTag / Language）不随频道删除
// ==========================================

use crate::domain::SnapshotMetadata;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 按节点所属频道删除的从属表（节点列名）
const NODE_CHILD_TABLES: &[(&str, &str)] = &[
    ("content_file", "contentnode_id"),
    ("content_assessmentmetadata", "contentnode_id"),
    ("content_contentnode_tags", "contentnode_id"),
    ("content_contentnode_has_prerequisite", "from_contentnode_id"),
    ("content_contentnode_has_prerequisite", "to_contentnode_id"),
    ("content_contentnode_related", "from_contentnode_id"),
    ("content_contentnode_related", "to_contentnode_id"),
];

// ==========================================
// ChannelRepository
// ==========================================
pub struct ChannelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChannelRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 已导入频道的内容版本（未导入返回 None）
    pub fn get_channel_version(&self, channel_id: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let version = conn
            .query_row(
                "SELECT version FROM content_channelmetadata WHERE id = ?1",
                params![channel_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(version)
    }

    /// 删除频道内容树（独立事务）
    ///
    /// # 返回
    /// - Ok(usize): 删除的内容节点数
    pub fn delete_channel(&self, channel_id: &str) -> RepositoryResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for (table, column) in NODE_CHILD_TABLES {
            let sql = format!(
                "DELETE FROM {} WHERE {} IN (SELECT id FROM content_contentnode WHERE channel_id = ?1)",
                table, column
            );
            tx.execute(&sql, params![channel_id])?;
        }

        let nodes = tx.execute(
            "DELETE FROM content_contentnode WHERE channel_id = ?1",
            params![channel_id],
        )?;
        tx.execute(
            "DELETE FROM content_channelmetadata WHERE id = ?1",
            params![channel_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(nodes)
    }

    /// 导入收尾（单一事务）：补齐根节点并记录 last_updated
    ///
    /// # 返回
    /// - Ok(true): 根节点为新建
    pub fn finalize_import(
        &self,
        metadata: &SnapshotMetadata,
        tree_id: i64,
        last_updated: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let created = tx.execute(
            r#"
            INSERT INTO content_contentnode (id, title, content_id, channel_id, tree_id, kind)
            VALUES (?1, ?2, ?1, ?3, ?4, 'topic')
            ON CONFLICT(id) DO NOTHING
            "#,
            params![metadata.root_id, metadata.name, metadata.id, tree_id],
        )?;

        let stamped = tx.execute(
            "UPDATE content_channelmetadata SET last_updated = ?1 WHERE id = ?2",
            params![last_updated, metadata.id],
        )?;
        if stamped == 0 {
            return Err(RepositoryError::NotFound {
                entity: "content_channelmetadata".to_string(),
                id: metadata.id.clone(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(created > 0)
    }
}
