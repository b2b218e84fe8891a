// ==========================================
// 内容频道导入引擎 - 频道导入器
// ==========================================
// 流程: 版本分派 → 开启事务 → 分配 tree_id → 按声明顺序逐实体映射写入 → 提交
// 原子性: 任一步失败即整体回滚，错误原样上抛
// 单次使用: import 消费导入器，缓存随之释放
// ==========================================

use crate::config::ImportOptions;
use crate::domain::{ImportReport, SnapshotMetadata, CONTENT_ENTITIES};
use crate::importer::batch_writer::{BatchWriter, WriteTarget};
use crate::importer::error::ImportResult;
use crate::importer::import_context::ImportContext;
use crate::importer::row_mapper::RowMapper;
use crate::importer::strategy::Strategy;
use crate::importer::table_mapper::TableMapper;
use crate::importer::tree_id::allocate_tree_id;
use crate::importer::version_resolver;
use crate::repository::{DestinationStore, SourceStore};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// ChannelImporter
// ==========================================
pub struct ChannelImporter<S, D>
where
    S: SourceStore,
    D: DestinationStore,
{
    // 快照源（只读）
    source: S,

    // 主库
    destination: D,

    options: ImportOptions,
}

/// 事务内阶段的产出
struct ImportedEntities {
    tree_id: i64,
    entity_counts: BTreeMap<String, usize>,
}

impl<S, D> ChannelImporter<S, D>
where
    S: SourceStore,
    D: DestinationStore,
{
    pub fn new(source: S, destination: D, options: ImportOptions) -> Self {
        Self {
            source,
            destination,
            options,
        }
    }

    /// 导入一个完整快照
    ///
    /// # 返回
    /// - Ok(ImportReport): 已提交
    /// - Err: 主库保持导入前状态
    #[instrument(skip(self, metadata), fields(channel_id = %metadata.id, import_id))]
    pub fn import(self, metadata: &SnapshotMetadata) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let import_id = Uuid::new_v4();
        tracing::Span::current().record("import_id", tracing::field::display(import_id));

        // 1. 版本分派（失败时尚未写入任何数据）
        let version = version_resolver::detect(metadata);
        let strategy = version_resolver::resolve(&version)?;
        info!(
            channel_id = %metadata.id,
            channel_version = metadata.version,
            schema_version = %version,
            strategy = strategy.name(),
            "开始导入频道"
        );

        // 2. 事务内导入
        self.destination.begin()?;
        let imported = match self.import_entities(&strategy, metadata) {
            Ok(imported) => imported,
            Err(e) => {
                error!(error = %e, "频道导入失败，回滚事务");
                self.rollback_quietly();
                return Err(e);
            }
        };

        // 3. 提交
        if let Err(e) = self.destination.commit() {
            error!(error = %e, "提交失败，回滚事务");
            self.rollback_quietly();
            return Err(e.into());
        }

        let report = ImportReport {
            import_id,
            channel_id: metadata.id.clone(),
            schema_version: version,
            strategy: strategy.name().to_string(),
            tree_id: imported.tree_id,
            entity_counts: imported.entity_counts,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            tree_id = report.tree_id,
            total_rows = report.total_rows(),
            elapsed_ms = report.elapsed_ms,
            "频道导入完成"
        );
        Ok(report)
    }

    fn import_entities(
        &self,
        strategy: &Strategy,
        metadata: &SnapshotMetadata,
    ) -> ImportResult<ImportedEntities> {
        let tree_id = allocate_tree_id(&self.destination)?;
        info!(tree_id = tree_id, "分配 tree_id");

        let mut ctx = ImportContext::new(&self.source, &metadata.id, tree_id);
        let mut writer = BatchWriter::new(&self.destination, self.options.flush_threshold);
        let mut entity_counts = BTreeMap::new();

        for registration in CONTENT_ENTITIES {
            info!(entity = registration.name, "导入 {} 数据", registration.name);

            let rule = strategy.rule_for(registration.name);
            let destination_entity = self.destination.get_entity_type(registration.name)?;
            let table_mapper = TableMapper::new(registration.name, rule);
            let source_entity = table_mapper.source_entity(&self.source)?;
            let row_mapper = RowMapper::bind(&destination_entity, rule, source_entity.as_ref())?;
            let target = WriteTarget::new(destination_entity, registration.write_mode);

            for row in table_mapper.rows(&self.source)? {
                let mapped = row_mapper.map_row(&row, &mut ctx)?;
                writer.append(&target, mapped)?;
            }

            let written = writer.finish(&target)?;
            info!(
                entity = registration.name,
                mode = %registration.write_mode,
                rows = written,
                "实体导入完成"
            );
            entity_counts.insert(registration.name.to_string(), written);
        }

        Ok(ImportedEntities {
            tree_id,
            entity_counts,
        })
    }

    /// 回滚失败只记日志，上抛的仍是最初的错误
    fn rollback_quietly(&self) {
        if let Err(e) = self.destination.rollback() {
            error!(error = %e, "事务回滚失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_content_schema;
    use crate::domain::types::{NO_VERSION, VERSION_2};
    use crate::domain::SchemaVersion;
    use crate::importer::error::ImportError;
    use crate::repository::{SqliteDestinationStore, SqliteSourceStore};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn metadata(min_schema_version: &str) -> SnapshotMetadata {
        SnapshotMetadata {
            id: "c1".to_string(),
            name: "Channel".to_string(),
            version: 1,
            min_schema_version: Some(SchemaVersion::new(min_schema_version)),
            inferred_schema_version: SchemaVersion::new(VERSION_2),
            root_id: "root".to_string(),
        }
    }

    fn current_source() -> SqliteSourceStore {
        let conn = Connection::open_in_memory().unwrap();
        init_content_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO content_contentnode (id, parent_id, title, content_id, channel_id, tree_id, kind)
                VALUES ('root', NULL, 'Root', 'root', 'c1', 1, 'topic'),
                       ('leaf', 'root', 'Leaf', 'leaf', 'c1', 1, 'video');
            INSERT INTO content_channelmetadata (id, name, version, min_schema_version, root_id)
                VALUES ('c1', 'Channel', 1, '2', 'root');
            "#,
        )
        .unwrap();
        SqliteSourceStore::from_connection(conn)
    }

    fn destination() -> (SqliteDestinationStore, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        init_content_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO content_contentnode (id, title, content_id, channel_id, tree_id)
             VALUES ('other', 'Other', 'other', 'c0', 1);",
        )
        .unwrap();
        let shared = Arc::new(Mutex::new(conn));
        (
            SqliteDestinationStore::from_connection(Arc::clone(&shared)).unwrap(),
            shared,
        )
    }

    #[test]
    fn test_import_stamps_allocated_tree_id() {
        let (dest, conn) = destination();
        let report = ChannelImporter::new(current_source(), dest, ImportOptions::default())
            .import(&metadata(VERSION_2))
            .unwrap();

        assert_eq!(report.tree_id, 2);
        assert_eq!(report.strategy, "current");
        assert_eq!(report.rows_for("content_contentnode"), 2);
        assert_eq!(report.rows_for("content_channelmetadata"), 1);

        let stamped: i64 = conn
            .lock()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM content_contentnode WHERE channel_id = 'c1' AND tree_id = 2",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(stamped, 2);
    }

    #[test]
    fn test_version_error_writes_nothing() {
        let (dest, conn) = destination();
        let err = ChannelImporter::new(current_source(), dest, ImportOptions::default())
            .import(&metadata("99"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FutureSchemaVersion { .. }));

        let nodes: i64 = conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM content_contentnode", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nodes, 1);
    }

    #[test]
    fn test_legacy_strategy_selected_for_unversioned_snapshot() {
        let (dest, _conn) = destination();
        // 当前结构的快照若声明为 unversioned，会按旧映射绑定并因缺少 checksum 列失败
        let err = ChannelImporter::new(current_source(), dest, ImportOptions::default())
            .import(&metadata(NO_VERSION))
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidMappingConfiguration { .. }
        ));
    }
}
