// ==========================================
// 内容频道导入引擎 - 快照元数据读取
// ==========================================
// 读取快照 content_channelmetadata 首行；早期快照的字段差异:
// - 无 min_schema_version 列
// - 根节点列名为 root_pk
// schema 版本推断: 有 content_localfile 表为 "1"，否则为 "unversioned"
// ==========================================

use crate::domain::entity::tables;
use crate::domain::types::{NO_VERSION, VERSION_1};
use crate::domain::{Row, SchemaVersion, SnapshotMetadata};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::SourceStore;
use rusqlite::types::Value;

/// 读取快照元数据
pub fn read_snapshot_metadata<S: SourceStore>(source: &S) -> ImportResult<SnapshotMetadata> {
    if !source.has_entity_type(tables::CHANNEL_METADATA)? {
        return Err(ImportError::MetadataMissing(format!(
            "快照中没有 {} 表",
            tables::CHANNEL_METADATA
        )));
    }

    let row = source
        .fetch_rows(tables::CHANNEL_METADATA)?
        .into_iter()
        .next()
        .ok_or_else(|| ImportError::MetadataMissing("频道元数据为空".to_string()))?;

    let id = required_text(&row, "id")?;
    let root_id = text(&row, "root_id")
        .or_else(|| text(&row, "root_pk"))
        .ok_or_else(|| ImportError::MetadataMissing("缺少根节点 ID (root_id/root_pk)".to_string()))?;

    Ok(SnapshotMetadata {
        name: text(&row, "name").unwrap_or_default(),
        version: row.get_i64("version").unwrap_or_default(),
        min_schema_version: text(&row, "min_schema_version").map(SchemaVersion::new),
        inferred_schema_version: infer_schema_version(source)?,
        id,
        root_id,
    })
}

/// 按快照表结构推断 schema 版本
pub fn infer_schema_version<S: SourceStore>(source: &S) -> ImportResult<SchemaVersion> {
    if source.has_entity_type(tables::LOCAL_FILE)? {
        Ok(SchemaVersion::new(VERSION_1))
    } else {
        Ok(SchemaVersion::new(NO_VERSION))
    }
}

/// 非空文本；整数按十进制转成文本
fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

fn required_text(row: &Row, column: &str) -> ImportResult<String> {
    text(row, column)
        .ok_or_else(|| ImportError::MetadataMissing(format!("频道元数据缺少 {}", column)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SqliteSourceStore;
    use rusqlite::Connection;

    fn source(sql: &str) -> SqliteSourceStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        SqliteSourceStore::from_connection(conn)
    }

    #[test]
    fn test_legacy_metadata_uses_root_pk_and_infers_unversioned() {
        let source = source(
            "CREATE TABLE content_channelmetadata (id TEXT, name TEXT, version INTEGER, root_pk TEXT);
             INSERT INTO content_channelmetadata VALUES ('c1', 'Old', 3, 'r1');",
        );
        let metadata = read_snapshot_metadata(&source).unwrap();

        assert_eq!(metadata.id, "c1");
        assert_eq!(metadata.version, 3);
        assert_eq!(metadata.root_id, "r1");
        assert_eq!(metadata.min_schema_version, None);
        assert_eq!(metadata.schema_version().as_str(), NO_VERSION);
    }

    #[test]
    fn test_declared_min_schema_version() {
        let source = source(
            "CREATE TABLE content_localfile (id TEXT PRIMARY KEY);
             CREATE TABLE content_channelmetadata (
                 id TEXT, name TEXT, version INTEGER, root_id TEXT, min_schema_version TEXT);
             INSERT INTO content_channelmetadata VALUES ('c1', 'New', 5, 'r1', '2');",
        );
        let metadata = read_snapshot_metadata(&source).unwrap();

        assert_eq!(metadata.inferred_schema_version.as_str(), VERSION_1);
        assert_eq!(metadata.schema_version().as_str(), "2");
    }

    #[test]
    fn test_missing_metadata_row() {
        let no_rows = source(
            "CREATE TABLE content_channelmetadata (id TEXT, name TEXT, version INTEGER, root_id TEXT);",
        );
        assert!(matches!(
            read_snapshot_metadata(&no_rows),
            Err(ImportError::MetadataMissing(_))
        ));

        let empty = source("");
        assert!(matches!(
            read_snapshot_metadata(&empty),
            Err(ImportError::MetadataMissing(_))
        ));
    }
}
