// ==========================================
// 本地快照导入流程集成测试
// ==========================================
// 测试目标: 版本比较（跳过/替换）、根节点补建、last_updated、快照缺失
// ==========================================


use channel_import::domain::tables;
use channel_import::{
    import_channel_from_local_db, ImportError, ImportOptions, ImportOutcome, RepositoryError,
};
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::*;

fn options(dir: &TempDir) -> ImportOptions {
    ImportOptions::default().with_content_database_dir(dir.path())
}

#[test]
fn test_fresh_import_stamps_last_updated() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    create_current_snapshot(dir.path(), "c1", 3, 2);

    let outcome = import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&dir)).unwrap();

    assert!(!outcome.is_skipped());
    let report = outcome.report().unwrap();
    assert_eq!(report.channel_id, "c1");
    assert_eq!(report.tree_id, 1);

    let root_present: i64 = query_scalar(
        &conn,
        "SELECT COUNT(*) FROM content_contentnode WHERE id = 'c1-root'",
    );
    assert_eq!(root_present, 1);
    let last_updated: Option<String> = query_scalar(
        &conn,
        "SELECT last_updated FROM content_channelmetadata WHERE id = 'c1'",
    );
    assert!(last_updated.is_some());
}

#[test]
fn test_same_version_is_skipped() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    create_current_snapshot(dir.path(), "c1", 3, 2);

    import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&dir)).unwrap();
    let before = dump_content_tables(&conn);

    let outcome = import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&dir)).unwrap();
    match outcome {
        ImportOutcome::Skipped {
            channel_id,
            existing_version,
            snapshot_version,
        } => {
            assert_eq!(channel_id, "c1");
            assert_eq!(existing_version, 3);
            assert_eq!(snapshot_version, 3);
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(dump_content_tables(&conn), before);
}

#[test]
fn test_older_snapshot_is_skipped() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let newer = TempDir::new().unwrap();
    let older = TempDir::new().unwrap();
    create_current_snapshot(newer.path(), "c1", 5, 2);
    create_current_snapshot(older.path(), "c1", 4, 3);

    import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&newer)).unwrap();
    let outcome = import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&older)).unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(count_rows(&conn, tables::CONTENT_NODE), 3);
}

#[test]
fn test_newer_version_replaces_old_content() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let old = TempDir::new().unwrap();
    let new = TempDir::new().unwrap();
    create_current_snapshot(old.path(), "c1", 1, 3);
    create_current_snapshot(new.path(), "c1", 2, 4);

    import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&old)).unwrap();
    assert_eq!(count_rows(&conn, tables::CONTENT_NODE), 4);

    let outcome = import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&new)).unwrap();
    let report = outcome.report().unwrap();

    // 旧树已删除，tree_id 重新从 1 分配
    assert_eq!(report.tree_id, 1);
    assert_eq!(count_rows(&conn, tables::CONTENT_NODE), 5);
    assert_eq!(count_rows(&conn, tables::FILE), 4);
    assert_eq!(count_rows(&conn, tables::CONTENT_NODE_TAGS), 4);
    assert_eq!(count_rows(&conn, tables::CHANNEL_METADATA), 1);
    let version: i64 = query_scalar(
        &conn,
        "SELECT version FROM content_channelmetadata WHERE id = 'c1'",
    );
    assert_eq!(version, 2);

    // 共享实体保留
    assert_eq!(count_rows(&conn, tables::CONTENT_TAG), 2);
}

#[test]
fn test_missing_root_node_is_created() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    let path = create_current_snapshot(dir.path(), "c1", 1, 2);
    open_snapshot(&path)
        .execute("DELETE FROM content_contentnode WHERE id = 'c1-root'", [])
        .unwrap();

    let outcome = import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&dir)).unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.rows_for(tables::CONTENT_NODE), 2);

    let (title, tree_id): (String, i64) = {
        let guard = conn.lock().unwrap();
        guard
            .query_row(
                "SELECT title, tree_id FROM content_contentnode WHERE id = 'c1-root'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap()
    };
    assert_eq!(title, "Channel c1");
    assert_eq!(tree_id, report.tree_id);
}

#[test]
fn test_legacy_snapshot_through_local_flow() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    create_legacy_snapshot(dir.path(), "old", 1, 3);

    let outcome = import_channel_from_local_db(Arc::clone(&conn), "old", &options(&dir)).unwrap();
    assert_eq!(outcome.report().unwrap().strategy, "no_version");
    assert_eq!(count_rows(&conn, tables::CONTENT_NODE), 4);
}

#[test]
fn test_missing_snapshot_file() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();

    let err = import_channel_from_local_db(conn, "nope", &options(&dir)).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Repository(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_future_version_fails_before_skip_check() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    let path = create_current_snapshot(dir.path(), "c1", 1, 1);

    import_channel_from_local_db(Arc::clone(&conn), "c1", &options(&dir)).unwrap();
    open_snapshot(&path)
        .execute(
            "UPDATE content_channelmetadata SET min_schema_version = '9'",
            [],
        )
        .unwrap();

    // 版本相同本应跳过，但版本分派先失败
    let err = import_channel_from_local_db(conn, "c1", &options(&dir)).unwrap_err();
    assert!(matches!(err, ImportError::FutureSchemaVersion { .. }));
}
