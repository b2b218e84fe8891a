// ==========================================
// 内容频道导入引擎 - tree_id 分配
// ==========================================
// 每个快照内的树都以 tree_id = 1 导出，导入时须换成主库中未被占用的最小正整数
// 算法: 对升序去重的已用 id 做二分找洞
// ==========================================

use crate::domain::entity::{tables, TREE_ID_COLUMN};
use crate::importer::error::ImportResult;
use crate::repository::{DestinationStore, RepositoryError, RepositoryResult};
use rusqlite::types::Value;

/// 从主库读取已用 tree_id 并分配新 id
pub fn allocate_tree_id<D: DestinationStore>(destination: &D) -> ImportResult<i64> {
    let mut ids = Vec::new();
    for value in destination.distinct_values(tables::CONTENT_NODE, TREE_ID_COLUMN)? {
        if let Some(id) = tree_id_value(value)? {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    ids.dedup();

    Ok(find_unique_tree_id(&ids))
}

/// 已用 tree_id 转整数；文本数字照常计入，无法识别的取值直接报错
fn tree_id_value(value: Value) -> RepositoryResult<Option<i64>> {
    let parsed = match &value {
        Value::Null => return Ok(None),
        Value::Integer(i) => Some(*i),
        Value::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| {
        RepositoryError::InternalError(format!(
            "{} 中存在非整数 tree_id: {:?}",
            tables::CONTENT_NODE,
            value
        ))
    })
}

/// 升序去重序列中未出现的最小正整数
pub fn find_unique_tree_id(ids: &[i64]) -> i64 {
    // 非正数不参与
    let ids = &ids[ids.partition_point(|&id| id < 1)..];

    match ids {
        [] => 1,
        [only] => {
            if *only == 1 {
                2
            } else {
                1
            }
        }
        [first, ..] if *first > 1 => 1,
        _ => find_hole(ids, 0, ids.len() - 1),
    }
}

/// 在 ids[lower..=upper] 中找洞；区间无洞时返回 ids[upper] + 1
///
/// 区间 [a, b] 无洞 iff ids[b] - ids[a] == b - a
fn find_hole(ids: &[i64], lower: usize, upper: usize) -> i64 {
    let middle = (upper - lower) / 2 + 1;
    let mid = lower + middle;

    // 下半区
    if ids[mid] - ids[lower] != middle as i64 {
        if middle == 1 {
            return ids[lower] + 1;
        }
        return find_hole(ids, lower, mid - 1);
    }

    // 上半区
    if ids[upper] - ids[mid] != (upper - mid) as i64 {
        if upper - mid == 1 {
            return ids[mid] + 1;
        }
        return find_hole(ids, mid, upper);
    }

    ids[upper] + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::repository::SqliteDestinationStore;
    use proptest::prelude::*;
    use rusqlite::Connection;
    use std::collections::BTreeSet;

    #[test]
    fn test_known_cases() {
        assert_eq!(find_unique_tree_id(&[]), 1);
        assert_eq!(find_unique_tree_id(&[1]), 2);
        assert_eq!(find_unique_tree_id(&[2]), 1);
        assert_eq!(find_unique_tree_id(&[1, 2, 3]), 4);
        assert_eq!(find_unique_tree_id(&[1, 2, 4]), 3);
        assert_eq!(find_unique_tree_id(&[1, 3, 4]), 2);
        assert_eq!(find_unique_tree_id(&[1, 2, 3, 5, 6]), 4);
    }

    #[test]
    fn test_first_element_above_one() {
        assert_eq!(find_unique_tree_id(&[2, 3, 4]), 1);
        assert_eq!(find_unique_tree_id(&[5, 9]), 1);
    }

    #[test]
    fn test_non_positive_ids_are_ignored() {
        assert_eq!(find_unique_tree_id(&[-3, 0, 1, 2]), 3);
        assert_eq!(find_unique_tree_id(&[0]), 1);
    }

    /// tree_id 列不声明类型，文本原样保存
    fn untyped_destination(values: &str) -> SqliteDestinationStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE content_contentnode (id INTEGER PRIMARY KEY, tree_id);
             INSERT INTO content_contentnode (tree_id) VALUES {};",
            values
        ))
        .unwrap();
        SqliteDestinationStore::from_connection(std::sync::Arc::new(std::sync::Mutex::new(conn)))
            .unwrap()
    }

    #[test]
    fn test_text_tree_ids_count_as_used() {
        let dest = untyped_destination("(1), ('2'), (' 3 '), (5)");
        assert_eq!(allocate_tree_id(&dest).unwrap(), 4);
    }

    #[test]
    fn test_unrecognized_tree_id_is_error() {
        for values in ["(1), ('abc')", "(1), (2.5)"] {
            let err = allocate_tree_id(&untyped_destination(values)).unwrap_err();
            assert!(
                matches!(err, ImportError::Repository(RepositoryError::InternalError(_))),
                "{}",
                values
            );
        }
    }

    fn brute_force(ids: &BTreeSet<i64>) -> i64 {
        (1..).find(|n| !ids.contains(n)).unwrap()
    }

    proptest! {
        #[test]
        fn prop_returns_minimum_unused_positive(ids in prop::collection::btree_set(-5i64..200, 0..120)) {
            let sorted: Vec<i64> = ids.iter().copied().collect();
            prop_assert_eq!(find_unique_tree_id(&sorted), brute_force(&ids));
        }

        #[test]
        fn prop_dense_prefix_with_single_gap(len in 2usize..300, gap in 0usize..300) {
            let gap = (gap % len) as i64 + 1;
            let ids: Vec<i64> = (1..=len as i64 + 1).filter(|&i| i != gap).collect();
            prop_assert_eq!(find_unique_tree_id(&ids), gap);
        }
    }
}
