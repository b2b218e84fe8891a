// ==========================================
// 内容频道导入引擎 - 批量写入器 (BatchWriter)
// ==========================================
// 写入规则:
// - Merge 实体: 逐行按主键 upsert，不进缓冲
// - 其余实体: 进缓冲，批量插入
// - 未刷新计数跨实体累计；达到阈值时插入当前实体的缓冲并 flush，计数归零
// - 实体行流结束时立即插入剩余缓冲
// 事务: 不负责；由 ChannelImporter 包住整个导入
// ==========================================

use crate::domain::{EntityType, Row, WriteMode};
use crate::importer::error::ImportResult;
use crate::repository::DestinationStore;
use tracing::debug;

/// 写入目标（实体类型 + 写入模式）
#[derive(Debug, Clone)]
pub struct WriteTarget {
    pub entity: EntityType,
    pub mode: WriteMode,
}

impl WriteTarget {
    pub fn new(entity: EntityType, mode: WriteMode) -> Self {
        Self { entity, mode }
    }

    pub fn name(&self) -> &str {
        self.entity.name()
    }
}

pub struct BatchWriter<'a, D: DestinationStore> {
    destination: &'a D,
    flush_threshold: usize,
    /// 上次 flush 以来追加的行数（跨实体）
    unflushed_rows: usize,
    /// 当前实体的待插入行
    pending: Vec<Row>,
    /// 当前实体已追加的行数
    appended: usize,
}

impl<'a, D: DestinationStore> BatchWriter<'a, D> {
    pub fn new(destination: &'a D, flush_threshold: usize) -> Self {
        Self {
            destination,
            flush_threshold: flush_threshold.max(1),
            unflushed_rows: 0,
            pending: Vec::new(),
            appended: 0,
        }
    }

    pub fn unflushed_rows(&self) -> usize {
        self.unflushed_rows
    }

    /// 追加一行
    pub fn append(&mut self, target: &WriteTarget, row: Row) -> ImportResult<()> {
        match target.mode {
            WriteMode::Merge => self.destination.upsert(&target.entity, &row)?,
            WriteMode::BulkInsert => self.pending.push(row),
        }
        self.appended += 1;
        self.unflushed_rows += 1;

        if self.unflushed_rows >= self.flush_threshold {
            let inserted = self.insert_pending(target)?;
            self.destination.flush()?;
            debug!(
                entity = target.name(),
                inserted = inserted,
                threshold = self.flush_threshold,
                "达到刷新阈值，已刷新"
            );
            self.unflushed_rows = 0;
        }
        Ok(())
    }

    /// 当前实体行流结束：插入剩余缓冲
    ///
    /// # 返回
    /// - Ok(usize): 该实体累计写入行数
    pub fn finish(&mut self, target: &WriteTarget) -> ImportResult<usize> {
        let inserted = self.insert_pending(target)?;
        if inserted > 0 {
            debug!(entity = target.name(), inserted = inserted, "写入实体剩余缓冲");
        }
        Ok(std::mem::take(&mut self.appended))
    }

    fn insert_pending(&mut self, target: &WriteTarget) -> ImportResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let rows = std::mem::take(&mut self.pending);
        Ok(self.destination.bulk_insert(&target.entity, &rows)?)
    }
}
