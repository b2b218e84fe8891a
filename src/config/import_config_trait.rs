// ==========================================
// 内容频道导入引擎 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含导入逻辑
// ==========================================

use crate::config::import_options::ImportOptions;
use crate::importer::error::ImportResult;
use std::path::PathBuf;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 获取 BatchWriter 刷新阈值
    ///
    /// # 默认值
    /// - 10000
    fn get_flush_threshold(&self) -> ImportResult<usize>;

    /// 获取频道快照目录
    ///
    /// # 默认值
    /// - <data_dir>/kolibri/content/databases
    fn get_content_database_dir(&self) -> ImportResult<PathBuf>;

    /// 汇总为 ImportOptions
    fn load_import_options(&self) -> ImportResult<ImportOptions> {
        Ok(ImportOptions {
            flush_threshold: self.get_flush_threshold()?,
            content_database_dir: self.get_content_database_dir()?,
        })
    }
}
