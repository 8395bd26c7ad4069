//! 解析配置与汇总信息

use crate::cache::{CacheStats, DEFAULT_CACHE_SIZE};

/// 解析配置
#[derive(Debug, Clone, Copy)]
pub struct DumpConfig {
    /// 块缓存大小（块数），0 表示不使用缓存
    pub cache_blocks: usize,
    /// 文件系统在设备上的起始字节偏移（必须按扇区对齐）
    pub partition_offset: u64,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            cache_blocks: DEFAULT_CACHE_SIZE,
            partition_offset: 0,
        }
    }
}

impl DumpConfig {
    /// 设置块缓存大小
    pub fn with_cache_blocks(mut self, cache_blocks: usize) -> Self {
        self.cache_blocks = cache_blocks;
        self
    }

    /// 设置分区偏移
    pub fn with_partition_offset(mut self, offset: u64) -> Self {
        self.partition_offset = offset;
        self
    }
}

/// 一次完整解析的汇总
#[derive(Debug, Clone, Default)]
pub struct DumpSummary {
    /// 块组数
    pub groups: u32,
    /// 空闲块记录数
    pub free_blocks: u64,
    /// 空闲 inode 记录数
    pub free_inodes: u64,
    /// 输出的 inode 记录数
    pub inodes: u64,
    /// 间接块引用记录数
    pub indirect_entries: u64,
    /// 目录项记录数
    pub dir_entries: u64,
    /// 实际落到设备上的块读取次数
    pub physical_reads: u64,
    /// 块缓存统计（未启用缓存时为 None）
    pub cache: Option<CacheStats>,
}
