//! ext2 元数据解析驱动
//!
//! 解析按固定顺序进行：superblock → 块组描述符 → 位图 → inode 表 →
//! 间接块 → 目录项。每个阶段先完整地收集结果，成功后才把记录交给
//! [`RecordSink`]；某个阶段失败时，之前阶段已输出的记录保留，
//! 失败阶段不输出任何记录。

use super::{
    context::FilesystemContext,
    types::{DumpConfig, DumpSummary},
};
use crate::{
    bitmap::{scan_bitmaps, AllocationScan},
    block::{BlockDev, BlockDevice},
    block_group::build_group_table,
    dir::{walk_directories, DirEntryRecord},
    error::Result,
    indirect::{walk_indirect_blocks, IndirectEntry},
    inode::{read_inode_table, InodeScan},
    report::RecordSink,
    superblock::read_superblock,
};
use alloc::vec::Vec;

/// ext2 镜像解析器
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_dump::{CsvSink, DumpConfig, Ext2Dump, FileDevice};
///
/// let device = FileDevice::open("disk.img")?;
/// let mut dump = Ext2Dump::open(device, DumpConfig::default())?;
///
/// let mut sink = CsvSink::new(String::new());
/// let summary = dump.dump(&mut sink)?;
/// print!("{}", sink.into_inner());
/// ```
pub struct Ext2Dump<D: BlockDevice> {
    bdev: BlockDev<D>,
    ctx: FilesystemContext,
}

impl<D: BlockDevice> Ext2Dump<D> {
    /// 打开镜像
    ///
    /// 按配置建立块设备包装器（缓存、分区偏移），然后读取 superblock
    /// 与块组描述符表。
    ///
    /// # 错误
    ///
    /// - `ErrorKind::InvalidInput` - 分区偏移未按扇区对齐或超出设备
    /// - `ErrorKind::Format` - superblock 或描述符表无效
    /// - `ErrorKind::Read` - 设备读取失败
    pub fn open(device: D, config: DumpConfig) -> Result<Self> {
        let mut bdev = BlockDev::new_with_cache(device, config.cache_blocks)?;
        if config.partition_offset != 0 {
            bdev.set_partition_offset(config.partition_offset)?;
        }

        let ctx = FilesystemContext::load(&mut bdev)?;
        Ok(Self { bdev, ctx })
    }

    /// 获取文件系统上下文
    pub fn context(&self) -> &FilesystemContext {
        &self.ctx
    }

    /// 获取块设备引用
    pub fn block_device(&self) -> &BlockDev<D> {
        &self.bdev
    }

    /// 释放解析器，返回块设备
    pub fn into_block_device(self) -> BlockDev<D> {
        self.bdev
    }

    /// 扫描分配位图
    pub fn scan_bitmaps(&mut self) -> Result<AllocationScan> {
        scan_bitmaps(&mut self.bdev, &self.ctx)
    }

    /// 读取位图扫描得到的已分配 inode
    pub fn read_inodes(&mut self, scan: &AllocationScan) -> Result<InodeScan> {
        read_inode_table(&mut self.bdev, &self.ctx, scan.allocated_inodes())
    }

    /// 遍历间接块
    pub fn walk_indirect(&mut self, inodes: &InodeScan) -> Result<Vec<IndirectEntry>> {
        walk_indirect_blocks(&mut self.bdev, &self.ctx, inodes)
    }

    /// 遍历目录
    pub fn walk_directories(&mut self, inodes: &InodeScan) -> Result<Vec<DirEntryRecord>> {
        walk_directories(&mut self.bdev, &self.ctx, inodes)
    }

    /// 运行全部阶段并输出记录
    pub fn dump<S: RecordSink>(&mut self, sink: &mut S) -> Result<DumpSummary> {
        sink.superblock(self.ctx.superblock())?;
        for desc in self.ctx.groups() {
            sink.group(desc)?;
        }
        run_stages(&mut self.bdev, &self.ctx, sink)
    }
}

/// 在已建立的块设备上运行全部阶段
///
/// 与 [`Ext2Dump::dump`] 不同，superblock 在读取块组描述符表之前
/// 就已输出，因此描述符表损坏时仍能得到 superblock 记录。
pub fn dump<D: BlockDevice, S: RecordSink>(
    bdev: &mut BlockDev<D>,
    sink: &mut S,
) -> Result<DumpSummary> {
    let sb = read_superblock(bdev)?;
    sink.superblock(&sb)?;

    let groups = build_group_table(bdev, &sb)?;
    for desc in &groups {
        sink.group(desc)?;
    }

    let ctx = FilesystemContext::new(sb, groups)?;
    run_stages(bdev, &ctx, sink)
}

fn run_stages<D: BlockDevice, S: RecordSink>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    sink: &mut S,
) -> Result<DumpSummary> {
    let mut summary = DumpSummary {
        groups: ctx.group_count(),
        ..DumpSummary::default()
    };

    let scan = scan_bitmaps(bdev, ctx)?;
    for entry in scan.entries() {
        sink.bitmap_entry(entry)?;
    }
    summary.free_blocks = scan.free_block_count();
    summary.free_inodes = scan.free_inode_count();

    let inodes = read_inode_table(bdev, ctx, scan.allocated_inodes())?;
    for inode in inodes.inodes() {
        sink.inode(inode)?;
    }
    summary.inodes = inodes.inodes().len() as u64;

    let indirect = walk_indirect_blocks(bdev, ctx, &inodes)?;
    for entry in &indirect {
        sink.indirect_entry(entry)?;
    }
    summary.indirect_entries = indirect.len() as u64;

    let entries = walk_directories(bdev, ctx, &inodes)?;
    for entry in &entries {
        sink.dir_entry(entry)?;
    }
    summary.dir_entries = entries.len() as u64;

    summary.physical_reads = bdev.physical_read_count();
    summary.cache = bdev.cache_stats();
    if let Some(stats) = &summary.cache {
        log::debug!(
            "[CACHE] accesses={} hits={} misses={} evictions={}",
            stats.total_accesses,
            stats.hits,
            stats.misses,
            stats.evictions
        );
    }
    log::debug!(
        "[DUMP] groups={} inodes={} indirect={} dir_entries={} physical_reads={}",
        summary.groups,
        summary.inodes,
        summary.indirect_entries,
        summary.dir_entries,
        summary.physical_reads
    );

    Ok(summary)
}
