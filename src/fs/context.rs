//! 文件系统上下文
//!
//! superblock 与块组描述符表在解析开始时读取一次，之后不可变，
//! 以引用方式传给每个后续阶段。

use crate::{
    block::{BlockDev, BlockDevice},
    block_group::{build_group_table, GroupDescriptor},
    error::{Error, Result},
    superblock::{read_superblock, Superblock},
};
use alloc::vec::Vec;

/// 不可变的文件系统几何信息
#[derive(Debug, Clone)]
pub struct FilesystemContext {
    superblock: Superblock,
    groups: Vec<GroupDescriptor>,
}

impl FilesystemContext {
    /// 由已解析的 superblock 与描述符表组装
    pub fn new(superblock: Superblock, groups: Vec<GroupDescriptor>) -> Result<Self> {
        if groups.is_empty() {
            return Err(Error::format("Block group count is zero"));
        }
        Ok(Self { superblock, groups })
    }

    /// 从块设备读取 superblock 和块组描述符表
    pub fn load<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<Self> {
        let superblock = read_superblock(bdev)?;
        let groups = build_group_table(bdev, &superblock)?;
        Self::new(superblock, groups)
    }

    /// 获取 superblock
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// 获取全部块组描述符
    pub fn groups(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    /// 获取指定块组描述符
    pub fn group(&self, group_num: u32) -> Result<&GroupDescriptor> {
        self.groups
            .get(group_num as usize)
            .ok_or(Error::format("Block group index out of range"))
    }

    /// 块组数量
    pub fn group_count(&self) -> u32 {
        self.groups.len() as u32
    }

    /// 文件系统块大小
    pub fn block_size(&self) -> u32 {
        self.superblock.block_size()
    }

    /// 块号对应的字节偏移
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size() as u64
    }

    /// 块号是否落在文件系统范围内（非零且小于总块数）
    pub fn is_valid_block(&self, block: u32) -> bool {
        block != 0 && block < self.superblock.blocks_count()
    }
}
