//! 块组描述符读取和查询操作

use crate::{
    block::{BlockDev, BlockDevice, RecordReader},
    consts::*,
    error::{Error, Result},
    superblock::Superblock,
};
use alloc::vec::Vec;

/// 计算块组描述符的字节偏移
///
/// 描述符表从 `(first_data_block + 1) * block_size` 开始连续存放，
/// 每个描述符 32 字节
pub fn get_block_group_desc_offset(sb: &Superblock, group_num: u32) -> u64 {
    sb.group_desc_table_offset() + EXT2_GROUP_DESC_SIZE as u64 * group_num as u64
}

/// 读取块组描述符
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 引用
/// * `group_num` - 块组编号
pub fn read_block_group_desc<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    group_num: u32,
) -> Result<GroupDescriptor> {
    let desc_offset = get_block_group_desc_offset(sb, group_num);

    let mut desc_buf = [0u8; EXT2_GROUP_DESC_SIZE];
    bdev.read_bytes(desc_offset, &mut desc_buf)?;

    GroupDescriptor::parse(&desc_buf, group_num, sb.blocks_in_group_cnt(group_num))
}

/// 读取全部块组描述符
///
/// 块组数为 0 时返回 `Format` 错误；描述符表无法分配时返回 `Allocation` 错误。
/// 任何一个描述符读取失败，整张表都不会返回。
pub fn build_group_table<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
) -> Result<Vec<GroupDescriptor>> {
    let group_count = sb.block_group_count();
    if group_count == 0 {
        return Err(Error::format("Block group count is zero"));
    }

    let mut groups = Vec::new();
    groups.try_reserve_exact(group_count as usize)?;

    for group_num in 0..group_count {
        let desc = read_block_group_desc(bdev, sb, group_num)?;
        log::trace!(
            "[GROUP] #{} blocks={} block_bitmap={} inode_bitmap={} inode_table={}",
            group_num,
            desc.contained_blocks(),
            desc.block_bitmap(),
            desc.inode_bitmap(),
            desc.inode_table()
        );
        groups.push(desc);
    }

    log::debug!("[GROUP] loaded {} block group descriptors", groups.len());

    Ok(groups)
}

/// 块组描述符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    group_num: u32,
    block_bitmap: u32,
    inode_bitmap: u32,
    inode_table: u32,
    free_blocks_count: u16,
    free_inodes_count: u16,
    used_dirs_count: u16,
    contained_blocks: u32,
}

impl GroupDescriptor {
    /// 从 32 字节描述符记录解码
    ///
    /// `contained_blocks` 由 superblock 推导，不在磁盘上
    pub fn parse(buf: &[u8], group_num: u32, contained_blocks: u32) -> Result<Self> {
        let rec = RecordReader::new(buf);
        Ok(Self {
            group_num,
            block_bitmap: rec.u32(gd::BLOCK_BITMAP)?,
            inode_bitmap: rec.u32(gd::INODE_BITMAP)?,
            inode_table: rec.u32(gd::INODE_TABLE)?,
            free_blocks_count: rec.u16(gd::FREE_BLOCKS_COUNT)?,
            free_inodes_count: rec.u16(gd::FREE_INODES_COUNT)?,
            used_dirs_count: rec.u16(gd::USED_DIRS_COUNT)?,
            contained_blocks,
        })
    }

    /// 获取块组编号
    pub fn group_num(&self) -> u32 {
        self.group_num
    }

    /// 获取块位图块号
    pub fn block_bitmap(&self) -> u32 {
        self.block_bitmap
    }

    /// 获取 inode 位图块号
    pub fn inode_bitmap(&self) -> u32 {
        self.inode_bitmap
    }

    /// 获取 inode 表起始块号
    pub fn inode_table(&self) -> u32 {
        self.inode_table
    }

    /// 空闲块数
    pub fn free_blocks_count(&self) -> u16 {
        self.free_blocks_count
    }

    /// 空闲 inode 数
    pub fn free_inodes_count(&self) -> u16 {
        self.free_inodes_count
    }

    /// 目录数
    pub fn used_dirs_count(&self) -> u16 {
        self.used_dirs_count
    }

    /// 本组包含的块数
    pub fn contained_blocks(&self) -> u32 {
        self.contained_blocks
    }
}
