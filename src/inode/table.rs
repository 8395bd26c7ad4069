//! Inode 表读取
//!
//! 按位图扫描给出的已分配 inode 顺序逐个读取，同时记录哪些是目录、
//! 哪些带有间接块，供后续阶段使用。

use super::read::{read_inode, Inode};
use crate::{
    block::{BlockDev, BlockDevice},
    consts::EXT2_GOOD_OLD_INODE_SIZE,
    error::Result,
    fs::FilesystemContext,
};
use alloc::vec::Vec;

/// inode 表读取结果
#[derive(Debug, Clone, Default)]
pub struct InodeScan {
    inodes: Vec<Inode>,
    directories: Vec<usize>,
    indirect: Vec<usize>,
}

impl InodeScan {
    /// 全部已解码 inode（与输入顺序一致）
    pub fn inodes(&self) -> &[Inode] {
        &self.inodes
    }

    /// 目录 inode
    pub fn directories(&self) -> impl Iterator<Item = &Inode> + '_ {
        self.directories.iter().map(move |&i| &self.inodes[i])
    }

    /// 带有间接块指针的 inode，每个只出现一次
    pub fn indirect(&self) -> impl Iterator<Item = &Inode> + '_ {
        self.indirect.iter().map(move |&i| &self.inodes[i])
    }

    /// 目录数量
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// 带间接块的 inode 数量
    pub fn indirect_count(&self) -> usize {
        self.indirect.len()
    }
}

/// 读取所有已分配 inode
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `ctx` - 文件系统上下文
/// * `allocated` - 已分配 inode 号，通常来自 [`crate::bitmap::AllocationScan::allocated_inodes`]
pub fn read_inode_table<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    allocated: &[u32],
) -> Result<InodeScan> {
    let inode_size = ctx.superblock().inode_size() as usize;
    if inode_size > EXT2_GOOD_OLD_INODE_SIZE {
        log::warn!(
            "[INODE] inode size {} > {}, trailing bytes are ignored",
            inode_size,
            EXT2_GOOD_OLD_INODE_SIZE
        );
    }

    let mut scan = InodeScan::default();
    scan.inodes.try_reserve_exact(allocated.len())?;

    for &inode_num in allocated {
        let inode = read_inode(bdev, ctx, inode_num)?;
        if inode.mode() == 0 {
            log::warn!("[INODE] allocated inode {} has zero mode", inode_num);
        }

        let index = scan.inodes.len();
        if inode.is_dir() {
            scan.directories.try_reserve(1)?;
            scan.directories.push(index);
        }
        if inode.has_indirect() {
            scan.indirect.try_reserve(1)?;
            scan.indirect.push(index);
        }

        log::trace!(
            "[INODE] #{} type={} size={} blocks={}",
            inode_num,
            inode.inode_type().tag(),
            inode.file_size(),
            inode.blocks_count()
        );
        scan.inodes.push(inode);
    }

    log::debug!(
        "[INODE] read {} inodes, {} directories, {} with indirect blocks",
        scan.inodes.len(),
        scan.directories.len(),
        scan.indirect.len()
    );

    Ok(scan)
}
