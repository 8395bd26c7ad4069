//! 间接块遍历
//!
//! 从 inode 的一级、二级、三级间接块出发，深度优先列出每个非零指针：
//! 先输出当前槽位，再进入该指针指向的下一级块。

use crate::{
    block::{BlockDev, BlockDevice},
    consts::EXT2_MAX_INDIRECT_LEVEL,
    error::{Error, Result},
    fs::FilesystemContext,
    inode::{Inode, InodeScan},
    superblock::Superblock,
};
use alloc::vec;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

/// 间接块中的一个非零指针
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndirectEntry {
    /// 所属 inode
    pub inode: u32,
    /// 所在间接块的层级（1..=3）
    pub level: u32,
    /// 所在间接块的块号
    pub containing_block: u32,
    /// 槽位索引
    pub slot: u32,
    /// 指针值
    pub pointer: u32,
}

/// 间接块遍历器
pub struct IndirectWalker {
    /// 块大小（字节）
    block_size: u32,
    /// 文件系统总块数，指针必须小于它
    blocks_count: u32,
}

impl IndirectWalker {
    /// 创建新的遍历器
    pub fn new(sb: &Superblock) -> Self {
        Self {
            block_size: sb.block_size(),
            blocks_count: sb.blocks_count(),
        }
    }

    /// 每个间接块可以容纳的指针数量 (block_size / 4)
    pub fn pointers_per_block(&self) -> u32 {
        self.block_size / 4
    }

    /// 遍历以 `block` 为根、层级为 `level` 的间接块
    ///
    /// # 参数
    ///
    /// - `bdev`: 块设备
    /// - `inode_num`: 所属 inode
    /// - `block`: 间接块块号
    /// - `level`: 1 = 一级间接（槽位指向数据块），2、3 依次类推
    /// - `out`: 输出列表，按深度优先顺序追加
    pub fn walk<D: BlockDevice>(
        &self,
        bdev: &mut BlockDev<D>,
        inode_num: u32,
        block: u32,
        level: u32,
        out: &mut Vec<IndirectEntry>,
    ) -> Result<()> {
        if level == 0 || level > EXT2_MAX_INDIRECT_LEVEL {
            return Err(Error::format("Indirect block level out of range"));
        }
        self.check_pointer(block)?;

        let mut buf = vec![0u8; self.block_size as usize];
        bdev.read_bytes(block as u64 * self.block_size as u64, &mut buf)?;

        for (slot, raw) in buf.chunks_exact(4).enumerate() {
            let pointer = LittleEndian::read_u32(raw);
            if pointer == 0 {
                continue;
            }

            out.try_reserve(1)?;
            out.push(IndirectEntry {
                inode: inode_num,
                level,
                containing_block: block,
                slot: slot as u32,
                pointer,
            });

            if level > 1 {
                self.walk(bdev, inode_num, pointer, level - 1, out)?;
            } else {
                self.check_pointer(pointer)?;
            }
        }

        Ok(())
    }

    /// 依次遍历 inode 的一级、二级、三级间接块（为零的跳过）
    pub fn walk_inode<D: BlockDevice>(
        &self,
        bdev: &mut BlockDev<D>,
        inode: &Inode,
        out: &mut Vec<IndirectEntry>,
    ) -> Result<()> {
        for level in 1..=EXT2_MAX_INDIRECT_LEVEL {
            match inode.indirect_block(level) {
                Some(0) | None => {}
                Some(root) => self.walk(bdev, inode.inode_num(), root, level, out)?,
            }
        }
        Ok(())
    }

    fn check_pointer(&self, block: u32) -> Result<()> {
        if block == 0 || block >= self.blocks_count {
            return Err(Error::format("Indirect block pointer out of range"));
        }
        Ok(())
    }
}

/// 遍历所有带间接块的 inode
///
/// 任一指针越界或读取失败时整个阶段失败，不返回部分结果
pub fn walk_indirect_blocks<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    inodes: &InodeScan,
) -> Result<Vec<IndirectEntry>> {
    let walker = IndirectWalker::new(ctx.superblock());
    let mut entries = Vec::new();

    for inode in inodes.indirect() {
        let before = entries.len();
        walker.walk_inode(bdev, inode, &mut entries)?;
        log::trace!(
            "[INDIRECT] inode {} -> {} pointers",
            inode.inode_num(),
            entries.len() - before
        );
    }

    log::debug!(
        "[INDIRECT] {} inodes, {} pointers ({} per block)",
        inodes.indirect_count(),
        entries.len(),
        walker.pointers_per_block()
    );

    Ok(entries)
}
