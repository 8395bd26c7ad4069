//! Superblock 读取和验证

use crate::{
    block::{BlockDev, BlockDevice, RecordReader},
    consts::*,
    error::{Error, Result},
};
use alloc::vec;

/// 从块设备读取 superblock
///
/// # 参数
///
/// * `bdev` - 块设备引用
///
/// # 返回
///
/// 成功返回已验证的 superblock
pub fn read_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<Superblock> {
    let mut sb_buf = vec![0u8; EXT2_SUPERBLOCK_SIZE];

    // 读取 superblock（从偏移 1024 开始）
    bdev.read_bytes(EXT2_SUPERBLOCK_OFFSET, &mut sb_buf)?;

    let sb = Superblock::parse(&sb_buf)?;
    sb.check()?;

    log::debug!(
        "[SUPERBLOCK] inodes={} blocks={} block_size={} frag_size={} groups={}",
        sb.inodes_count(),
        sb.blocks_count(),
        sb.block_size(),
        sb.fragment_size(),
        sb.block_group_count()
    );
    log::debug!(
        "[SUPERBLOCK] rev={} first_ino={} free_blocks={} free_inodes={}",
        sb.rev_level(),
        sb.first_ino(),
        sb.free_blocks_count(),
        sb.free_inodes_count()
    );

    Ok(sb)
}

/// 解码后的 superblock
///
/// 解析一次后不可变，由 [`crate::fs::FilesystemContext`] 持有。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    magic: u16,
    inodes_count: u32,
    blocks_count: u32,
    free_blocks_count: u32,
    free_inodes_count: u32,
    first_data_block: u32,
    log_block_size: u32,
    log_frag_size: i32,
    blocks_per_group: u32,
    frags_per_group: u32,
    inodes_per_group: u32,
    rev_level: u32,
    first_ino: u32,
    inode_size: u16,
}

impl Superblock {
    /// 从 1024 字节的 superblock 缓冲区解码字段
    ///
    /// 只解码，不验证；验证见 [`Superblock::check`]
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let rec = RecordReader::new(buf);

        let rev_level = rec.u32(sb::REV_LEVEL)?;
        // 修订版本 0 的 inode 大小固定为 128
        let inode_size = if rev_level == EXT2_GOOD_OLD_REV {
            EXT2_GOOD_OLD_INODE_SIZE as u16
        } else {
            rec.u16(sb::INODE_SIZE)?
        };

        Ok(Self {
            magic: rec.u16(sb::MAGIC)?,
            inodes_count: rec.u32(sb::INODES_COUNT)?,
            blocks_count: rec.u32(sb::BLOCKS_COUNT)?,
            free_blocks_count: rec.u32(sb::FREE_BLOCKS_COUNT)?,
            free_inodes_count: rec.u32(sb::FREE_INODES_COUNT)?,
            first_data_block: rec.u32(sb::FIRST_DATA_BLOCK)?,
            log_block_size: rec.u32(sb::LOG_BLOCK_SIZE)?,
            log_frag_size: rec.i32(sb::LOG_FRAG_SIZE)?,
            blocks_per_group: rec.u32(sb::BLOCKS_PER_GROUP)?,
            frags_per_group: rec.u32(sb::FRAGS_PER_GROUP)?,
            inodes_per_group: rec.u32(sb::INODES_PER_GROUP)?,
            rev_level,
            first_ino: rec.u32(sb::FIRST_INO)?,
            inode_size,
        })
    }

    /// 完整的 superblock 验证
    ///
    /// 检查：
    /// - 魔数
    /// - 块大小与片段大小指数范围（移位保护）
    /// - blocks_per_group、inodes_per_group 非零（除数保护）
    /// - inode_size 不小于 128
    pub fn check(&self) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::format("Invalid ext2 superblock magic number"));
        }

        if self.log_block_size > EXT2_MAX_LOG_BLOCK_SIZE {
            return Err(Error::format("Superblock block size exponent out of range"));
        }

        if self.log_frag_size.unsigned_abs() > EXT2_MAX_LOG_FRAG_SIZE {
            return Err(Error::format("Superblock fragment size exponent out of range"));
        }

        if self.blocks_per_group == 0 {
            return Err(Error::format("Superblock blocks_per_group is zero"));
        }

        if self.inodes_per_group == 0 {
            return Err(Error::format("Superblock inodes_per_group is zero"));
        }

        if (self.inode_size as usize) < EXT2_GOOD_OLD_INODE_SIZE {
            return Err(Error::format("Superblock inode_size is less than 128"));
        }

        Ok(())
    }

    /// 验证魔数
    pub fn is_valid(&self) -> bool {
        self.magic == EXT2_SUPERBLOCK_MAGIC
    }

    /// 魔数
    pub fn magic(&self) -> u16 {
        self.magic
    }

    /// 获取块大小（1024 << log_block_size）
    pub fn block_size(&self) -> u32 {
        EXT2_MIN_BLOCK_SIZE.checked_shl(self.log_block_size).unwrap_or(0)
    }

    /// 获取片段大小
    ///
    /// 指数为正时左移，非正时按绝对值右移
    pub fn fragment_size(&self) -> u32 {
        let shift = self.log_frag_size.unsigned_abs();
        if self.log_frag_size > 0 {
            EXT2_MIN_BLOCK_SIZE.checked_shl(shift).unwrap_or(0)
        } else {
            EXT2_MIN_BLOCK_SIZE.checked_shr(shift).unwrap_or(0)
        }
    }

    /// 每个 inode 的字节数
    pub fn inode_size(&self) -> u16 {
        self.inode_size
    }

    /// 获取总块数
    pub fn blocks_count(&self) -> u32 {
        self.blocks_count
    }

    /// 获取空闲块数
    pub fn free_blocks_count(&self) -> u32 {
        self.free_blocks_count
    }

    /// 获取总 inode 数
    pub fn inodes_count(&self) -> u32 {
        self.inodes_count
    }

    /// 获取空闲 inode 数
    pub fn free_inodes_count(&self) -> u32 {
        self.free_inodes_count
    }

    /// 获取每组块数
    pub fn blocks_per_group(&self) -> u32 {
        self.blocks_per_group
    }

    /// 获取每组 inode 数
    pub fn inodes_per_group(&self) -> u32 {
        self.inodes_per_group
    }

    /// 获取每组片段数
    pub fn frags_per_group(&self) -> u32 {
        self.frags_per_group
    }

    /// 获取第一个数据块
    pub fn first_data_block(&self) -> u32 {
        self.first_data_block
    }

    /// 修订版本
    pub fn rev_level(&self) -> u32 {
        self.rev_level
    }

    /// 第一个非保留 inode
    pub fn first_ino(&self) -> u32 {
        self.first_ino
    }

    /// 获取块组数量（向上取整）
    pub fn block_group_count(&self) -> u32 {
        if self.blocks_per_group == 0 {
            return 0;
        }
        self.blocks_count.div_ceil(self.blocks_per_group)
    }

    /// 计算指定块组中的块数量
    ///
    /// 最后一个块组保存余数（余数非零时）
    pub fn blocks_in_group_cnt(&self, bgid: u32) -> u32 {
        if self.blocks_per_group == 0 {
            return 0;
        }
        let block_group_count = self.block_group_count();
        let remainder = self.blocks_count % self.blocks_per_group;

        if bgid + 1 == block_group_count && remainder != 0 {
            remainder
        } else {
            self.blocks_per_group
        }
    }

    /// 块组描述符表的起始字节偏移
    pub fn group_desc_table_offset(&self) -> u64 {
        (self.first_data_block as u64 + 1) * self.block_size() as u64
    }
}
