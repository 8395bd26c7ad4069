//! Inode 读取和解码

use crate::{
    block::{BlockDev, BlockDevice, RecordReader},
    consts::*,
    error::{Error, ErrorKind, Result},
    fs::FilesystemContext,
    types::{InodeMode, InodeType},
};

/// 计算 inode 记录的字节偏移
///
/// `group = (n - 1) / inodes_per_group`，
/// `offset = inode_table(group) * block_size + ((n - 1) % inodes_per_group) * inode_size`
///
/// # 说明
///
/// inode 编号从 1 开始，0 表示无效 inode；所在块组不存在或其 inode 表指针
/// 越界时返回 `Format` 错误
pub fn inode_offset(ctx: &FilesystemContext, inode_num: u32) -> Result<u64> {
    if inode_num == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Invalid inode number (0)",
        ));
    }

    let sb = ctx.superblock();
    let inodes_per_group = sb.inodes_per_group();
    let block_group = (inode_num - 1) / inodes_per_group;
    let index_in_group = (inode_num - 1) % inodes_per_group;

    let desc = ctx.group(block_group)?;
    if !ctx.is_valid_block(desc.inode_table()) {
        return Err(Error::format("Inode table pointer out of range"));
    }
    Ok(ctx.block_offset(desc.inode_table()) + index_in_group as u64 * sb.inode_size() as u64)
}

/// 从块设备读取 inode
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `ctx` - 文件系统上下文
/// * `inode_num` - inode 编号（从 1 开始）
///
/// 只解码前 128 字节，更大的 inode 记录尾部被忽略
pub fn read_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    inode_num: u32,
) -> Result<Inode> {
    let offset = inode_offset(ctx, inode_num)?;

    let mut inode_buf = [0u8; EXT2_GOOD_OLD_INODE_SIZE];
    bdev.read_bytes(offset, &mut inode_buf)?;

    Inode::parse(&inode_buf, inode_num, ctx.block_size())
}

/// 解码后的 inode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    inode_num: u32,
    mode: u16,
    uid: u16,
    gid: u16,
    links_count: u16,
    atime: u32,
    ctime: u32,
    mtime: u32,
    size: u64,
    blocks: u64,
    block: [u32; EXT2_INODE_BLOCKS],
    inode_type: InodeType,
}

impl Inode {
    /// 从 inode 记录解码
    ///
    /// 文件大小的高 32 位只对普通文件生效；块数由 512 字节扇区数换算为
    /// 文件系统块数（向上取整）
    pub fn parse(buf: &[u8], inode_num: u32, block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::format("Block size is zero"));
        }

        let rec = RecordReader::new(buf);
        let mode = rec.u16(ino::MODE)?;
        let inode_type = InodeType::from_mode(mode);

        let size_lo = rec.u32(ino::SIZE_LO)? as u64;
        let size = if inode_type == InodeType::RegularFile {
            ((rec.u32(ino::SIZE_HIGH)? as u64) << 32) | size_lo
        } else {
            size_lo
        };

        let sectors = rec.u32(ino::BLOCKS)? as u64;
        let blocks = (sectors * EXT2_INODE_SECTOR_SIZE).div_ceil(block_size as u64);

        let mut block = [0u32; EXT2_INODE_BLOCKS];
        for (i, slot) in block.iter_mut().enumerate() {
            *slot = rec.u32(ino::BLOCK + i * 4)?;
        }

        Ok(Self {
            inode_num,
            mode,
            uid: rec.u16(ino::UID)?,
            gid: rec.u16(ino::GID)?,
            links_count: rec.u16(ino::LINKS_COUNT)?,
            atime: rec.u32(ino::ATIME)?,
            ctime: rec.u32(ino::CTIME)?,
            mtime: rec.u32(ino::MTIME)?,
            size,
            blocks,
            block,
            inode_type,
        })
    }

    /// 获取 inode 编号
    pub fn inode_num(&self) -> u32 {
        self.inode_num
    }

    /// 获取文件模式（类型 + 权限）
    pub fn mode(&self) -> u16 {
        self.mode
    }

    /// 模式位
    pub fn mode_flags(&self) -> InodeMode {
        InodeMode::from_raw(self.mode)
    }

    /// 获取 inode 类型
    pub fn inode_type(&self) -> InodeType {
        self.inode_type
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.inode_type == InodeType::Directory
    }

    /// 获取用户 ID
    pub fn uid(&self) -> u16 {
        self.uid
    }

    /// 获取组 ID
    pub fn gid(&self) -> u16 {
        self.gid
    }

    /// 获取硬链接数
    pub fn links_count(&self) -> u16 {
        self.links_count
    }

    /// 访问时间
    pub fn atime(&self) -> u32 {
        self.atime
    }

    /// 状态改变时间
    pub fn ctime(&self) -> u32 {
        self.ctime
    }

    /// 修改时间
    pub fn mtime(&self) -> u32 {
        self.mtime
    }

    /// 获取文件大小
    pub fn file_size(&self) -> u64 {
        self.size
    }

    /// 占用的文件系统块数
    pub fn blocks_count(&self) -> u64 {
        self.blocks
    }

    /// 全部 15 个块指针
    pub fn block_pointers(&self) -> &[u32; EXT2_INODE_BLOCKS] {
        &self.block
    }

    /// 12 个直接块指针
    pub fn direct_blocks(&self) -> &[u32] {
        &self.block[..EXT2_INODE_DIRECT_BLOCKS]
    }

    /// 第 `level` 级间接块指针（1 = 一级，2 = 二级，3 = 三级）
    pub fn indirect_block(&self, level: u32) -> Option<u32> {
        let index = match level {
            1 => EXT2_INODE_INDIRECT_BLOCK,
            2 => EXT2_INODE_DOUBLE_INDIRECT_BLOCK,
            3 => EXT2_INODE_TRIPLE_INDIRECT_BLOCK,
            _ => return None,
        };
        Some(self.block[index])
    }

    /// 是否有任何非零的间接块指针
    pub fn has_indirect(&self) -> bool {
        self.block[EXT2_INODE_INDIRECT_BLOCK..=EXT2_INODE_TRIPLE_INDIRECT_BLOCK]
            .iter()
            .any(|&b| b != 0)
    }
}
