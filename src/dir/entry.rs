//! 目录项解析
//!
//! 目录数据块由变长目录项首尾相接组成：
//! inode (u32, +0)、rec_len (u16, +4)、name_len (u8, +6)、name (+8)。
//! 只遍历目录 inode 的直接块，遇到第一个为零的指针即停止。

use crate::{
    block::{BlockDev, BlockDevice, RecordReader},
    consts::*,
    error::{Error, ErrorKind, Result},
    fs::FilesystemContext,
    inode::{Inode, InodeScan},
};
use alloc::{string::String, vec, vec::Vec};

/// 一个目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryRecord {
    /// 父目录 inode
    pub parent: u32,
    /// 在父目录中的序号（从 0 开始，跨块连续，跳过的空项也计数）
    pub entry_num: u32,
    /// 记录长度
    pub rec_len: u16,
    /// 名字长度
    pub name_len: u8,
    /// 子 inode
    pub inode: u32,
    /// 名字（非 UTF-8 字节按替换字符解码）
    pub name: String,
}

/// 解析一个目录数据块
///
/// # 参数
///
/// * `block` - 整块数据
/// * `parent` - 目录 inode 号
/// * `next_num` - 下一个目录项序号，解析后前移
/// * `out` - 输出列表
///
/// # 返回
///
/// 追加到 `out` 的目录项数量。inode 为 0 的项只推进游标与序号，不输出。
pub fn parse_dir_block(
    block: &[u8],
    parent: u32,
    next_num: &mut u32,
    out: &mut Vec<DirEntryRecord>,
) -> Result<usize> {
    let block_len = block.len();
    let mut cursor = 0usize;
    let mut emitted = 0usize;

    while cursor < block_len {
        if cursor + EXT2_DIR_ENTRY_HEADER_LEN > block_len {
            return Err(Error::format("Directory entry header crosses block end"));
        }

        let rec = RecordReader::new(&block[cursor..]);
        let inode = rec.u32(de::INODE)?;
        let rec_len = rec.u16(de::REC_LEN)?;
        let name_len = rec.u8(de::NAME_LEN)?;

        if (rec_len as usize) < EXT2_DIR_ENTRY_HEADER_LEN {
            return Err(Error::format("Directory entry record length too small"));
        }
        if cursor + rec_len as usize > block_len {
            return Err(Error::format("Directory entry overruns block"));
        }

        let entry_num = *next_num;
        *next_num += 1;

        if inode != 0 {
            if name_len as usize + EXT2_DIR_ENTRY_HEADER_LEN > rec_len as usize {
                return Err(Error::format("Directory entry name exceeds record length"));
            }
            let name = String::from_utf8_lossy(rec.bytes(de::NAME, name_len as usize)?).into_owned();

            out.try_reserve(1)?;
            out.push(DirEntryRecord {
                parent,
                entry_num,
                rec_len,
                name_len,
                inode,
                name,
            });
            emitted += 1;
        }

        cursor += rec_len as usize;
    }

    Ok(emitted)
}

/// 读取一个目录 inode 的全部目录项
pub fn read_dir_entries<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    dir: &Inode,
) -> Result<Vec<DirEntryRecord>> {
    if !dir.is_dir() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Inode is not a directory",
        ));
    }

    let mut entries = Vec::new();
    let mut next_num = 0u32;
    let mut buf = vec![0u8; ctx.block_size() as usize];

    for &block in dir.direct_blocks() {
        if block == 0 {
            break;
        }
        if !ctx.is_valid_block(block) {
            return Err(Error::format("Directory block pointer out of range"));
        }

        bdev.read_bytes(ctx.block_offset(block), &mut buf)?;
        let n = parse_dir_block(&buf, dir.inode_num(), &mut next_num, &mut entries)?;
        log::trace!("[DIR] inode {} block {} -> {} entries", dir.inode_num(), block, n);
    }

    Ok(entries)
}

/// 遍历所有目录 inode
pub fn walk_directories<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    inodes: &InodeScan,
) -> Result<Vec<DirEntryRecord>> {
    let mut all = Vec::new();
    for dir in inodes.directories() {
        let mut entries = read_dir_entries(bdev, ctx, dir)?;
        all.try_reserve(entries.len())?;
        all.append(&mut entries);
    }

    log::debug!(
        "[DIR] {} directories, {} entries",
        inodes.directory_count(),
        all.len()
    );

    Ok(all)
}
