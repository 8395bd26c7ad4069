//! 分配位图扫描
//!
//! 按块组升序读取块位图与 inode 位图，空闲块和空闲 inode 作为
//! [`BitmapEntry`] 报告，已分配 inode 按发现顺序收集，作为 inode 表读取的输入。

use super::ops::{bitmap_bytes, count_ones, count_zeros, test_bit};
use crate::{
    block::{BlockDev, BlockDevice},
    block_group::GroupDescriptor,
    error::{Error, Result},
    fs::FilesystemContext,
};
use alloc::vec;
use alloc::vec::Vec;

/// 位图类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapKind {
    /// 块位图
    Block,
    /// inode 位图
    Inode,
}

/// 一个空闲项（块或 inode）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapEntry {
    /// 位图类型
    pub kind: BitmapKind,
    /// 所在位图块号
    pub bitmap_block: u32,
    /// 空闲块号或空闲 inode 号
    pub number: u64,
}

/// 单个块组的使用情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupUsage {
    /// 块组编号
    pub group: u32,
    /// 空闲块数
    pub free_blocks: u32,
    /// 已分配块数
    pub used_blocks: u32,
    /// 空闲 inode 数
    pub free_inodes: u32,
    /// 已分配 inode 数
    pub used_inodes: u32,
}

/// 位图扫描结果
#[derive(Debug, Clone, Default)]
pub struct AllocationScan {
    entries: Vec<BitmapEntry>,
    allocated_inodes: Vec<u32>,
    usage: Vec<GroupUsage>,
}

impl AllocationScan {
    /// 全部空闲项，顺序为：每个组先块后 inode，组号升序
    pub fn entries(&self) -> &[BitmapEntry] {
        &self.entries
    }

    /// 已分配 inode 号（升序发现顺序）
    pub fn allocated_inodes(&self) -> &[u32] {
        &self.allocated_inodes
    }

    /// 每组使用情况
    pub fn usage(&self) -> &[GroupUsage] {
        &self.usage
    }

    /// 空闲块记录数
    pub fn free_block_count(&self) -> u64 {
        self.count(BitmapKind::Block)
    }

    /// 空闲 inode 记录数
    pub fn free_inode_count(&self) -> u64 {
        self.count(BitmapKind::Inode)
    }

    fn count(&self, kind: BitmapKind) -> u64 {
        self.entries.iter().filter(|e| e.kind == kind).count() as u64
    }
}

/// 扫描所有块组的块位图与 inode 位图
///
/// 空闲块号为 `1 + group * groups[0].contained_blocks + i`，步长取第一个
/// 块组的块数。任一读取失败时不返回部分结果。
pub fn scan_bitmaps<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
) -> Result<AllocationScan> {
    let block_size = ctx.block_size();
    let inodes_per_group = ctx.superblock().inodes_per_group();
    let stride = ctx.group(0)?.contained_blocks() as u64;

    let mut scan = AllocationScan::default();
    scan.usage.try_reserve_exact(ctx.group_count() as usize)?;

    for desc in ctx.groups() {
        let group = desc.group_num();

        // 块位图
        let contained = desc.contained_blocks();
        let block_bitmap = read_bitmap(bdev, ctx, desc.block_bitmap(), contained, block_size)?;
        for i in 0..contained {
            if !test_bit(&block_bitmap, i) {
                scan.entries.try_reserve(1)?;
                scan.entries.push(BitmapEntry {
                    kind: BitmapKind::Block,
                    bitmap_block: desc.block_bitmap(),
                    number: 1 + group as u64 * stride + i as u64,
                });
            }
        }

        // inode 位图
        let inode_bitmap = read_bitmap(bdev, ctx, desc.inode_bitmap(), inodes_per_group, block_size)?;
        for i in 0..inodes_per_group {
            let inode_num = inode_number(group, inodes_per_group, i)?;
            if test_bit(&inode_bitmap, i) {
                scan.allocated_inodes.try_reserve(1)?;
                scan.allocated_inodes.push(inode_num);
            } else {
                scan.entries.try_reserve(1)?;
                scan.entries.push(BitmapEntry {
                    kind: BitmapKind::Inode,
                    bitmap_block: desc.inode_bitmap(),
                    number: inode_num as u64,
                });
            }
        }

        let usage = GroupUsage {
            group,
            free_blocks: count_zeros(&block_bitmap, 0, contained),
            used_blocks: count_ones(&block_bitmap, 0, contained),
            free_inodes: count_zeros(&inode_bitmap, 0, inodes_per_group),
            used_inodes: count_ones(&inode_bitmap, 0, inodes_per_group),
        };
        log_group_usage(desc, &usage);
        scan.usage.push(usage);
    }

    log::debug!(
        "[BITMAP] groups={} free_blocks={} free_inodes={} allocated_inodes={}",
        scan.usage.len(),
        scan.free_block_count(),
        scan.free_inode_count(),
        scan.allocated_inodes.len()
    );

    Ok(scan)
}

/// 读取覆盖 `bits` 个位的位图字节
fn read_bitmap<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    ctx: &FilesystemContext,
    bitmap_block: u32,
    bits: u32,
    block_size: u32,
) -> Result<Vec<u8>> {
    if !ctx.is_valid_block(bitmap_block) {
        return Err(Error::format("Bitmap block pointer out of range"));
    }

    let len = bitmap_bytes(bits);
    if len > block_size as usize {
        return Err(Error::format("Bitmap does not fit in one block"));
    }

    let mut buf = vec![0u8; len];
    bdev.read_bytes(ctx.block_offset(bitmap_block), &mut buf)?;
    Ok(buf)
}

fn inode_number(group: u32, inodes_per_group: u32, index: u32) -> Result<u32> {
    let n = 1 + group as u64 * inodes_per_group as u64 + index as u64;
    u32::try_from(n).map_err(|_| Error::format("Inode number exceeds 32 bits"))
}

fn log_group_usage(desc: &GroupDescriptor, usage: &GroupUsage) {
    if usage.free_blocks != desc.free_blocks_count() as u32
        || usage.free_inodes != desc.free_inodes_count() as u32
    {
        log::warn!(
            "[BITMAP] group {} bitmap free counts ({}, {}) differ from descriptor ({}, {})",
            usage.group,
            usage.free_blocks,
            usage.free_inodes,
            desc.free_blocks_count(),
            desc.free_inodes_count()
        );
    } else {
        log::trace!(
            "[BITMAP] group {} free_blocks={} free_inodes={}",
            usage.group,
            usage.free_blocks,
            usage.free_inodes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::{ImageBuilder, InodeSpec};

    #[test]
    fn test_free_plus_used_covers_range() {
        let mut image = ImageBuilder::new(1024, 200, 64, 8);
        for bit in [0, 1, 2, 5, 63] {
            image.mark_block_bit(0, bit);
        }
        image.mark_block_bit(3, 7);
        image.mark_inode(1);
        image.mark_inode(2);
        image.mark_inode(11);
        let (mut bdev, ctx) = image.build_context();

        let scan = scan_bitmaps(&mut bdev, &ctx).unwrap();
        let usage = scan.usage();
        assert_eq!(usage.len(), 4);
        for (u, desc) in usage.iter().zip(ctx.groups()) {
            assert_eq!(u.free_blocks + u.used_blocks, desc.contained_blocks());
            assert_eq!(u.free_inodes + u.used_inodes, 8);
        }
        assert_eq!(usage[0].used_blocks, 5);
        assert_eq!(usage[3].used_blocks, 1);
        assert_eq!(usage[1].used_inodes, 1);
        assert_eq!(scan.allocated_inodes(), &[1, 2, 11]);
        assert_eq!(scan.free_inode_count(), 32 - 3);
    }

    #[test]
    fn test_entry_order_and_numbers() {
        let mut image = ImageBuilder::new(1024, 200, 64, 8);
        for bit in 0..64 {
            if bit != 4 {
                image.mark_block_bit(0, bit);
            }
        }
        for ino in 1..=8 {
            image.mark_inode(ino);
        }
        let (mut bdev, ctx) = image.build_context();

        let scan = scan_bitmaps(&mut bdev, &ctx).unwrap();
        let entries = scan.entries();

        // 组 0：唯一空闲块 5，没有空闲 inode
        assert_eq!(
            entries[0],
            BitmapEntry {
                kind: BitmapKind::Block,
                bitmap_block: image.block_bitmap_block(0),
                number: 5,
            }
        );
        // 组 1：块从 65 开始，随后是 inode 9..=16
        assert_eq!(entries[1].number, 65);
        assert_eq!(entries[1].bitmap_block, image.block_bitmap_block(1));
        let group1_inodes: Vec<u64> = entries
            .iter()
            .filter(|e| e.kind == BitmapKind::Inode && e.bitmap_block == image.inode_bitmap_block(1))
            .map(|e| e.number)
            .collect();
        assert_eq!(group1_inodes, (9..=16).collect::<Vec<u64>>());

        // 同组内块在 inode 之前：组 0 的 1 个空闲块 + 组 1 的 64 个空闲块
        let first_inode = entries.iter().position(|e| e.kind == BitmapKind::Inode).unwrap();
        assert_eq!(first_inode, 1 + 64);
        assert_eq!(entries[first_inode].number, 9);
    }

    #[test]
    fn test_stride_uses_first_group_size() {
        // 最后一个组只有 200 % 64 = 8 个块，编号仍按第一个组的 64 递增
        let image = ImageBuilder::new(1024, 200, 64, 8);
        let (mut bdev, ctx) = image.build_context();

        let scan = scan_bitmaps(&mut bdev, &ctx).unwrap();
        let last_group: Vec<u64> = scan
            .entries()
            .iter()
            .filter(|e| e.kind == BitmapKind::Block && e.bitmap_block == image.block_bitmap_block(3))
            .map(|e| e.number)
            .collect();
        assert_eq!(last_group.len(), 8);
        assert_eq!(last_group[0], 1 + 3 * 64);
        assert_eq!(*last_group.last().unwrap(), 1 + 3 * 64 + 7);
    }

    #[test]
    fn test_allocated_inodes_follow_bitmap() {
        let mut image = ImageBuilder::new(1024, 128, 64, 8);
        image.write_inode(2, &InodeSpec { mode: 0x41ED, ..InodeSpec::default() });
        image.write_inode(12, &InodeSpec { mode: 0x81A4, ..InodeSpec::default() });
        let (mut bdev, ctx) = image.build_context();

        let scan = scan_bitmaps(&mut bdev, &ctx).unwrap();
        assert_eq!(scan.allocated_inodes(), &[2, 12]);
        assert_eq!(scan.free_block_count(), 128);
    }

    #[test]
    fn test_truncated_bitmap_is_read_error() {
        let image = ImageBuilder::new(1024, 200, 64, 8);
        let mut device = image.device();
        let cut = image.block_bitmap_block(2) as usize * 1024;
        device.storage.truncate(cut);
        let mut bdev = BlockDev::new(device).unwrap();
        let ctx = FilesystemContext::load(&mut bdev).unwrap();

        let err = scan_bitmaps(&mut bdev, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
    }

    #[test]
    fn test_bad_bitmap_pointer_is_format_error() {
        // 组 1 描述符的块位图指针 = 0，inode 位图指针越界
        let mut image = ImageBuilder::new(1024, 200, 64, 8);
        image.write_block(2, 32, &0u32.to_le_bytes());
        let (mut bdev, ctx) = image.build_context();
        let err = scan_bitmaps(&mut bdev, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let mut image = ImageBuilder::new(1024, 200, 64, 8);
        image.write_block(2, 4, &200u32.to_le_bytes());
        let (mut bdev, ctx) = image.build_context();
        let err = scan_bitmaps(&mut bdev, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
