//! 测试辅助：内存块设备与合成 ext2 镜像

use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    fs::FilesystemContext,
    superblock::{read_superblock, Superblock},
};
use alloc::vec;
use alloc::vec::Vec;

/// 内存块设备
///
/// `storage` 可以比 `total_blocks * block_size` 短，用来模拟被截断的镜像
pub(crate) struct MockDevice {
    pub block_size: u32,
    pub sector_size: u32,
    pub total_blocks: u64,
    pub storage: Vec<u8>,
}

impl MockDevice {
    pub fn new(block_size: u32, total_blocks: u64) -> Self {
        Self {
            block_size,
            sector_size: 512,
            total_blocks,
            storage: vec![0u8; (total_blocks * block_size as u64) as usize],
        }
    }

    pub fn write_at(&mut self, offset: usize, data: &[u8]) {
        self.storage[offset..offset + data.len()].copy_from_slice(data);
    }
}

impl BlockDevice for MockDevice {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let start = (lba * self.sector_size as u64) as usize;
        let want = (count * self.sector_size) as usize;
        let avail = self.storage.len().saturating_sub(start).min(want);
        buf[..avail].copy_from_slice(&self.storage[start..start + avail]);
        Ok(avail)
    }
}

/// Superblock 字段描述，用于生成 1024 字节的 superblock
#[derive(Debug, Clone)]
pub(crate) struct SuperblockSpec {
    pub magic: u16,
    pub inodes_count: u32,
    pub blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    pub log_block_size: u32,
    pub log_frag_size: i32,
    pub blocks_per_group: u32,
    pub frags_per_group: u32,
    pub inodes_per_group: u32,
    pub rev_level: u32,
    pub first_ino: u32,
    pub inode_size: u16,
}

impl Default for SuperblockSpec {
    fn default() -> Self {
        Self {
            magic: EXT2_SUPERBLOCK_MAGIC,
            inodes_count: 32,
            blocks_count: 64,
            free_blocks_count: 0,
            free_inodes_count: 0,
            first_data_block: 1,
            log_block_size: 0,
            log_frag_size: 0,
            blocks_per_group: 8192,
            frags_per_group: 8192,
            inodes_per_group: 32,
            rev_level: 1,
            first_ino: 11,
            inode_size: 128,
        }
    }
}

impl SuperblockSpec {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; EXT2_SUPERBLOCK_SIZE];
        put_u32(&mut buf, sb::INODES_COUNT, self.inodes_count);
        put_u32(&mut buf, sb::BLOCKS_COUNT, self.blocks_count);
        put_u32(&mut buf, sb::FREE_BLOCKS_COUNT, self.free_blocks_count);
        put_u32(&mut buf, sb::FREE_INODES_COUNT, self.free_inodes_count);
        put_u32(&mut buf, sb::FIRST_DATA_BLOCK, self.first_data_block);
        put_u32(&mut buf, sb::LOG_BLOCK_SIZE, self.log_block_size);
        put_u32(&mut buf, sb::LOG_FRAG_SIZE, self.log_frag_size as u32);
        put_u32(&mut buf, sb::BLOCKS_PER_GROUP, self.blocks_per_group);
        put_u32(&mut buf, sb::FRAGS_PER_GROUP, self.frags_per_group);
        put_u32(&mut buf, sb::INODES_PER_GROUP, self.inodes_per_group);
        put_u16(&mut buf, sb::MAGIC, self.magic);
        put_u32(&mut buf, sb::REV_LEVEL, self.rev_level);
        put_u32(&mut buf, sb::FIRST_INO, self.first_ino);
        put_u16(&mut buf, sb::INODE_SIZE, self.inode_size);
        buf
    }

    pub fn parse(&self) -> Superblock {
        Superblock::parse(&self.to_bytes()).unwrap()
    }
}

/// Inode 字段描述
#[derive(Debug, Clone, Default)]
pub(crate) struct InodeSpec {
    pub mode: u16,
    pub uid: u16,
    pub gid: u16,
    pub links_count: u16,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub size_lo: u32,
    pub size_high: u32,
    pub sectors: u32,
    pub block: [u32; EXT2_INODE_BLOCKS],
}

impl InodeSpec {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; EXT2_GOOD_OLD_INODE_SIZE];
        put_u16(&mut buf, ino::MODE, self.mode);
        put_u16(&mut buf, ino::UID, self.uid);
        put_u32(&mut buf, ino::SIZE_LO, self.size_lo);
        put_u32(&mut buf, ino::ATIME, self.atime);
        put_u32(&mut buf, ino::CTIME, self.ctime);
        put_u32(&mut buf, ino::MTIME, self.mtime);
        put_u16(&mut buf, ino::GID, self.gid);
        put_u16(&mut buf, ino::LINKS_COUNT, self.links_count);
        put_u32(&mut buf, ino::BLOCKS, self.sectors);
        for (i, b) in self.block.iter().enumerate() {
            put_u32(&mut buf, ino::BLOCK + i * 4, *b);
        }
        put_u32(&mut buf, ino::SIZE_HIGH, self.size_high);
        buf
    }
}

/// 目录项编码（测试用）
pub(crate) fn dir_entry_bytes(inode: u32, rec_len: u16, name: &str) -> Vec<u8> {
    let mut buf = vec![0u8; rec_len as usize];
    put_u32(&mut buf, de::INODE, inode);
    put_u16(&mut buf, de::REC_LEN, rec_len);
    buf[de::NAME_LEN] = name.len() as u8;
    buf[de::NAME..de::NAME + name.len()].copy_from_slice(name.as_bytes());
    buf
}

/// 合成 ext2 镜像
///
/// 布局：superblock 之后是块组描述符表，然后依次是每个组的块位图、
/// inode 位图和 inode 表，剩余块通过 [`ImageBuilder::alloc_block`] 分配。
/// 所有位图初始为全空闲。
pub(crate) struct ImageBuilder {
    storage: Vec<u8>,
    block_size: u32,
    blocks_count: u32,
    blocks_per_group: u32,
    inodes_per_group: u32,
    first_data_block: u32,
    meta: Vec<(u32, u32, u32)>,
    next_block: u32,
}

impl ImageBuilder {
    pub fn new(block_size: u32, blocks_count: u32, blocks_per_group: u32, inodes_per_group: u32) -> Self {
        let log_block_size = (block_size / EXT2_MIN_BLOCK_SIZE).trailing_zeros();
        let first_data_block = if block_size == EXT2_MIN_BLOCK_SIZE { 1 } else { 0 };
        let group_count = blocks_count.div_ceil(blocks_per_group);

        let table_blocks =
            (inodes_per_group as usize * EXT2_GOOD_OLD_INODE_SIZE).div_ceil(block_size as usize) as u32;

        let mut next_block = first_data_block + 2;
        let mut meta = Vec::new();
        for _ in 0..group_count {
            meta.push((next_block, next_block + 1, next_block + 2));
            next_block += 2 + table_blocks;
        }

        let total = (blocks_count.max(next_block) + 1) as usize;
        let mut builder = Self {
            storage: vec![0u8; total * block_size as usize],
            block_size,
            blocks_count,
            blocks_per_group,
            inodes_per_group,
            first_data_block,
            meta,
            next_block,
        };

        let spec = SuperblockSpec {
            inodes_count: inodes_per_group * group_count,
            blocks_count,
            first_data_block,
            log_block_size,
            blocks_per_group,
            frags_per_group: blocks_per_group,
            inodes_per_group,
            ..SuperblockSpec::default()
        };
        builder.write_bytes(EXT2_SUPERBLOCK_OFFSET as usize, &spec.to_bytes());

        let table_offset = (first_data_block as usize + 1) * block_size as usize;
        for g in 0..group_count {
            let (bb, ib, it) = builder.meta[g as usize];
            let contained = if g + 1 == group_count && blocks_count % blocks_per_group != 0 {
                blocks_count % blocks_per_group
            } else {
                blocks_per_group
            };
            let mut desc = [0u8; EXT2_GROUP_DESC_SIZE];
            put_u32(&mut desc, gd::BLOCK_BITMAP, bb);
            put_u32(&mut desc, gd::INODE_BITMAP, ib);
            put_u32(&mut desc, gd::INODE_TABLE, it);
            put_u16(&mut desc, gd::FREE_BLOCKS_COUNT, contained as u16);
            put_u16(&mut desc, gd::FREE_INODES_COUNT, inodes_per_group as u16);
            put_u16(&mut desc, gd::USED_DIRS_COUNT, 0);
            builder.write_bytes(table_offset + g as usize * EXT2_GROUP_DESC_SIZE, &desc);
        }

        builder
    }

    pub fn block_bitmap_block(&self, group: u32) -> u32 {
        self.meta[group as usize].0
    }

    pub fn inode_bitmap_block(&self, group: u32) -> u32 {
        self.meta[group as usize].1
    }

    pub fn inode_table_block(&self, group: u32) -> u32 {
        self.meta[group as usize].2
    }

    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.storage[offset..offset + data.len()].copy_from_slice(data);
    }

    /// 写入块内偏移处的数据
    pub fn write_block(&mut self, block: u32, offset: usize, data: &[u8]) {
        let base = block as usize * self.block_size as usize + offset;
        self.write_bytes(base, data);
    }

    /// 在间接块中写入若干 (槽位, 指针)
    pub fn write_pointers(&mut self, block: u32, slots: &[(usize, u32)]) {
        for &(slot, ptr) in slots {
            self.write_block(block, slot * 4, &ptr.to_le_bytes());
        }
    }

    /// 设置块位图中第 `group` 组的第 `bit` 位
    pub fn mark_block_bit(&mut self, group: u32, bit: u32) {
        let block = self.block_bitmap_block(group);
        self.set_bit(block, bit);
    }

    /// 设置 inode 位图中对应 inode 的位
    pub fn mark_inode(&mut self, inode_num: u32) {
        let group = (inode_num - 1) / self.inodes_per_group;
        let bit = (inode_num - 1) % self.inodes_per_group;
        let block = self.inode_bitmap_block(group);
        self.set_bit(block, bit);
    }

    fn set_bit(&mut self, block: u32, bit: u32) {
        let offset = block as usize * self.block_size as usize + (bit / 8) as usize;
        self.storage[offset] |= 1 << (bit % 8);
    }

    /// 分配一个数据块并在块位图中标记
    pub fn alloc_block(&mut self) -> u32 {
        let block = self.next_block;
        assert!(block < self.blocks_count, "synthetic image is out of blocks");
        self.next_block += 1;

        let rel = block - self.first_data_block;
        self.mark_block_bit(rel / self.blocks_per_group, rel % self.blocks_per_group);
        block
    }

    /// 写入 inode 记录并在 inode 位图中标记为已分配
    pub fn write_inode(&mut self, inode_num: u32, spec: &InodeSpec) {
        let group = (inode_num - 1) / self.inodes_per_group;
        let index = (inode_num - 1) % self.inodes_per_group;
        let offset = self.inode_table_block(group) as usize * self.block_size as usize
            + index as usize * EXT2_GOOD_OLD_INODE_SIZE;
        self.write_bytes(offset, &spec.to_bytes());
        self.mark_inode(inode_num);
    }

    pub fn device(&self) -> MockDevice {
        let total_blocks = (self.storage.len() / EXT2_MIN_BLOCK_SIZE as usize) as u64;
        MockDevice {
            block_size: EXT2_MIN_BLOCK_SIZE,
            sector_size: 512,
            total_blocks,
            storage: self.storage.clone(),
        }
    }

    pub fn build(&self) -> (BlockDev<MockDevice>, Superblock) {
        let mut bdev = BlockDev::new(self.device()).unwrap();
        let sb = read_superblock(&mut bdev).unwrap();
        (bdev, sb)
    }

    pub fn build_context(&self) -> (BlockDev<MockDevice>, FilesystemContext) {
        let mut bdev = BlockDev::new(self.device()).unwrap();
        let ctx = FilesystemContext::load(&mut bdev).unwrap();
        (bdev, ctx)
    }
}

fn put_u16(buf: &mut [u8], offset: usize, v: u16) {
    buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, v: u32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}
