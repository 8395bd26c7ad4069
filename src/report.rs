//! 记录输出
//!
//! 解析流程产生六类记录，通过 [`RecordSink`] 交给调用方。
//! [`CsvSink`] 把每条记录渲染为一行逗号分隔文本（十六进制大写、无前缀），
//! [`CollectSink`] 把记录收集在内存中。

use crate::{
    bitmap::{BitmapEntry, BitmapKind},
    block_group::GroupDescriptor,
    dir::DirEntryRecord,
    error::Result,
    indirect::IndirectEntry,
    inode::Inode,
    superblock::Superblock,
};
use alloc::vec::Vec;
use core::fmt::Write;

/// 记录接收端
///
/// 每个方法对应一类记录；返回错误时整个解析流程终止。
pub trait RecordSink {
    /// superblock
    fn superblock(&mut self, sb: &Superblock) -> Result<()>;

    /// 块组描述符
    fn group(&mut self, desc: &GroupDescriptor) -> Result<()>;

    /// 空闲块或空闲 inode
    fn bitmap_entry(&mut self, entry: &BitmapEntry) -> Result<()>;

    /// 已分配 inode
    fn inode(&mut self, inode: &Inode) -> Result<()>;

    /// 间接块中的非零指针
    fn indirect_entry(&mut self, entry: &IndirectEntry) -> Result<()>;

    /// 目录项
    fn dir_entry(&mut self, entry: &DirEntryRecord) -> Result<()>;
}

/// 逗号分隔文本输出
pub struct CsvSink<W> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    /// 创建新的 CSV 输出
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 取回底层输出
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn superblock(&mut self, sb: &Superblock) -> Result<()> {
        writeln!(
            self.out,
            "{:04X},{},{},{},{},{},{},{},{}",
            sb.magic(),
            sb.inodes_count(),
            sb.blocks_count(),
            sb.block_size(),
            sb.fragment_size(),
            sb.blocks_per_group(),
            sb.inodes_per_group(),
            sb.frags_per_group(),
            sb.first_data_block()
        )?;
        Ok(())
    }

    fn group(&mut self, desc: &GroupDescriptor) -> Result<()> {
        writeln!(
            self.out,
            "{},{},{},{},{:X},{:X},{:X}",
            desc.contained_blocks(),
            desc.free_blocks_count(),
            desc.free_inodes_count(),
            desc.used_dirs_count(),
            desc.inode_bitmap(),
            desc.block_bitmap(),
            desc.inode_table()
        )?;
        Ok(())
    }

    fn bitmap_entry(&mut self, entry: &BitmapEntry) -> Result<()> {
        writeln!(self.out, "{:X},{}", entry.bitmap_block, entry.number)?;
        Ok(())
    }

    fn inode(&mut self, inode: &Inode) -> Result<()> {
        write!(
            self.out,
            "{},{},{:o},{},{},{},{:X},{:X},{:X},{},{}",
            inode.inode_num(),
            inode.inode_type().tag(),
            inode.mode(),
            inode.uid(),
            inode.gid(),
            inode.links_count(),
            inode.ctime(),
            inode.mtime(),
            inode.atime(),
            inode.file_size(),
            inode.blocks_count()
        )?;
        for ptr in inode.block_pointers() {
            write!(self.out, ",{:X}", ptr)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn indirect_entry(&mut self, entry: &IndirectEntry) -> Result<()> {
        writeln!(
            self.out,
            "{:X},{},{:X}",
            entry.containing_block, entry.slot, entry.pointer
        )?;
        Ok(())
    }

    fn dir_entry(&mut self, entry: &DirEntryRecord) -> Result<()> {
        writeln!(
            self.out,
            "{},{},{},{},{},{}",
            entry.parent, entry.entry_num, entry.rec_len, entry.name_len, entry.inode, entry.name
        )?;
        Ok(())
    }
}

/// 在内存中收集全部记录
#[derive(Debug, Default)]
pub struct CollectSink {
    /// superblock
    pub superblocks: Vec<Superblock>,
    /// 块组描述符
    pub groups: Vec<GroupDescriptor>,
    /// 空闲块
    pub free_blocks: Vec<BitmapEntry>,
    /// 空闲 inode
    pub free_inodes: Vec<BitmapEntry>,
    /// inode
    pub inodes: Vec<Inode>,
    /// 间接块指针
    pub indirect: Vec<IndirectEntry>,
    /// 目录项
    pub dir_entries: Vec<DirEntryRecord>,
}

impl RecordSink for CollectSink {
    fn superblock(&mut self, sb: &Superblock) -> Result<()> {
        self.superblocks.try_reserve(1)?;
        self.superblocks.push(sb.clone());
        Ok(())
    }

    fn group(&mut self, desc: &GroupDescriptor) -> Result<()> {
        self.groups.try_reserve(1)?;
        self.groups.push(desc.clone());
        Ok(())
    }

    fn bitmap_entry(&mut self, entry: &BitmapEntry) -> Result<()> {
        let list = match entry.kind {
            BitmapKind::Block => &mut self.free_blocks,
            BitmapKind::Inode => &mut self.free_inodes,
        };
        list.try_reserve(1)?;
        list.push(*entry);
        Ok(())
    }

    fn inode(&mut self, inode: &Inode) -> Result<()> {
        self.inodes.try_reserve(1)?;
        self.inodes.push(inode.clone());
        Ok(())
    }

    fn indirect_entry(&mut self, entry: &IndirectEntry) -> Result<()> {
        self.indirect.try_reserve(1)?;
        self.indirect.push(*entry);
        Ok(())
    }

    fn dir_entry(&mut self, entry: &DirEntryRecord) -> Result<()> {
        self.dir_entries.try_reserve(1)?;
        self.dir_entries.push(entry.clone());
        Ok(())
    }
}
