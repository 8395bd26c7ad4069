//! ext2_dump: 只读 ext2 元数据解析
//!
//! 从原始块设备字节中重建 ext2 文件系统的元数据：
//! - **superblock** 与块组描述符表
//! - 块位图与 inode 位图中的**空闲项**
//! - 全部已分配 **inode**
//! - 一级、二级、三级**间接块**指针
//! - 目录数据块中的**目录项**
//!
//! 解析严格按上述顺序进行，结果通过 [`RecordSink`] 逐条输出。
//!
//! # 示例
//!
//! ```rust,ignore
//! use ext2_dump::{CsvSink, DumpConfig, Ext2Dump, FileDevice, Result};
//!
//! fn main() -> Result<()> {
//!     let device = FileDevice::open("disk.img")?;
//!     let mut dump = Ext2Dump::open(device, DumpConfig::default())?;
//!
//!     let mut sink = CsvSink::new(String::new());
//!     dump.dump(&mut sink)?;
//!     print!("{}", sink.into_inner());
//!
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`block`] - 块设备抽象、I/O 与小端解码
//! - [`cache`] - 只读块缓存
//! - [`superblock`] - Superblock 读取与验证
//! - [`block_group`] - 块组描述符表
//! - [`bitmap`] - 分配位图扫描
//! - [`inode`] - Inode 表读取
//! - [`indirect`] - 间接块遍历
//! - [`dir`] - 目录项解析
//! - [`fs`] - 解析驱动
//! - [`report`] - 记录输出

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 块设备抽象
pub mod block;

/// 常量定义
pub mod consts;

/// 数据结构定义
pub mod types;

/// Superblock 操作
pub mod superblock;

/// 块组操作
pub mod block_group;

/// 位图操作
pub mod bitmap;

/// Inode 操作
pub mod inode;

/// Indirect blocks 操作（传统 ext2 间接块寻址）
pub mod indirect;

/// 目录操作
pub mod dir;

/// 文件系统高级 API
pub mod fs;

/// 块缓存
pub mod cache;

/// 记录输出
pub mod report;

#[cfg(test)]
mod test_utils;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 块设备
pub use block::{BlockDev, BlockDevice};

#[cfg(feature = "std")]
pub use block::FileDevice;

// 类型
pub use types::{InodeMode, InodeType};

// Superblock
pub use superblock::{read_superblock, Superblock};

// BlockGroup
pub use block_group::{build_group_table, read_block_group_desc, GroupDescriptor};

// Bitmap
pub use bitmap::{scan_bitmaps, AllocationScan, BitmapEntry, BitmapKind, GroupUsage};

// Inode
pub use inode::{inode_offset, read_inode, read_inode_table, Inode, InodeScan};

// Indirect blocks
pub use indirect::{walk_indirect_blocks, IndirectEntry, IndirectWalker};

// Dir
pub use dir::{read_dir_entries, walk_directories, DirEntryRecord};

// FileSystem
pub use fs::{dump, DumpConfig, DumpSummary, Ext2Dump, FilesystemContext};

// Cache
pub use cache::{BlockCache, CacheStats, DEFAULT_CACHE_SIZE};

// Report
pub use report::{CollectSink, CsvSink, RecordSink};
