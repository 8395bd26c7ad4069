//! 间接块模块
//!
//! 传统 ext2 块寻址：inode 的槽位 12、13、14 分别指向一级、二级、三级间接块。

mod walker;

pub use walker::{walk_indirect_blocks, IndirectEntry, IndirectWalker};
