//! Inode 操作模块
//!
//! 这个模块计算 inode 在 inode 表中的位置，解码 inode 记录，
//! 并按已分配 inode 列表读取整张 inode 表。

mod read;
mod table;

pub use read::*;
pub use table::*;
