//! 块组操作模块
//!
//! 这个模块计算块组数量并读取每个块组的描述符（位图/inode 表位置、空闲计数）。

mod read;

pub use read::*;
