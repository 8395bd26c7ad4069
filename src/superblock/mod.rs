//! Superblock 操作模块
//!
//! 这个模块提供 ext2 superblock 的读取和验证功能。

mod read;

pub use read::*;
