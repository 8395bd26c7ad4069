//! 目录操作模块
//!
//! 这个模块解析目录 inode 直接块中的变长目录项。

mod entry;

pub use entry::{parse_dir_block, read_dir_entries, walk_directories, DirEntryRecord};
