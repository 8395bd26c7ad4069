//! ext2 文件系统常量定义
//!
//! 这个模块包含了解析 ext2 元数据所需的常量，包括：
//! - 磁盘布局相关常量
//! - 各磁盘结构的字段偏移
//! - 文件类型位

//=============================================================================
// 基础常量
//=============================================================================

/// 默认物理块大小（扇区大小，512 字节）
pub const EXT2_DEFAULT_SECTOR_SIZE: u32 = 512;

/// 最小块大小（1024 字节），也是块大小/片段大小移位的基数
pub const EXT2_MIN_BLOCK_SIZE: u32 = 1024;

/// 允许的最大块大小指数（1024 << 6 = 64 KiB）
pub const EXT2_MAX_LOG_BLOCK_SIZE: u32 = 6;

/// 允许的最大片段大小指数绝对值
pub const EXT2_MAX_LOG_FRAG_SIZE: u32 = 16;

/// i_blocks 字段的计数单位（字节）
pub const EXT2_INODE_SECTOR_SIZE: u64 = 512;

//=============================================================================
// Superblock 相关
//=============================================================================

/// Superblock 在设备上的字节偏移
pub const EXT2_SUPERBLOCK_OFFSET: u64 = 1024;

/// Superblock 大小（字节）
pub const EXT2_SUPERBLOCK_SIZE: usize = 1024;

/// ext2 魔数 (0xEF53)
pub const EXT2_SUPERBLOCK_MAGIC: u16 = 0xEF53;

/// 修订版本 0（固定 128 字节 inode）
pub const EXT2_GOOD_OLD_REV: u32 = 0;

/// Superblock 字段偏移
pub(crate) mod sb {
    pub const INODES_COUNT: usize = 0;
    pub const BLOCKS_COUNT: usize = 4;
    pub const FREE_BLOCKS_COUNT: usize = 12;
    pub const FREE_INODES_COUNT: usize = 16;
    pub const FIRST_DATA_BLOCK: usize = 20;
    pub const LOG_BLOCK_SIZE: usize = 24;
    pub const LOG_FRAG_SIZE: usize = 28;
    pub const BLOCKS_PER_GROUP: usize = 32;
    pub const FRAGS_PER_GROUP: usize = 36;
    pub const INODES_PER_GROUP: usize = 40;
    pub const MAGIC: usize = 56;
    pub const REV_LEVEL: usize = 76;
    pub const FIRST_INO: usize = 84;
    pub const INODE_SIZE: usize = 88;
}

//=============================================================================
// 块组描述符相关
//=============================================================================

/// 块组描述符大小
pub const EXT2_GROUP_DESC_SIZE: usize = 32;

/// 块组描述符字段偏移
pub(crate) mod gd {
    pub const BLOCK_BITMAP: usize = 0;
    pub const INODE_BITMAP: usize = 4;
    pub const INODE_TABLE: usize = 8;
    pub const FREE_BLOCKS_COUNT: usize = 12;
    pub const FREE_INODES_COUNT: usize = 14;
    pub const USED_DIRS_COUNT: usize = 16;
}

//=============================================================================
// Inode 相关
//=============================================================================

/// Inode 中的块指针总数（15个）
/// - 12个直接块
/// - 1个一级间接块
/// - 1个二级间接块
/// - 1个三级间接块
pub const EXT2_INODE_BLOCKS: usize = 15;

/// 直接块指针数量
pub const EXT2_INODE_DIRECT_BLOCKS: usize = 12;

/// 一级间接块索引
pub const EXT2_INODE_INDIRECT_BLOCK: usize = 12;

/// 二级间接块索引
pub const EXT2_INODE_DOUBLE_INDIRECT_BLOCK: usize = 13;

/// 三级间接块索引
pub const EXT2_INODE_TRIPLE_INDIRECT_BLOCK: usize = 14;

/// 最大间接层级
pub const EXT2_MAX_INDIRECT_LEVEL: u32 = 3;

/// 旧版 inode 大小，也是解码所需的最小记录长度
pub const EXT2_GOOD_OLD_INODE_SIZE: usize = 128;

/// Inode 字段偏移
pub(crate) mod ino {
    pub const MODE: usize = 0;
    pub const UID: usize = 2;
    pub const SIZE_LO: usize = 4;
    pub const ATIME: usize = 8;
    pub const CTIME: usize = 12;
    pub const MTIME: usize = 16;
    pub const GID: usize = 24;
    pub const LINKS_COUNT: usize = 26;
    pub const BLOCKS: usize = 28;
    pub const BLOCK: usize = 40;
    pub const SIZE_HIGH: usize = 108;
}

//=============================================================================
// 目录项相关
//=============================================================================

/// 目录项头部长度（inode + rec_len + name_len + file_type）
pub const EXT2_DIR_ENTRY_HEADER_LEN: usize = 8;

/// 目录项字段偏移
pub(crate) mod de {
    pub const INODE: usize = 0;
    pub const REC_LEN: usize = 4;
    pub const NAME_LEN: usize = 6;
    pub const NAME: usize = 8;
}
