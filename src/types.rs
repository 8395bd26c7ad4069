//! ext2 公共类型定义
//!
//! inode 模式位与文件类型分类。

use bitflags::bitflags;

bitflags! {
    /// Inode 模式位（文件类型 + 权限）
    ///
    /// 类型位按“全部位被设置”判断，因此 `SYMLINK` (0xA000) 同时包含
    /// `FILE` (0x8000) 的位，分类时必须先检查 `SYMLINK`。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InodeMode: u16 {
        /// 符号链接
        const SYMLINK     = 0xA000;
        /// 普通文件
        const FILE        = 0x8000;
        /// 目录
        const DIRECTORY   = 0x4000;

        /// Set-UID
        const SETUID      = 0x0800;
        /// Set-GID
        const SETGID      = 0x0400;
        /// Sticky
        const STICKY      = 0x0200;

        /// 所有者读
        const USER_READ   = 0x0100;
        /// 所有者写
        const USER_WRITE  = 0x0080;
        /// 所有者执行
        const USER_EXEC   = 0x0040;
        /// 组读
        const GROUP_READ  = 0x0020;
        /// 组写
        const GROUP_WRITE = 0x0010;
        /// 组执行
        const GROUP_EXEC  = 0x0008;
        /// 其他读
        const OTHER_READ  = 0x0004;
        /// 其他写
        const OTHER_WRITE = 0x0002;
        /// 其他执行
        const OTHER_EXEC  = 0x0001;
    }
}

impl InodeMode {
    /// 权限位掩码
    pub const PERM_MASK: u16 = 0x0FFF;

    /// 从磁盘上的原始 mode 创建（保留所有位）
    pub const fn from_raw(mode: u16) -> Self {
        Self::from_bits_retain(mode)
    }

    /// 权限部分
    pub fn permissions(&self) -> u16 {
        self.bits() & Self::PERM_MASK
    }
}

/// Inode 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InodeType {
    /// 未知类型
    #[default]
    Unknown,
    /// 普通文件
    RegularFile,
    /// 目录
    Directory,
    /// 符号链接
    Symlink,
}

impl InodeType {
    /// 从 mode 中提取 inode 类型
    ///
    /// 按 symlink → 普通文件 → 目录 的优先级匹配
    pub fn from_mode(mode: u16) -> Self {
        let mode = InodeMode::from_raw(mode);
        if mode.contains(InodeMode::SYMLINK) {
            InodeType::Symlink
        } else if mode.contains(InodeMode::FILE) {
            InodeType::RegularFile
        } else if mode.contains(InodeMode::DIRECTORY) {
            InodeType::Directory
        } else {
            InodeType::Unknown
        }
    }

    /// 报告中使用的单字符类型标记
    pub fn tag(&self) -> char {
        match self {
            InodeType::RegularFile => 'f',
            InodeType::Directory => 'd',
            InodeType::Symlink => 's',
            InodeType::Unknown => '?',
        }
    }
}
