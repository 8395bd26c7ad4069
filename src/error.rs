//! 错误类型定义
//!
//! 提供 ext2 元数据解析的错误类型。

use core::fmt;

/// ext2 解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 读取失败或读取不足（镜像被截断或不可访问）
    Read,
    /// 磁盘格式错误（魔数不符、除数为零、目录项越界、间接块层级超限等）
    Format,
    /// 内部表分配失败
    Allocation,
    /// 无效参数
    InvalidInput,
    /// 输出端写入失败
    Sink,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// 读取错误
    pub const fn read(message: &'static str) -> Self {
        Self::new(ErrorKind::Read, message)
    }

    /// 格式错误
    pub const fn format(message: &'static str) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::new(ErrorKind::Sink, "Failed to write record to sink")
    }
}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Error::new(ErrorKind::Allocation, "Failed to reserve memory for table")
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
