//! 基于 `std::fs::File` 的镜像设备（需要 `std` 特性）

use super::BlockDevice;
use crate::consts::{EXT2_DEFAULT_SECTOR_SIZE, EXT2_MIN_BLOCK_SIZE};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// 只读镜像文件设备
///
/// 以 1024 字节为逻辑块、512 字节为扇区。镜像长度不是块大小整数倍时，
/// 最后一个不完整的块仍计入 `total_blocks`，读取它会得到不足的字节数，
/// 由 `BlockDev` 报告为读取错误。
pub struct FileDevice {
    file: File,
    len: u64,
}

impl FileDevice {
    /// 以只读方式打开镜像文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(|_| Error::read("Failed to open image file"))?;
        Self::from_file(file)
    }

    /// 包装一个已打开的文件
    pub fn from_file(file: File) -> Result<Self> {
        let len = file
            .metadata()
            .map_err(|_| Error::read("Failed to query image size"))?
            .len();
        Ok(Self { file, len })
    }

    /// 镜像长度（字节）
    pub fn len(&self) -> u64 {
        self.len
    }

    /// 镜像是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BlockDevice for FileDevice {
    fn block_size(&self) -> u32 {
        EXT2_MIN_BLOCK_SIZE
    }

    fn sector_size(&self) -> u32 {
        EXT2_DEFAULT_SECTOR_SIZE
    }

    /// 向上取整：不足 1024 字节的尾部也算一块，但该块不可完整读取
    fn total_blocks(&self) -> u64 {
        self.len.div_ceil(EXT2_MIN_BLOCK_SIZE as u64)
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let want = count as usize * EXT2_DEFAULT_SECTOR_SIZE as usize;
        let offset = lba * EXT2_DEFAULT_SECTOR_SIZE as u64;

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|_| Error::read("Failed to seek image file"))?;

        let mut filled = 0;
        while filled < want {
            match self.file.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(_) => return Err(Error::read("Failed to read image file")),
            }
        }

        Ok(filled)
    }
}
