//! 定长小端整数的定位读取
//!
//! 镜像上的所有整数字段都是小端序。这里把“在某偏移读 N 字节并组合成
//! 无符号整数”集中到一处，上层只看到已经规范化的整数。

use super::{BlockDev, BlockDevice};
use crate::error::{Error, ErrorKind, Result};
use byteorder::{ByteOrder, LittleEndian};

impl<D: BlockDevice> BlockDev<D> {
    /// 在 `offset` 处读取 `byte_count` 字节的小端无符号整数
    ///
    /// # 参数
    ///
    /// * `offset` - 字节偏移量
    /// * `byte_count` - 字段宽度（1..=8）
    ///
    /// # 错误
    ///
    /// 宽度非法时返回 `InvalidInput`；读取不足时返回 `Read`
    pub fn read_uint(&mut self, offset: u64, byte_count: usize) -> Result<u64> {
        if byte_count == 0 || byte_count > 8 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Integer width must be between 1 and 8 bytes",
            ));
        }

        let mut buf = [0u8; 8];
        self.read_bytes(offset, &mut buf[..byte_count])?;
        Ok(LittleEndian::read_uint(&buf[..byte_count], byte_count))
    }

    /// 读取 1 字节
    pub fn read_u8(&mut self, offset: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// 读取 2 字节小端整数
    pub fn read_u16(&mut self, offset: u64) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_bytes(offset, &mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    /// 读取 4 字节小端整数
    pub fn read_u32(&mut self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(offset, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// 由两个 32 位字段组合出 64 位整数
    ///
    /// `lo_offset` 处为低 32 位，`hi_offset` 处为高 32 位
    pub fn read_u64_split(&mut self, lo_offset: u64, hi_offset: u64) -> Result<u64> {
        let lo = self.read_u32(lo_offset)? as u64;
        let hi = self.read_u32(hi_offset)? as u64;
        Ok((hi << 32) | lo)
    }
}

/// 从已读入的记录切片中解码字段
///
/// 记录（superblock、块组描述符、inode、目录项）先整体读入一个
/// 按需分配的缓冲区，再按字段偏移取值。越界访问返回 `Format` 错误。
pub(crate) struct RecordReader<'a> {
    buf: &'a [u8],
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn field(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.buf
            .get(offset..offset + len)
            .ok_or(Error::format("Field lies outside the on-disk record"))
    }

    pub(crate) fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.field(offset, 1)?[0])
    }

    pub(crate) fn u16(&self, offset: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.field(offset, 2)?))
    }

    pub(crate) fn u32(&self, offset: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.field(offset, 4)?))
    }

    pub(crate) fn i32(&self, offset: usize) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.field(offset, 4)?))
    }

    pub(crate) fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.field(offset, len)
    }
}
