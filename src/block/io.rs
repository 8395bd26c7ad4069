//! 块 I/O 操作实现

use super::{BlockDev, BlockDevice};
use crate::error::{Error, ErrorKind, Result};
use alloc::vec;

impl<D: BlockDevice> BlockDev<D> {
    /// 读取单个逻辑块
    ///
    /// 从指定逻辑块地址读取一个完整的块到缓冲区。
    /// 如果启用了缓存，优先从缓存读取；缓存未命中则从设备读取并填充缓存。
    ///
    /// # 参数
    ///
    /// * `lba` - 逻辑块地址
    /// * `buf` - 目标缓冲区（大小至少为 block_size）
    ///
    /// # 返回
    ///
    /// 成功返回读取的字节数
    pub fn read_block(&mut self, lba: u64, buf: &mut [u8]) -> Result<usize> {
        let block_size = self.block_size() as usize;

        if buf.len() < block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "buffer too small for block",
            ));
        }

        self.inc_read_count();

        if let Some(cache) = &mut self.bcache {
            if let Some(data) = cache.get(lba) {
                buf[..block_size].copy_from_slice(data);
                return Ok(block_size);
            }
        }

        self.read_block_from_device(lba, buf)?;

        // 将数据填充到缓存
        if let Some(cache) = &mut self.bcache {
            cache.insert(lba, &buf[..block_size]);
        }

        Ok(block_size)
    }

    /// 读取字节
    ///
    /// 从任意字节偏移读取，自动处理跨块情况。
    ///
    /// # 参数
    ///
    /// * `offset` - 字节偏移量（相对于分区起始）
    /// * `buf` - 目标缓冲区
    ///
    /// # 返回
    ///
    /// 成功返回读取的字节数
    ///
    /// # 示例
    ///
    /// ```rust,ignore
    /// let mut buf = vec![0u8; 1024];
    /// block_dev.read_bytes(1024, &mut buf)?; // superblock
    /// ```
    pub fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len();
        if len == 0 {
            return Ok(0);
        }

        let block_size = self.block_size() as u64;

        // 计算起始块和块内偏移
        let start_block = offset / block_size;
        let block_offset = (offset % block_size) as usize;

        // 计算需要读取的块数
        let total_size = block_offset as u64 + len as u64;
        let block_count = total_size.div_ceil(block_size) as usize;

        let mut temp = vec![0u8; block_count * block_size as usize];

        for (i, chunk) in temp.chunks_exact_mut(block_size as usize).enumerate() {
            self.read_block(start_block + i as u64, chunk)?;
        }

        // 复制所需字节
        buf.copy_from_slice(&temp[block_offset..block_offset + len]);

        Ok(len)
    }
}
