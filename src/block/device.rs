//! 块设备核心类型

use crate::cache::{BlockCache, CacheStats};
use crate::error::{Error, ErrorKind, Result};

/// 只读块设备接口
///
/// 实现此 trait 以提供底层镜像访问。镜像在整个解析过程中不会被修改，
/// 因此接口只包含读操作。
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_dump::{BlockDevice, Result};
///
/// struct MyDevice {
///     // ...
/// }
///
/// impl BlockDevice for MyDevice {
///     fn block_size(&self) -> u32 {
///         1024
///     }
///
///     fn sector_size(&self) -> u32 {
///         512
///     }
///
///     fn total_blocks(&self) -> u64 {
///         8192
///     }
///
///     fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
///         // 实现扇区读取
///         Ok(count as usize * self.sector_size() as usize)
///     }
/// }
/// ```
pub trait BlockDevice {
    /// 逻辑块大小
    fn block_size(&self) -> u32;

    /// 物理扇区大小（通常 512）
    fn sector_size(&self) -> u32;

    /// 总块数（以逻辑块为单位）
    fn total_blocks(&self) -> u64;

    /// 读取扇区
    ///
    /// # 参数
    ///
    /// * `lba` - 逻辑块地址（以扇区为单位）
    /// * `count` - 要读取的扇区数
    /// * `buf` - 目标缓冲区（大小至少为 count * sector_size）
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数，镜像末尾处可能少于请求的字节数
    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize>;
}

/// 块设备包装器
///
/// 为 ext2 解析提供块级与字节级的只读访问，包含统计信息和可选的块缓存。
/// 不包含内部锁；整个解析流程是单线程的。
pub struct BlockDev<D> {
    /// 底层设备
    device: D,
    /// 分区偏移（字节）
    partition_offset: u64,
    /// 分区大小（字节）
    partition_size: u64,
    /// 逻辑读取次数（包括缓存命中）
    read_count: u64,
    /// 物理读取次数（实际设备操作）
    physical_read_count: u64,
    /// 块缓存（可选）
    pub(super) bcache: Option<BlockCache>,
}

impl<D: BlockDevice> BlockDev<D> {
    /// 创建新的块设备包装器（无缓存）
    pub fn new(device: D) -> Result<Self> {
        let block_size = device.block_size();
        let sector_size = device.sector_size();

        if block_size == 0 || sector_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size and sector size must be nonzero",
            ));
        }

        // 验证块大小是扇区大小的整数倍
        if block_size % sector_size != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size must be a multiple of sector size",
            ));
        }

        let partition_size = device.total_blocks() * block_size as u64;

        Ok(Self {
            device,
            partition_offset: 0,
            partition_size,
            read_count: 0,
            physical_read_count: 0,
            bcache: None,
        })
    }

    /// 创建带缓存的块设备包装器
    ///
    /// # 参数
    ///
    /// * `device` - 底层块设备
    /// * `cache_blocks` - 缓存块数量，为 0 时不启用缓存
    pub fn new_with_cache(device: D, cache_blocks: usize) -> Result<Self> {
        let mut bd = Self::new(device)?;
        if cache_blocks > 0 {
            let block_size = bd.block_size() as usize;
            bd.bcache = Some(BlockCache::new(cache_blocks, block_size));
        }
        Ok(bd)
    }

    /// 获取底层设备的引用
    pub fn device(&self) -> &D {
        &self.device
    }

    /// 获取逻辑块大小
    pub fn block_size(&self) -> u32 {
        self.device.block_size()
    }

    /// 获取物理扇区大小
    pub fn sector_size(&self) -> u32 {
        self.device.sector_size()
    }

    /// 获取逻辑读取次数（包括缓存命中）
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取物理读取次数（实际设备操作）
    pub fn physical_read_count(&self) -> u64 {
        self.physical_read_count
    }

    /// 设置分区偏移
    ///
    /// 偏移必须按扇区对齐，且不能超出设备范围。分区大小为设备剩余部分。
    pub fn set_partition_offset(&mut self, offset: u64) -> Result<()> {
        let sector_size = self.device.sector_size() as u64;
        if offset % sector_size != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Partition offset must be sector aligned",
            ));
        }

        let device_size = self.device.total_blocks() * self.device.block_size() as u64;
        if offset > device_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Partition offset beyond end of device",
            ));
        }

        self.partition_offset = offset;
        self.partition_size = device_size - offset;
        Ok(())
    }

    /// 获取分区偏移
    pub fn partition_offset(&self) -> u64 {
        self.partition_offset
    }

    /// 获取分区大小
    pub fn partition_size(&self) -> u64 {
        self.partition_size
    }

    /// 获取缓存统计信息
    ///
    /// 如果启用了缓存，返回 Some(CacheStats)，否则返回 None
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.bcache.as_ref().map(|cache| cache.stats())
    }

    /// 检查是否启用了缓存
    pub fn has_cache(&self) -> bool {
        self.bcache.is_some()
    }

    // 内部辅助方法

    /// 将逻辑块地址转换为物理扇区地址
    pub(super) fn logical_to_physical(&self, lba: u64) -> u64 {
        let block_size = self.device.block_size() as u64;
        let sector_size = self.device.sector_size() as u64;
        (lba * block_size + self.partition_offset) / sector_size
    }

    /// 每个逻辑块包含的物理扇区数
    pub(super) fn sectors_per_block(&self) -> u32 {
        self.device.block_size() / self.device.sector_size()
    }

    /// 增加读计数
    pub(super) fn inc_read_count(&mut self) {
        self.read_count += 1;
    }

    /// 直接从设备读取一个逻辑块（绕过缓存）
    ///
    /// 超出分区范围或读到的字节数不足时返回 `ErrorKind::Read`
    pub(super) fn read_block_from_device(&mut self, lba: u64, buf: &mut [u8]) -> Result<()> {
        let block_size = self.device.block_size() as u64;

        let end = lba
            .checked_add(1)
            .and_then(|n| n.checked_mul(block_size))
            .ok_or(Error::read("Block address overflows device range"))?;
        if end > self.partition_size {
            return Err(Error::read("Read beyond end of image"));
        }

        let pba = self.logical_to_physical(lba);
        let count = self.sectors_per_block();

        self.physical_read_count += 1;
        let n = self
            .device
            .read_blocks(pba, count, &mut buf[..block_size as usize])?;
        if n < block_size as usize {
            log::warn!(
                "[BLOCK] short read at LBA={:#x}: {} of {} bytes",
                lba,
                n,
                block_size
            );
            return Err(Error::read("Short read from image (truncated?)"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockDevice;

    #[test]
    fn test_new_rejects_misaligned_block_size() {
        let mut device = MockDevice::new(1024, 4);
        device.sector_size = 384;
        assert_eq!(
            BlockDev::new(device).err().map(|e| e.kind()),
            Some(ErrorKind::InvalidInput)
        );
    }

    #[test]
    fn test_partition_offset() {
        let device = MockDevice::new(1024, 8);
        let mut bdev = BlockDev::new(device).unwrap();
        assert_eq!(bdev.partition_size(), 8192);

        bdev.set_partition_offset(2048).unwrap();
        assert_eq!(bdev.partition_offset(), 2048);
        assert_eq!(bdev.partition_size(), 6144);
        assert_eq!(bdev.logical_to_physical(1), (1024 + 2048) / 512);

        assert!(bdev.set_partition_offset(100).is_err());
        assert!(bdev.set_partition_offset(9216).is_err());
    }

    #[test]
    fn test_cache_disabled_with_zero_blocks() {
        let bdev = BlockDev::new_with_cache(MockDevice::new(1024, 4), 0).unwrap();
        assert!(!bdev.has_cache());
        assert!(bdev.cache_stats().is_none());
    }
}
