//! 只读块缓存（基于 lru crate）
//!
//! 位图扫描会对同一个位图块逐位访问，目录与间接块遍历也会反复读取
//! 相同的元数据块。缓存以逻辑块地址为键保存整块数据，满时由
//! `LruCache` 自动驱逐最久未使用的块。镜像只读，因此没有脏块与写回。

use alloc::vec::Vec;
use core::num::NonZeroUsize;
use lru::LruCache;

/// 默认缓存块数量
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// 缓存统计信息
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// 总访问次数
    pub total_accesses: u64,
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 驱逐次数
    pub evictions: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_accesses as f64
        }
    }
}

/// 块缓存
pub struct BlockCache {
    /// LRU缓存核心
    cache: LruCache<u64, Vec<u8>>,
    /// 块大小（字节）
    block_size: usize,
    /// 统计信息
    stats: CacheStats,
}

impl BlockCache {
    /// 创建新的块缓存
    ///
    /// # 参数
    ///
    /// * `capacity` - 缓存容量（块数量），为 0 时按 1 处理
    /// * `block_size` - 块大小（字节）
    pub fn new(capacity: usize, block_size: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            block_size,
            stats: CacheStats::default(),
        }
    }

    /// 查找缓存块
    ///
    /// 命中时该块被移到最近使用位置
    pub fn get(&mut self, lba: u64) -> Option<&[u8]> {
        self.stats.total_accesses += 1;
        match self.cache.get(&lba) {
            Some(data) => {
                self.stats.hits += 1;
                log::trace!("[CACHE] get LBA={:#x} HIT", lba);
                Some(data.as_slice())
            }
            None => {
                self.stats.misses += 1;
                log::trace!("[CACHE] get LBA={:#x} MISS", lba);
                None
            }
        }
    }

    /// 插入从设备读到的块数据
    ///
    /// `data` 超出块大小的部分被忽略
    pub fn insert(&mut self, lba: u64, data: &[u8]) {
        let len = data.len().min(self.block_size);
        if let Some((evicted, _)) = self.cache.push(lba, data[..len].to_vec()) {
            if evicted != lba {
                self.stats.evictions += 1;
                log::debug!("[CACHE] Evicted block LBA={:#x}", evicted);
            }
        }
    }

    /// 检查块是否在缓存中（不影响 LRU 顺序）
    pub fn contains(&self, lba: u64) -> bool {
        self.cache.contains(&lba)
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// 缓存容量（块数）
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// 已缓存的块数
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
