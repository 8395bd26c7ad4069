//! 块缓存模块
//!
//! - [`BlockCache`] - 只读块缓存，使用 lru crate 提供 LRU 驱逐
//! - [`CacheStats`] - 缓存统计信息
//!
//! 缓存挂在 [`crate::block::BlockDev`] 上，由 `BlockDev::read_block`
//! 透明使用：命中直接返回，未命中从设备读取后填充缓存。

mod block_cache;

pub use block_cache::{BlockCache, CacheStats, DEFAULT_CACHE_SIZE};
