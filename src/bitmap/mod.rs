//! 位图模块
//!
//! - [`ops`] - 位测试与计数
//! - [`scan_bitmaps`] - 按块组扫描块位图与 inode 位图

pub mod ops;
mod scan;

pub use scan::{scan_bitmaps, AllocationScan, BitmapEntry, BitmapKind, GroupUsage};
