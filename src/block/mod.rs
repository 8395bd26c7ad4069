//! 块设备抽象
//!
//! 提供只读块设备接口和块级 I/O 操作。
//! block/device.rs 定义设备 trait 与包装器 `BlockDev`（分区偏移、统计、缓存）
//! block/io.rs 提供经过缓存的块读取与任意偏移的字节读取
//! block/decode.rs 在字节读取之上解码定长小端整数

mod decode;
mod device;
mod io;

#[cfg(feature = "std")]
mod file;

pub(crate) use decode::RecordReader;
pub use device::{BlockDev, BlockDevice};

#[cfg(feature = "std")]
pub use file::FileDevice;
