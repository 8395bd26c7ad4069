//! 文件系统高级 API
//!
//! 这个模块把各解析阶段串联起来，并持有解析期间共享的不可变上下文。

mod context;
mod filesystem;
mod types;

pub use context::FilesystemContext;
pub use filesystem::{dump, Ext2Dump};
pub use types::{DumpConfig, DumpSummary};
