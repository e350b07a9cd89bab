//! Growable typed views over memory-mapped files
//!
//! 基于内存映射文件的可增长类型化视图
//!
//! This library is the lowest layer of a lightweight storage engine: a view
//! addresses a region of a memory-mapped file by position and value type, and
//! transparently maps enough of the file to satisfy each request.
//!
//! 本库是轻量级存储引擎的最底层：视图按位置和值类型访问内存映射文件的某个区域，
//! 并透明地映射足够的文件内容以满足每次请求。
//!
//! # Features
//!
//! - **On-demand growth**: Windows grow in 1024-byte steps, small writes do not remap
//! - **Typed access**: `i32`, `i64`, fixed-layout records, record arrays and raw bytes
//! - **Capacity limits**: Optional hard ceiling per view
//! - **Thread-safe views**: A per-view lock spans growth and copy
//! - **No leaked pointers**: Mapped memory is only reached through bounds-checked copies
//! - **No aliasing**: A store refuses windows that overlap another live window
//!
//! # 特性
//!
//! - **按需增长**：窗口以 1024 字节为步长增长，小写入不会重新映射
//! - **类型化访问**：`i32`、`i64`、固定布局记录、记录数组和原始字节
//! - **容量限制**：每个视图可选的硬上限
//! - **线程安全视图**：每个视图的锁覆盖增长和拷贝
//! - **不泄露指针**：映射内存只能通过带边界检查的拷贝访问
//! - **无别名**：存储拒绝与其他存活窗口重叠的窗口
//!
//! # Quick Start
//!
//! ```
//! use mmap_view::{MappedFile, MappedView, Result};
//! use std::sync::Arc;
//! # use tempfile::tempdir;
//! # fn main() -> Result<()> {
//! # let dir = tempdir()?;
//! # let path = dir.path().join("data.bin");
//!
//! // One store per file, any number of views into it
//! // 每个文件一个存储，可以有任意多个视图
//! let store = Arc::new(MappedFile::create(&path)?);
//! let header = MappedView::new(store.clone(), 0, std::num::NonZeroU64::new(1024));
//! let body = MappedView::new(store.clone(), 1024, None);
//!
//! header.write_i64(0, 0x5649_4557)?;
//! body.write_bytes(0, b"payload")?;
//!
//! assert_eq!(header.read_i64(0)?, 0x5649_4557);
//! assert_eq!(body.read_bytes(0, 7)?, b"payload");
//!
//! body.sync()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`MappedView`]: Growable typed view
//! - [`MappedFile`]: File-backed [`BackingStore`]
//! - [`ViewBuilder`] / [`ViewOptions`]: View configuration
//! - [`Record`]: Fixed-layout value types
//!
//! # 主要类型
//!
//! - [`MappedView`]: 可增长的类型化视图
//! - [`MappedFile`]: 基于文件的 [`BackingStore`]
//! - [`ViewBuilder`] / [`ViewOptions`]: 视图配置
//! - [`Record`]: 固定布局值类型

mod view;

pub use view::{
    layout, BackingStore, Error, MappedFile, MappedView, Record, Result, ViewBuilder,
    ViewOptions, Window, GRANULARITY,
};
