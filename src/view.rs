//! Growable views over memory-mapped files
//!
//! 基于内存映射文件的可增长视图
//!
//! Provides:
//! - [`MappedView`]: Typed read/write view that remaps its window on demand
//! - [`BackingStore`]: Owner of the physical file, with [`MappedFile`] as the default implementation
//! - [`Window`]: A single mapped byte range, copied in and out through bounds-checked calls
//! - [`layout`]: Process-wide byte-size cache for fixed-layout [`Record`] types
//!
//! 提供：
//! - [`MappedView`]: 按需重新映射窗口的类型化读写视图
//! - [`BackingStore`]: 物理文件的拥有者，默认实现为 [`MappedFile`]
//! - [`Window`]: 单个映射字节范围，通过带边界检查的调用拷入拷出
//! - [`layout`]: 固定布局 [`Record`] 类型的进程级字节大小缓存
//!
//! # Growth
//!
//! A view starts unmapped. When a request does not fit the current window, the
//! view extends the file through its store, releases the old window and maps
//! `[offset, offset + size)` where `size` is the request end rounded up to
//! [`GRANULARITY`]. Requests inside the current window never remap.
//!
//! # 增长
//!
//! 视图初始未映射。当请求超出当前窗口时，视图先通过存储扩展文件，
//! 释放旧窗口，再映射 `[offset, offset + size)`，其中 `size` 为请求结束位置
//! 向上对齐到 [`GRANULARITY`] 的值。当前窗口内的请求不会重新映射。
//!
//! ```
//! # use mmap_view::{MappedFile, MappedView, Result};
//! # use std::sync::Arc;
//! # use tempfile::tempdir;
//! # fn main() -> Result<()> {
//! # let dir = tempdir()?;
//! # let path = dir.path().join("growth.bin");
//! let view = MappedView::new(Arc::new(MappedFile::create(&path)?), 0, None);
//!
//! view.write_bytes(0, b"header")?;
//! let generation = view.generation();
//!
//! // Still inside the first 1024 bytes: no remap
//! // 仍在前 1024 字节内：不会重新映射
//! view.write_bytes(512, b"body")?;
//! assert_eq!(view.generation(), generation);
//! # Ok(())
//! # }
//! ```

mod error;
mod growth;
pub mod layout;
mod mapped_view;
mod options;
mod store;
mod window;


// Re-export public API
// 重新导出公共 API
pub use error::{Error, Result};
pub use growth::GRANULARITY;
pub use layout::Record;
pub use mapped_view::MappedView;
pub use options::{ViewBuilder, ViewOptions};
pub use store::{BackingStore, MappedFile};
pub use window::Window;
