//! Error types for mmap-view
//!
//! mmap-view 的错误类型

use std::io;
use thiserror::Error;

/// Error type for view operations
///
/// 视图操作的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    ///
    /// I/O 错误
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Builder finished without a backing store
    ///
    /// 构建时未提供后备存储
    #[error("View requires a backing store / 视图需要后备存储")]
    MissingBackingStore,

    /// Growth target exceeds the view's fixed capacity
    ///
    /// 增长目标超出视图的固定容量
    #[error(
        "Requested window size {requested} exceeds capacity {capacity} / 请求的窗口大小 {requested} 超出容量 {capacity}"
    )]
    CapacityExceeded { requested: u64, capacity: u64 },

    /// Access outside the mapped window
    ///
    /// 访问超出映射窗口
    #[error(
        "Access [{position}, {position} + {len}) is outside window of {window_size} bytes / 访问 [{position}, {position} + {len}) 超出 {window_size} 字节的窗口"
    )]
    OutOfBounds {
        position: u64,
        len: u64,
        window_size: u64,
    },

    /// Caller buffer too small for `index + count` elements
    ///
    /// 调用者缓冲区不足以容纳 `index + count` 个元素
    #[error(
        "Buffer of {buffer_len} elements cannot hold {count} elements from index {index} / 长度为 {buffer_len} 的缓冲区无法从索引 {index} 容纳 {count} 个元素"
    )]
    BufferTooSmall {
        buffer_len: usize,
        index: usize,
        count: usize,
    },

    /// Window requested beyond the current file length
    ///
    /// 请求的窗口超出当前文件长度
    #[error(
        "Window [{offset}, {offset} + {len}) exceeds file length {file_len} / 窗口 [{offset}, {offset} + {len}) 超出文件长度 {file_len}"
    )]
    WindowBeyondFile { offset: u64, len: u64, file_len: u64 },

    /// Window overlaps a range already mapped by another live window
    ///
    /// 窗口与另一个存活窗口已映射的范围重叠
    #[error(
        "Window [{offset}, {offset} + {len}) overlaps mapped range [{claimed_start}, {claimed_end}) / 窗口 [{offset}, {offset} + {len}) 与已映射范围 [{claimed_start}, {claimed_end}) 重叠"
    )]
    RangeInUse {
        offset: u64,
        len: u64,
        claimed_start: u64,
        claimed_end: u64,
    },

    /// Empty file cannot be mapped
    ///
    /// 空文件无法映射
    #[error("Cannot map empty file / 无法映射空文件")]
    EmptyFile,

    /// View used after release
    ///
    /// 视图释放后被使用
    #[error("View used after release / 视图释放后被使用")]
    Disposed,
}

/// Convert from Error to io::Error for compatibility
///
/// 从 Error 转换到 io::Error 以保持兼容性
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            Error::OutOfBounds { .. } | Error::WindowBeyondFile { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string())
            }
            Error::CapacityExceeded { .. } => {
                io::Error::new(io::ErrorKind::StorageFull, err.to_string())
            }
            Error::Disposed => io::Error::new(io::ErrorKind::NotConnected, err.to_string()),
            Error::RangeInUse { .. } => {
                io::Error::new(io::ErrorKind::ResourceBusy, err.to_string())
            }
            Error::MissingBackingStore | Error::BufferTooSmall { .. } | Error::EmptyFile => {
                io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
            }
        }
    }
}

/// Result type alias using our custom Error type
///
/// 使用自定义 Error 类型的 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;
