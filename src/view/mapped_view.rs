//! Growable typed view over a region of a backing file
//!
//! 后备文件区域上的可增长类型化视图

use super::error::{Error, Result};
use super::growth::{self, Plan};
use super::layout::{self, Record};
use super::options::{ViewBuilder, ViewOptions};
use super::store::BackingStore;
use super::window::Window;
use parking_lot::Mutex;
use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Mutable window state, guarded by the view's lock
///
/// 可变的窗口状态，由视图锁保护
#[derive(Debug, Default)]
struct State {
    /// Bytes currently mapped from `offset`, 0 when unmapped
    ///
    /// 从 `offset` 起当前映射的字节数，未映射时为 0
    size: u64,

    window: Option<Window>,

    /// Number of window replacements so far
    ///
    /// 迄今为止窗口替换的次数
    generation: u64,

    disposed: bool,
}

/// Growable typed read/write view over a memory-mapped file
///
/// 内存映射文件上的可增长类型化读写视图
///
/// A view addresses the bytes of its backing file starting at a fixed `offset`.
/// Every operation takes a `position` relative to that offset; the view maps
/// enough of the file to cover the request, rounding the window size up to
/// [`GRANULARITY`](super::GRANULARITY) bytes, and then copies the value in or out.
///
/// 视图从固定的 `offset` 开始访问后备文件。每个操作接收相对于该偏移的
/// `position`；视图会映射足以覆盖请求的文件区域（窗口大小向上对齐到
/// [`GRANULARITY`](super::GRANULARITY) 字节），然后拷入或拷出数据。
///
/// # Concurrency
///
/// Each operation holds the view's lock from window growth through the copy, so a
/// view can be shared between threads. Views over the same store never alias: the
/// store refuses a window that overlaps one another view currently maps, and the
/// operation fails with [`Error::RangeInUse`]. A view whose growth is refused is
/// left unmapped and can retry once the other view is released.
///
/// # 并发
///
/// 每个操作从窗口增长到拷贝完成都持有视图锁，因此视图可以在线程间共享。
/// 同一存储上的视图永不别名：存储会拒绝与其他视图当前映射范围重叠的窗口，
/// 操作以 [`Error::RangeInUse`] 失败。增长被拒绝的视图处于未映射状态，
/// 待其他视图释放后可以重试。
///
/// # Examples
///
/// ```
/// # use mmap_view::{MappedFile, MappedView, Result};
/// # use std::sync::Arc;
/// # use tempfile::tempdir;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("view.bin");
/// let store = Arc::new(MappedFile::create(&path)?);
/// let view = MappedView::new(store, 0, None);
///
/// view.write_i32(0, 42)?;
/// assert_eq!(view.read_i32(0)?, 42);
/// assert_eq!(view.size(), 1024);
///
/// view.write_i64(2000, 123_456_789)?;
/// assert_eq!(view.size(), 2048);
/// # Ok(())
/// # }
/// ```
pub struct MappedView<S: BackingStore> {
    store: Arc<S>,
    offset: u64,
    capacity: Option<NonZeroU64>,
    state: Mutex<State>,
}

impl<S: BackingStore> MappedView<S> {
    /// Create an unmapped view at `offset` of `store`
    ///
    /// 在 `store` 的 `offset` 处创建未映射的视图
    ///
    /// No file access happens until the first operation.
    ///
    /// 在第一次操作之前不会访问文件。
    pub fn new(store: Arc<S>, offset: u64, capacity: Option<NonZeroU64>) -> Self {
        Self {
            store,
            offset,
            capacity,
            state: Mutex::new(State::default()),
        }
    }

    /// Create a view from [`ViewOptions`]
    ///
    /// 从 [`ViewOptions`] 创建视图
    pub fn with_options(store: Arc<S>, options: ViewOptions) -> Self {
        Self::new(store, options.offset, options.capacity)
    }

    /// Start building a view
    ///
    /// 开始构建视图
    pub fn builder() -> ViewBuilder<S> {
        ViewBuilder::new()
    }

    /// Absolute file offset that position 0 refers to
    ///
    /// 位置 0 对应的绝对文件偏移
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Hard ceiling on the window size, `None` when unbounded
    ///
    /// 窗口大小的硬上限，无上限时为 `None`
    #[inline]
    pub fn capacity(&self) -> Option<NonZeroU64> {
        self.capacity
    }

    /// Backing store shared with other views
    ///
    /// 与其他视图共享的后备存储
    #[inline]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Bytes currently mapped
    ///
    /// 当前映射的字节数
    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    /// Number of times the window has been replaced
    ///
    /// 窗口被替换的次数
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Whether [`dispose`](Self::dispose) has been called
    ///
    /// 是否已调用 [`dispose`](Self::dispose)
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Make sure `[position, position + len)` is mapped
    ///
    /// 确保 `[position, position + len)` 已被映射
    pub fn ensure(&self, position: u64, len: u64) -> Result<()> {
        self.with_window(position, len, |_| Ok(()))
    }

    /// Run `f` against a window covering `[position, position + len)`
    ///
    /// 在覆盖 `[position, position + len)` 的窗口上执行 `f`
    ///
    /// The view lock is held for the whole call.
    ///
    /// 整个调用期间持有视图锁。
    fn with_window<R>(
        &self,
        position: u64,
        len: u64,
        f: impl FnOnce(&mut Window) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.state.lock();
        if state.disposed {
            return Err(Error::Disposed);
        }

        let window = self.ensure_locked(&mut *state, position, len)?;
        f(window)
    }

    fn ensure_locked<'a>(
        &self,
        state: &'a mut State,
        position: u64,
        len: u64,
    ) -> Result<&'a mut Window> {
        let new_size = match growth::plan(position, len, state.size, self.capacity)? {
            Plan::Sufficient => {
                trace!(position, len, size = state.size, "window sufficient");
                // A non-zero size always has a window
                return state.window.as_mut().ok_or(Error::OutOfBounds {
                    position,
                    len,
                    window_size: 0,
                });
            }
            Plan::Grow { new_size } => new_size,
        };

        let file_end = self
            .offset
            .checked_add(new_size)
            .ok_or(Error::OutOfBounds {
                position,
                len,
                window_size: state.size,
            })?;

        // Extend before touching the current window so a failure leaves it intact
        self.store.ensure_len(file_end)?;

        // Only one window may be mapped at a time; dropping it also frees its claim
        drop(state.window.take());
        let old_size = std::mem::take(&mut state.size);

        match self.store.map_window(self.offset, new_size) {
            Ok(window) => {
                state.size = new_size;
                state.generation += 1;
                debug!(
                    offset = self.offset,
                    from = old_size,
                    to = new_size,
                    generation = state.generation,
                    "remapped view window"
                );
                Ok(state.window.insert(window))
            }
            Err(err) => {
                warn!(
                    offset = self.offset,
                    size = new_size,
                    error = %err,
                    "failed to map view window, view is now unmapped"
                );
                Err(err)
            }
        }
    }

    /// Read a little-endian `i32`
    ///
    /// 读取小端 `i32`
    pub fn read_i32(&self, position: u64) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_into(position, &mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Write a little-endian `i32`
    ///
    /// 写入小端 `i32`
    pub fn write_i32(&self, position: u64, value: i32) -> Result<()> {
        self.write_bytes(position, &value.to_le_bytes())
    }

    /// Read a little-endian `i64`
    ///
    /// 读取小端 `i64`
    pub fn read_i64(&self, position: u64) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_into(position, &mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Write a little-endian `i64`
    ///
    /// 写入小端 `i64`
    pub fn write_i64(&self, position: u64, value: i64) -> Result<()> {
        self.write_bytes(position, &value.to_le_bytes())
    }

    /// Read one fixed-layout record
    ///
    /// 读取一条固定布局记录
    ///
    /// # Examples
    ///
    /// ```
    /// # use mmap_view::{MappedFile, MappedView, Result};
    /// # use bytemuck::{Pod, Zeroable};
    /// # use std::sync::Arc;
    /// # use tempfile::tempdir;
    /// # fn main() -> Result<()> {
    /// # let dir = tempdir()?;
    /// # let path = dir.path().join("record.bin");
    /// #[repr(C)]
    /// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    /// struct Point {
    ///     x: f64,
    ///     y: f64,
    /// }
    ///
    /// let view = MappedView::new(Arc::new(MappedFile::create(&path)?), 0, None);
    /// view.write_record(64, &Point { x: 1.5, y: -2.0 })?;
    /// assert_eq!(view.read_record::<Point>(64)?, Point { x: 1.5, y: -2.0 });
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_record<T: Record>(&self, position: u64) -> Result<T> {
        let mut value = T::zeroed();
        let bytes = bytemuck::bytes_of_mut(&mut value);
        self.with_window(position, layout::size_of::<T>() as u64, |window| {
            window.copy_out(position, bytes)
        })?;
        Ok(value)
    }

    /// Write one fixed-layout record
    ///
    /// 写入一条固定布局记录
    pub fn write_record<T: Record>(&self, position: u64, value: &T) -> Result<()> {
        let bytes = bytemuck::bytes_of(value);
        self.with_window(position, layout::size_of::<T>() as u64, |window| {
            window.copy_in(position, bytes)
        })
    }

    /// Read `count` records into `buf[index..index + count]`
    ///
    /// 读取 `count` 条记录到 `buf[index..index + count]`
    ///
    /// # Errors
    /// Returns `BufferTooSmall` if `index + count` exceeds `buf.len()`
    ///
    /// # Errors
    /// 如果 `index + count` 超过 `buf.len()`，返回 `BufferTooSmall`
    pub fn read_records<T: Record>(
        &self,
        position: u64,
        buf: &mut [T],
        index: usize,
        count: usize,
    ) -> Result<()> {
        let (span, byte_len) = record_span::<T>(buf.len(), index, count)?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut buf[span]);
        self.with_window(position, byte_len, |window| window.copy_out(position, bytes))
    }

    /// Write `buf[index..index + count]` as consecutive records
    ///
    /// 将 `buf[index..index + count]` 作为连续记录写入
    ///
    /// # Errors
    /// Returns `BufferTooSmall` if `index + count` exceeds `buf.len()`
    ///
    /// # Errors
    /// 如果 `index + count` 超过 `buf.len()`，返回 `BufferTooSmall`
    pub fn write_records<T: Record>(
        &self,
        position: u64,
        buf: &[T],
        index: usize,
        count: usize,
    ) -> Result<()> {
        let (span, byte_len) = record_span::<T>(buf.len(), index, count)?;
        let bytes: &[u8] = bytemuck::cast_slice(&buf[span]);
        self.with_window(position, byte_len, |window| window.copy_in(position, bytes))
    }

    /// Read `len` raw bytes into a new Vec
    ///
    /// 读取 `len` 个原始字节到新的 Vec
    pub fn read_bytes(&self, position: u64, len: usize) -> Result<Vec<u8>> {
        self.with_window(position, len as u64, |window| {
            window.read_vec(position, len)
        })
    }

    /// Fill `buf` with the bytes at `position`
    ///
    /// 用 `position` 处的字节填充 `buf`
    pub fn read_into(&self, position: u64, buf: &mut [u8]) -> Result<()> {
        self.with_window(position, buf.len() as u64, |window| {
            window.copy_out(position, buf)
        })
    }

    /// Write raw bytes at `position`
    ///
    /// 在 `position` 处写入原始字节
    pub fn write_bytes(&self, position: u64, data: &[u8]) -> Result<()> {
        self.with_window(position, data.len() as u64, |window| {
            window.copy_in(position, data)
        })
    }

    /// Flush the active window asynchronously
    ///
    /// 异步刷新当前窗口
    pub fn flush(&self) -> Result<()> {
        let state = self.state.lock();
        if state.disposed {
            return Err(Error::Disposed);
        }
        match &state.window {
            Some(window) => window.flush(),
            None => Ok(()),
        }
    }

    /// Flush the active window and wait for completion
    ///
    /// 同步刷新当前窗口
    pub fn sync(&self) -> Result<()> {
        let state = self.state.lock();
        if state.disposed {
            return Err(Error::Disposed);
        }
        match &state.window {
            Some(window) => window.sync(),
            None => Ok(()),
        }
    }

    /// Release the window; later operations fail with `Disposed`
    ///
    /// 释放窗口；之后的操作返回 `Disposed`
    ///
    /// Calling it more than once is a no-op.
    ///
    /// 多次调用不会产生额外效果。
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }

        drop(state.window.take());
        state.size = 0;
        state.disposed = true;
        debug!(offset = self.offset, "disposed view");
    }
}

/// Element range `index..index + count` of a buffer and its length in bytes
///
/// 缓冲区中的元素范围 `index..index + count` 及其字节长度
fn record_span<T: Record>(
    buffer_len: usize,
    index: usize,
    count: usize,
) -> Result<(Range<usize>, u64)> {
    let too_small = || Error::BufferTooSmall {
        buffer_len,
        index,
        count,
    };

    let end = index.checked_add(count).ok_or_else(too_small)?;
    if end > buffer_len {
        return Err(too_small());
    }

    // Bounded by the buffer itself, so this cannot overflow
    let byte_len = layout::size_of::<T>() * count;

    Ok((index..end, byte_len as u64))
}

impl<S: BackingStore> std::fmt::Debug for MappedView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MappedView")
            .field("offset", &self.offset)
            .field("capacity", &self.capacity)
            .field("size", &state.size)
            .field("generation", &state.generation)
            .field("disposed", &state.disposed)
            .finish()
    }
}
