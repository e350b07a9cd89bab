//! Backing store for views
//!
//! 视图的后备存储

use super::error::{Error, Result};
use super::window::Window;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Owner of the physical file that views map windows from
///
/// 拥有物理文件、供视图映射窗口的后备存储
///
/// Implementations must make `ensure_len` idempotent and monotonic: a call with a
/// length not larger than the current file length is a no-op.
///
/// 实现必须保证 `ensure_len` 幂等且单调：长度不大于当前文件长度时不做任何操作。
pub trait BackingStore: Send + Sync {
    /// Make the file at least `min_len` bytes long
    ///
    /// 确保文件长度至少为 `min_len` 字节
    fn ensure_len(&self, min_len: u64) -> Result<()>;

    /// Map `[offset, offset + len)` of the file into a new window
    ///
    /// 将文件的 `[offset, offset + len)` 映射为新窗口
    ///
    /// Implementations must not hand out two live windows whose ranges overlap.
    ///
    /// 实现不得同时交出两个范围重叠的存活窗口。
    ///
    /// # Errors
    /// Returns `WindowBeyondFile` if the range is not inside the current file length,
    /// `RangeInUse` if a live window already maps part of it
    ///
    /// # Errors
    /// 如果范围不在当前文件长度内，返回 `WindowBeyondFile`；
    /// 如果已有存活窗口映射了其中一部分，返回 `RangeInUse`
    fn map_window(&self, offset: u64, len: u64) -> Result<Window>;

    /// Current file length in bytes
    ///
    /// 当前文件长度（字节）
    fn len(&self) -> u64;

    /// Whether the file has zero length
    ///
    /// 文件长度是否为 0
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Growable file backing store
///
/// 可增长的文件后备存储
///
/// Shared between views through `Arc`. The file length is guarded by a mutex so
/// that concurrent extensions from different views never shrink the file.
///
/// 通过 `Arc` 在视图间共享。文件长度由互斥锁保护，
/// 不同视图的并发扩展不会使文件缩小。
///
/// Every window handed out by `map_window` claims its byte range until it is
/// dropped; a second window over any of those bytes is refused with `RangeInUse`.
///
/// `map_window` 交出的每个窗口在被丢弃前都占用其字节范围；
/// 覆盖其中任何字节的第二个窗口会以 `RangeInUse` 被拒绝。
///
/// # Examples
///
/// ```
/// # use mmap_view::{BackingStore, MappedFile, Result};
/// # use tempfile::tempdir;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("store.bin");
/// let store = MappedFile::create(&path)?;
/// assert_eq!(store.len(), 0);
///
/// store.ensure_len(4096)?;
/// assert_eq!(store.len(), 4096);
///
/// // Shrinking requests are ignored
/// // 缩小请求会被忽略
/// store.ensure_len(100)?;
/// assert_eq!(store.len(), 4096);
/// # Ok(())
/// # }
/// ```
pub struct MappedFile {
    file: File,

    /// Current file length
    ///
    /// 当前文件长度
    len: Mutex<u64>,

    /// Ranges mapped by live windows, start -> end
    ///
    /// 存活窗口映射的范围，起点 -> 终点
    claims: Arc<Mutex<BTreeMap<u64, u64>>>,

    path: PathBuf,
}

impl MappedFile {
    /// Create a new, empty file
    ///
    /// 创建新的空文件
    ///
    /// If the file already exists, it will be truncated.
    ///
    /// 如果文件已存在会被截断。
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            len: Mutex::new(0),
            claims: Arc::default(),
            path: path.to_path_buf(),
        })
    }

    /// Open a file, creating it empty if missing
    ///
    /// 打开文件，不存在时创建空文件
    ///
    /// Existing contents are kept.
    ///
    /// 保留已有内容。
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            file,
            len: Mutex::new(len),
            claims: Arc::default(),
            path: path.to_path_buf(),
        })
    }

    /// Open an existing, non-empty file
    ///
    /// 打开已存在且非空的文件
    ///
    /// # Errors
    /// Returns `EmptyFile` if the file has zero length
    ///
    /// # Errors
    /// 如果文件长度为 0，返回 `EmptyFile`
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let len = match file.metadata()?.len() {
            0 => return Err(Error::EmptyFile),
            len => len,
        };

        Ok(Self {
            file,
            len: Mutex::new(len),
            claims: Arc::default(),
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing file
    ///
    /// 后备文件路径
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronize file data and metadata to disk
    ///
    /// 将文件数据和元数据同步到磁盘
    pub fn sync_all(&self) -> Result<()> {
        Ok(self.file.sync_all()?)
    }

    /// Number of live windows mapped from this file
    ///
    /// 从此文件映射的存活窗口数量
    #[inline]
    pub fn mapped_windows(&self) -> usize {
        self.claims.lock().len()
    }

    /// Register `[offset, end)` unless a live window already maps part of it
    ///
    /// 登记 `[offset, end)`，除非已有存活窗口映射了其中一部分
    fn claim(&self, offset: u64, end: u64) -> Result<Claim> {
        let mut claims = self.claims.lock();

        // Claimed ranges are disjoint, so the last one starting before `end`
        // has the largest end among all candidates.
        // 已登记范围互不相交，因此在 `end` 之前开始的最后一个范围拥有最大的终点。
        if let Some((&claimed_start, &claimed_end)) = claims
            .range(..end)
            .next_back()
            .filter(|&(_, &claimed_end)| claimed_end > offset)
        {
            return Err(Error::RangeInUse {
                offset,
                len: end - offset,
                claimed_start,
                claimed_end,
            });
        }

        claims.insert(offset, end);
        trace!(offset, end, "claimed window range");

        Ok(Claim {
            claims: Arc::clone(&self.claims),
            start: offset,
        })
    }
}

/// Registry entry for one live window, removed on drop
///
/// 单个存活窗口的登记项，丢弃时移除
pub(crate) struct Claim {
    claims: Arc<Mutex<BTreeMap<u64, u64>>>,
    start: u64,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.claims.lock().remove(&self.start);
    }
}

impl BackingStore for MappedFile {
    fn ensure_len(&self, min_len: u64) -> Result<()> {
        let mut len = self.len.lock();
        if min_len <= *len {
            return Ok(());
        }

        self.file.set_len(min_len)?;
        debug!(
            path = %self.path.display(),
            from = *len,
            to = min_len,
            "extended backing file"
        );
        *len = min_len;

        Ok(())
    }

    fn map_window(&self, offset: u64, len: u64) -> Result<Window> {
        let file_len = *self.len.lock();

        if len == 0 {
            return Err(Error::EmptyFile);
        }

        match offset.checked_add(len) {
            Some(end) if end <= file_len => {}
            _ => {
                return Err(Error::WindowBeyondFile {
                    offset,
                    len,
                    file_len,
                });
            }
        }

        let map_len = usize::try_from(len).map_err(|_| Error::WindowBeyondFile {
            offset,
            len,
            file_len,
        })?;

        let claim = self.claim(offset, offset + len)?;

        // SAFETY: The range lies inside the file (checked above) and the file only
        // ever grows through `ensure_len`, so the mapping stays backed. The claim
        // keeps every other window of this store off the range until this one is
        // unmapped, so no two mappings alias the same bytes.
        let window = unsafe { Window::map(&self.file, offset, map_len)? };

        Ok(window.with_claim(claim))
    }

    fn len(&self) -> u64 {
        *self.len.lock()
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &*self.len.lock())
            .field("mapped_windows", &self.mapped_windows())
            .finish()
    }
}
