//! Mapped window over a byte range of the backing file
//!
//! 后备文件字节范围上的映射窗口

use super::error::{Error, Result};
use super::store::Claim;
use memmap2::{MmapMut, MmapOptions};
use std::fs::File;
use std::ptr;

/// A single mapped accessor over `[offset, offset + len)` of a file
///
/// 文件 `[offset, offset + len)` 范围上的单个映射访问器
///
/// Positions passed to the copy routines are relative to the start of the
/// window. The mapped memory never leaves this type: reads copy into caller
/// buffers or fresh `Vec`s, writes copy from caller slices.
///
/// 传给拷贝函数的位置相对于窗口起点。映射内存不会离开此类型：
/// 读取拷贝到调用者缓冲区或新的 `Vec`，写入从调用者切片拷贝。
///
/// Dropping the window unmaps it, then releases the range it claimed in its store.
///
/// 丢弃窗口即解除映射，随后释放其在存储中占用的范围。
pub struct Window {
    /// Mapped region
    ///
    /// 映射区域
    mmap: MmapMut,

    /// Absolute file offset of the first mapped byte
    ///
    /// 第一个映射字节在文件中的绝对偏移
    offset: u64,

    /// Range held in the store's registry; released after `mmap` is unmapped
    ///
    /// 在存储登记表中占用的范围；在 `mmap` 解除映射后释放
    claim: Option<Claim>,
}

impl Window {
    /// Map `[offset, offset + len)` of `file`
    ///
    /// 映射 `file` 的 `[offset, offset + len)`
    ///
    /// `offset` does not need to be page aligned.
    ///
    /// `offset` 不需要页对齐。
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - The file is at least `offset + len` bytes long and is not truncated while the window lives
    /// - No other mapping, in this or another process, writes the range while the window lives
    ///
    /// # Safety
    ///
    /// 调用者需要确保：
    /// - 文件长度至少为 `offset + len` 字节，且在窗口存活期间不会被截断
    /// - 窗口存活期间没有其他映射（本进程或其他进程）写入该范围
    pub unsafe fn map(file: &File, offset: u64, len: usize) -> Result<Self> {
        let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map_mut(file)? };

        Ok(Self {
            mmap,
            offset,
            claim: None,
        })
    }

    /// Attach the registry entry that keeps other windows off this range
    ///
    /// 附加登记项，防止其他窗口映射此范围
    #[inline]
    pub(crate) fn with_claim(mut self, claim: Claim) -> Self {
        self.claim = Some(claim);
        self
    }

    /// Absolute file offset of the window start
    ///
    /// 窗口起点的绝对文件偏移
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of mapped bytes
    ///
    /// 映射的字节数
    #[inline]
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Whether the window maps no bytes
    ///
    /// 窗口是否未映射任何字节
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Bounds-check `[position, position + len)` and return the start index
    ///
    /// 检查 `[position, position + len)` 的边界并返回起始索引
    #[inline]
    fn checked_start(&self, position: u64, len: usize) -> Result<usize> {
        let window_size = self.len();
        let out_of_bounds = || Error::OutOfBounds {
            position,
            len: len as u64,
            window_size,
        };

        let end = position.checked_add(len as u64).ok_or_else(out_of_bounds)?;
        if end > window_size {
            return Err(out_of_bounds());
        }

        Ok(position as usize)
    }

    /// Copy `dst.len()` bytes starting at `position` out of the window
    ///
    /// 从窗口的 `position` 处拷贝 `dst.len()` 字节
    pub fn copy_out(&self, position: u64, dst: &mut [u8]) -> Result<()> {
        let start = self.checked_start(position, dst.len())?;

        // SAFETY: `start + dst.len()` is within the mapping (checked above), `dst` is a
        // distinct caller-owned buffer so the regions cannot overlap, and the pointer
        // does not outlive this call.
        unsafe {
            let src = self.mmap.as_ptr().add(start);
            ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), dst.len());
        }

        Ok(())
    }

    /// Copy `src` into the window starting at `position`
    ///
    /// 将 `src` 拷贝到窗口的 `position` 处
    pub fn copy_in(&mut self, position: u64, src: &[u8]) -> Result<()> {
        let start = self.checked_start(position, src.len())?;

        // SAFETY: Same bounds argument as `copy_out`; `&mut self` guarantees no other
        // access to the mapping for the duration of the copy.
        unsafe {
            let dst = self.mmap.as_mut_ptr().add(start);
            ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
        }

        Ok(())
    }

    /// Read `len` bytes starting at `position` into a new Vec
    ///
    /// 读取 `position` 处的 `len` 字节到新的 Vec
    pub fn read_vec(&self, position: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.copy_out(position, &mut buf)?;
        Ok(buf)
    }

    /// Flush the window to disk asynchronously
    ///
    /// 异步刷新窗口到磁盘
    pub fn flush(&self) -> Result<()> {
        Ok(self.mmap.flush_async()?)
    }

    /// Flush the window to disk and wait for completion
    ///
    /// 同步刷新窗口到磁盘
    pub fn sync(&self) -> Result<()> {
        Ok(self.mmap.flush()?)
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("offset", &self.offset)
            .field("len", &self.mmap.len())
            .finish()
    }
}
