//! View configuration and builder
//!
//! 视图配置与构建器

use super::error::{Error, Result};
use super::mapped_view::MappedView;
use super::store::BackingStore;
use std::num::NonZeroU64;
use std::sync::Arc;

/// Placement and limits of a view inside its backing file
///
/// 视图在后备文件中的位置与限制
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewOptions {
    /// Absolute file offset where the view's address space begins
    ///
    /// 视图地址空间在文件中的起始绝对偏移
    pub offset: u64,

    /// Hard ceiling on the mapped size, `None` for unbounded
    ///
    /// 映射大小的硬上限，`None` 表示无限制
    pub capacity: Option<NonZeroU64>,
}

/// Builder for [`MappedView`]
///
/// [`MappedView`] 的构建器
///
/// # Examples
///
/// ```
/// # use mmap_view::{MappedFile, MappedView, Result};
/// # use std::sync::Arc;
/// # use tempfile::tempdir;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// # let path = dir.path().join("builder.bin");
/// let store = Arc::new(MappedFile::create(&path)?);
///
/// let view = MappedView::builder()
///     .store(store)
///     .offset(4096)
///     .capacity(8192)
///     .build()?;
///
/// assert_eq!(view.offset(), 4096);
/// assert_eq!(view.capacity().map(|c| c.get()), Some(8192));
/// # Ok(())
/// # }
/// ```
pub struct ViewBuilder<S> {
    store: Option<Arc<S>>,
    options: ViewOptions,
}

impl<S: BackingStore> ViewBuilder<S> {
    /// Create a builder with no store, offset 0 and no capacity limit
    ///
    /// 创建无存储、偏移为 0 且无容量限制的构建器
    pub fn new() -> Self {
        Self {
            store: None,
            options: ViewOptions::default(),
        }
    }

    /// Set the backing store
    ///
    /// 设置后备存储
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the absolute file offset
    ///
    /// 设置文件绝对偏移
    pub fn offset(mut self, offset: u64) -> Self {
        self.options.offset = offset;
        self
    }

    /// Set the capacity in bytes, 0 means unbounded
    ///
    /// 设置容量（字节），0 表示无限制
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.options.capacity = NonZeroU64::new(capacity);
        self
    }

    /// Replace offset and capacity at once
    ///
    /// 一次性替换偏移和容量
    pub fn options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the view
    ///
    /// 构建视图
    ///
    /// # Errors
    /// Returns `MissingBackingStore` if no store was set
    ///
    /// # Errors
    /// 如果未设置后备存储，返回 `MissingBackingStore`
    pub fn build(self) -> Result<MappedView<S>> {
        let store = self.store.ok_or(Error::MissingBackingStore)?;
        Ok(MappedView::new(
            store,
            self.options.offset,
            self.options.capacity,
        ))
    }
}

impl<S: BackingStore> Default for ViewBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
