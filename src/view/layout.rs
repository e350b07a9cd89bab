//! Fixed-layout record types and the process-wide layout size cache
//!
//! 固定布局记录类型与进程级布局大小缓存

use bytemuck::Pod;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

/// A value with a fixed, statically known byte layout
///
/// 具有固定、静态已知字节布局的值
///
/// Implemented for every [`bytemuck::Pod`] type. Derive `Pod` and `Zeroable` on a
/// `#[repr(C)]` struct to use it with the record accessors of
/// [`MappedView`](super::MappedView).
///
/// 为所有 [`bytemuck::Pod`] 类型实现。在 `#[repr(C)]` 结构体上派生 `Pod` 和
/// `Zeroable` 即可用于 [`MappedView`](super::MappedView) 的记录访问方法。
///
/// # Examples
///
/// ```
/// use bytemuck::{Pod, Zeroable};
/// use mmap_view::{layout, Record};
///
/// #[repr(C)]
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// struct Entry {
///     key: u64,
///     value: u32,
///     flags: u32,
/// }
///
/// assert_eq!(Entry::LAYOUT_SIZE, 16);
/// assert_eq!(layout::size_of::<Entry>(), 16);
/// ```
pub trait Record: Pod {
    /// Exact byte size of one record
    ///
    /// 单条记录的精确字节大小
    const LAYOUT_SIZE: usize = std::mem::size_of::<Self>();
}

impl<T: Pod> Record for T {}

static LAYOUT_SIZES: OnceCell<RwLock<HashMap<TypeId, usize>>> = OnceCell::new();

#[inline]
fn sizes() -> &'static RwLock<HashMap<TypeId, usize>> {
    LAYOUT_SIZES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Byte size of `T`, computed once per type and shared process-wide
///
/// `T` 的字节大小，每种类型只计算一次并在进程内共享
///
/// Concurrent first requests for the same type may both compute the size; the
/// first insert wins and every caller sees that value.
///
/// 同一类型的并发首次请求可能都会计算大小；第一次插入生效，所有调用者看到同一个值。
pub fn size_of<T: Record>() -> usize {
    let id = TypeId::of::<T>();

    if let Some(&size) = sizes().read().get(&id) {
        return size;
    }

    *sizes().write().entry(id).or_insert(T::LAYOUT_SIZE)
}

/// Number of types currently cached
///
/// 当前已缓存的类型数量
pub fn cached_len() -> usize {
    sizes().read().len()
}
