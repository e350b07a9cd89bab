//! Window growth planning
//!
//! 窗口增长规划
//!
//! Window sizes are rounded up to [`GRANULARITY`] so that small sequential
//! accesses do not force a remap on every call.
//!
//! 窗口大小向上对齐到 [`GRANULARITY`]，使小的顺序访问不会每次都触发重新映射。

use super::error::{Error, Result};
use std::num::NonZeroU64;

/// Window growth granularity in bytes
///
/// 窗口增长粒度（字节）
pub const GRANULARITY: u64 = 1024;

/// Round `value` up to the next multiple of [`GRANULARITY`]
///
/// 将 `value` 向上对齐到 [`GRANULARITY`] 的倍数
///
/// Returns `None` on overflow.
///
/// 溢出时返回 `None`。
#[inline]
pub(crate) fn align_up(value: u64) -> Option<u64> {
    value
        .checked_add(GRANULARITY - 1)
        .map(|v| v & !(GRANULARITY - 1))
}

/// Outcome of planning a request against the current window
///
/// 针对当前窗口规划请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plan {
    /// The current window already covers the request
    ///
    /// 当前窗口已覆盖该请求
    Sufficient,

    /// The window must be remapped to `new_size` bytes
    ///
    /// 窗口需要重新映射为 `new_size` 字节
    Grow { new_size: u64 },
}

/// Decide whether `[position, position + len)` needs a larger window
///
/// 判断 `[position, position + len)` 是否需要更大的窗口
///
/// Planning is pure: nothing is mutated, so a rejected plan leaves the view as it was.
///
/// 规划是纯函数：不修改任何状态，因此被拒绝的规划不会改变视图。
///
/// # Errors
/// - `OutOfBounds` if `position + len` overflows
/// - `CapacityExceeded` if the rounded size is larger than `capacity`
///
/// # Errors
/// - 如果 `position + len` 溢出，返回 `OutOfBounds`
/// - 如果对齐后的大小超过 `capacity`，返回 `CapacityExceeded`
pub(crate) fn plan(
    position: u64,
    len: u64,
    current_size: u64,
    capacity: Option<NonZeroU64>,
) -> Result<Plan> {
    let overflow = || Error::OutOfBounds {
        position,
        len,
        window_size: current_size,
    };

    let end = position.checked_add(len).ok_or_else(overflow)?;

    if current_size > 0 && end <= current_size {
        return Ok(Plan::Sufficient);
    }

    let new_size = align_up(end).ok_or_else(overflow)?.max(GRANULARITY);

    if let Some(capacity) = capacity.filter(|c| new_size > c.get()) {
        return Err(Error::CapacityExceeded {
            requested: new_size,
            capacity: capacity.get(),
        });
    }

    Ok(Plan::Grow { new_size })
}
