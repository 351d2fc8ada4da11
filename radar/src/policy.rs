use crate::Window;
use crate::math;

/// Inputs to an [`IndexPolicy`], derived from the geometry snapshot and scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurements {
    pub total_items: usize,
    pub estimate_size: f64,
    /// Extra items to render on each side of the visible ones. May be fractional.
    pub buffer_size: f64,
    pub viewport_size: f64,
    pub visible_start: f64,
    pub visible_middle: f64,
    pub visible_end: f64,
}

/// Decides which contiguous index range must be live.
///
/// Contract for `compute_window`:
/// - `total_items == 0` yields an empty window;
/// - otherwise `start_index < end_index <= total_items`, the window is slid (not shrunk) when
///   one edge would overflow, and both `total_*` sizes are non-negative.
pub trait IndexPolicy {
    fn compute_window(&mut self, m: &Measurements) -> Window;

    /// `(first_visible, last_visible)`, ignoring the buffer. Only meaningful for
    /// `total_items > 0`.
    fn visible_range(&self, m: &Measurements) -> (usize, usize);

    /// Scroll offset (relative to the collection) that brings `index` to the start.
    fn offset_for_index(&self, index: usize, estimate_size: f64) -> f64;

    /// Whether a scroll of `distance` is big enough to warrant an update.
    fn did_earthquake(&self, distance: f64, estimate_size: f64) -> bool;

    fn total_size(&self, total_items: usize, estimate_size: f64) -> f64;

    /// Called when `count` items were inserted before index 0. Returns the scroll compensation
    /// that keeps existing content in place.
    fn prepended(&mut self, count: usize, estimate_size: f64) -> f64 {
        count as f64 * estimate_size
    }

    /// Called when the whole collection was replaced.
    fn reset(&mut self) {}
}

/// Whole items to render on each side for a (possibly fractional) buffer size.
pub fn buffer_items(buffer_size: f64) -> usize {
    if buffer_size > 0.0 {
        math::ceil(buffer_size) as usize
    } else {
        0
    }
}

/// Slides `[first, last]` (both inclusive, `count` long) back inside `[0, max_index]`, then
/// grows it by `buffer` on each side.
pub(crate) fn clamp_and_buffer(
    mut first: i64,
    mut last: i64,
    count: i64,
    max_index: i64,
    buffer: usize,
) -> (usize, usize) {
    if first < 0 {
        first = 0;
        last = count - 1;
    }
    if last > max_index {
        last = max_index;
        first = max_index - (count - 1);
    }
    let buffer = buffer as i64;
    let first = (first - buffer).max(0);
    let last = (last + buffer).min(max_index);
    (first as usize, last as usize)
}
