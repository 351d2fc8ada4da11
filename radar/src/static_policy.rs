use crate::math;
use crate::policy::{buffer_items, clamp_and_buffer};
use crate::{IndexPolicy, Measurements, Window};

/// Fixed-size windowing: every item is assumed to be `estimate_size` long.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticPolicy {
    earthquake_ratio: f64,
}

impl Default for StaticPolicy {
    fn default() -> Self {
        Self {
            earthquake_ratio: 0.5,
        }
    }
}

impl StaticPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scrolls shorter than `ratio * estimate_size` do not trigger an update. Defaults to `0.5`.
    pub fn with_earthquake_ratio(mut self, ratio: f64) -> Self {
        self.earthquake_ratio = ratio;
        self
    }

    pub fn earthquake_ratio(&self) -> f64 {
        self.earthquake_ratio
    }
}

impl IndexPolicy for StaticPolicy {
    fn compute_window(&mut self, m: &Measurements) -> Window {
        let total = m.total_items;
        let est = m.estimate_size;
        if total == 0 || est <= 0.0 {
            return Window::empty();
        }

        let max_index = total as i64 - 1;
        let middle = math::floor(m.visible_middle / est) as i64;
        // At least one item, so a zero-size viewport still renders something.
        let count = (math::ceil(m.viewport_size / est) as i64).clamp(1, total as i64);

        let first = middle - count / 2;
        let last = middle + (count + 1) / 2 - 1;
        let (first, last) =
            clamp_and_buffer(first, last, count, max_index, buffer_items(m.buffer_size));

        window_for(first, last + 1, total, est)
    }

    fn visible_range(&self, m: &Measurements) -> (usize, usize) {
        let total = m.total_items;
        let est = m.estimate_size;
        if total == 0 || est <= 0.0 {
            return (0, 0);
        }
        let first = (math::ceil(m.visible_start / est).max(0.0) as usize).min(total - 1);
        let last = (math::ceil(m.visible_end / est).max(0.0) as usize)
            .min(total)
            .saturating_sub(1);
        (first, last)
    }

    fn offset_for_index(&self, index: usize, estimate_size: f64) -> f64 {
        index as f64 * estimate_size + 1.0
    }

    fn did_earthquake(&self, distance: f64, estimate_size: f64) -> bool {
        distance > estimate_size * self.earthquake_ratio
    }

    fn total_size(&self, total_items: usize, estimate_size: f64) -> f64 {
        total_items as f64 * estimate_size
    }
}

fn window_for(start_index: usize, end_index: usize, total: usize, est: f64) -> Window {
    Window {
        start_index,
        end_index,
        total_before: start_index as f64 * est,
        total_after: total as f64 * est - end_index as f64 * est,
    }
}
