use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::policy::{buffer_items, clamp_and_buffer};
use crate::{IndexPolicy, Measurements, Window};

/// Variable-size windowing backed by measured item sizes.
///
/// Unmeasured items count as `estimate_size`. Hosts feed real sizes with
/// [`MeasuredPolicy::measure`] (usually from a `Radar::with_policy_mut` call after layout).
#[derive(Clone, Debug)]
pub struct MeasuredPolicy {
    sizes: Vec<f64>,
    measured: Vec<bool>,
    sums: Fenwick,
    estimate: f64,
    earthquake_ratio: f64,
}

impl Default for MeasuredPolicy {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            measured: Vec::new(),
            sums: Fenwick::default(),
            estimate: 0.0,
            earthquake_ratio: 0.5,
        }
    }
}

impl MeasuredPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_earthquake_ratio(mut self, ratio: f64) -> Self {
        self.earthquake_ratio = ratio;
        self
    }

    /// Records the real size of `index`. Returns the change against the previous size, or `0.0`
    /// when `index` is out of range.
    pub fn measure(&mut self, index: usize, size: f64) -> f64 {
        let Some(cur) = self.sizes.get(index).copied() else {
            rwarn!(index, len = self.sizes.len(), "MeasuredPolicy::measure: index out of range");
            return 0.0;
        };
        let size = if size > 0.0 { size } else { 0.0 };
        self.measured[index] = true;
        self.sizes[index] = size;
        let delta = size - cur;
        if delta != 0.0 {
            self.sums.add(index, delta);
        }
        delta
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    pub fn item_size(&self, index: usize) -> Option<f64> {
        self.sizes.get(index).copied()
    }

    pub fn item_start(&self, index: usize) -> Option<f64> {
        (index < self.sizes.len()).then(|| self.sums.prefix_sum(index))
    }

    /// Number of tracked items (the item count seen by the last window computation).
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn sync(&mut self, total: usize, estimate: f64) {
        if estimate != self.estimate {
            self.estimate = estimate;
            let mut changed = false;
            for (size, measured) in self.sizes.iter_mut().zip(&self.measured) {
                if !measured {
                    *size = estimate;
                    changed = true;
                }
            }
            if changed {
                self.sums = Fenwick::from_sizes(&self.sizes);
            }
        }

        let len = self.sizes.len();
        if total < len {
            self.sizes.truncate(total);
            self.measured.truncate(total);
            self.sums.truncate(total);
        } else {
            for _ in len..total {
                self.sizes.push(estimate);
                self.measured.push(false);
                self.sums.push(estimate);
            }
        }
    }

    fn index_at(&self, offset: f64) -> usize {
        let offset = if offset > 0.0 { offset } else { 0.0 };
        self.sums
            .lower_bound(offset)
            .min(self.sizes.len().saturating_sub(1))
    }
}

impl IndexPolicy for MeasuredPolicy {
    fn compute_window(&mut self, m: &Measurements) -> Window {
        let total = m.total_items;
        if total == 0 || m.estimate_size <= 0.0 {
            return Window::empty();
        }
        self.sync(total, m.estimate_size);

        let first = self.index_at(m.visible_start);
        let visible_end = if m.visible_end > m.visible_start {
            m.visible_end
        } else {
            m.visible_start
        };
        let last = self.index_at(visible_end);
        let count = (last - first + 1) as i64;
        let (first, last) = clamp_and_buffer(
            first as i64,
            last as i64,
            count,
            total as i64 - 1,
            buffer_items(m.buffer_size),
        );

        let end = last + 1;
        let total_size = self.sums.total();
        Window {
            start_index: first,
            end_index: end,
            total_before: self.sums.prefix_sum(first),
            total_after: total_size - self.sums.prefix_sum(end),
        }
    }

    fn visible_range(&self, m: &Measurements) -> (usize, usize) {
        let total = m.total_items.min(self.sizes.len());
        if total == 0 {
            return (0, 0);
        }
        let mut first = self.index_at(m.visible_start);
        if self.sums.prefix_sum(first) < m.visible_start {
            first = (first + 1).min(total - 1);
        }
        let last = self.index_at(m.visible_end).min(total - 1);
        (first, last)
    }

    fn offset_for_index(&self, index: usize, estimate_size: f64) -> f64 {
        let len = self.sizes.len();
        let known = self.sums.prefix_sum(index.min(len));
        let extra = index.saturating_sub(len) as f64 * estimate_size;
        known + extra + 1.0
    }

    fn did_earthquake(&self, distance: f64, estimate_size: f64) -> bool {
        distance > estimate_size * self.earthquake_ratio
    }

    fn total_size(&self, total_items: usize, estimate_size: f64) -> f64 {
        let len = self.sizes.len();
        let known = self.sums.prefix_sum(total_items.min(len));
        known + total_items.saturating_sub(len) as f64 * estimate_size
    }

    fn prepended(&mut self, count: usize, estimate_size: f64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let estimate = if self.estimate > 0.0 {
            self.estimate
        } else {
            estimate_size
        };
        self.sizes
            .splice(0..0, core::iter::repeat_n(estimate, count));
        self.measured
            .splice(0..0, core::iter::repeat_n(false, count));
        self.sums = Fenwick::from_sizes(&self.sizes);
        count as f64 * estimate
    }

    fn reset(&mut self) {
        self.sizes.clear();
        self.measured.clear();
        self.sums = Fenwick::default();
    }
}
