use alloc::string::String;

use crate::Axis;

/// The estimated size of one item along the virtualized axis.
///
/// CSS lengths (`"3em"`, `"10%"`) are resolved against the item container on every update.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum EstimateSize {
    Pixels(f64),
    Css(String),
}

impl From<f64> for EstimateSize {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

impl From<u32> for EstimateSize {
    fn from(px: u32) -> Self {
        Self::Pixels(f64::from(px))
    }
}

impl From<&str> for EstimateSize {
    fn from(css: &str) -> Self {
        Self::Css(String::from(css))
    }
}

impl From<String> for EstimateSize {
    fn from(css: String) -> Self {
        Self::Css(css)
    }
}

/// Configuration for [`crate::Radar`].
///
/// Plain data: cheap to clone, and (with the `serde` feature) loadable from any serde format.
/// Missing fields fall back to [`RadarOptions::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadarOptions {
    pub axis: Axis,

    /// Items rendered on each side of the visible ones. Fractional values round up.
    pub buffer_size: f64,

    /// Selects the scroll container, starting from the item container.
    ///
    /// - `Some("body")`: the document scroller;
    /// - `Some(selector)`: the closest inclusive ancestor matching `selector`;
    /// - `None`: the item container's parent.
    pub container_selector: Option<String>,

    /// Required. `start()` fails without it.
    pub estimate_size: Option<EstimateSize>,

    /// Render every item and never window.
    pub render_all: bool,

    /// With a non-zero `starting_index`, align that item to the end of the viewport instead of
    /// the start.
    pub render_from_last: bool,

    /// Slots laid out (from `starting_index`) before the radar starts.
    pub initial_render_count: usize,

    /// Reuse slots (and their DOM) instead of destroying and recreating them.
    pub should_recycle: bool,

    pub starting_index: usize,
}

impl Default for RadarOptions {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            buffer_size: 1.0,
            container_selector: None,
            estimate_size: None,
            render_all: false,
            render_from_last: false,
            initial_render_count: 0,
            should_recycle: true,
            starting_index: 0,
        }
    }
}

impl RadarOptions {
    pub fn new(estimate_size: impl Into<EstimateSize>) -> Self {
        Self {
            estimate_size: Some(estimate_size.into()),
            ..Self::default()
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: f64) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_container_selector(mut self, selector: Option<impl Into<String>>) -> Self {
        self.container_selector = selector.map(Into::into);
        self
    }

    pub fn with_estimate_size(mut self, estimate_size: impl Into<EstimateSize>) -> Self {
        self.estimate_size = Some(estimate_size.into());
        self
    }

    pub fn with_render_all(mut self, render_all: bool) -> Self {
        self.render_all = render_all;
        self
    }

    pub fn with_render_from_last(mut self, render_from_last: bool) -> Self {
        self.render_from_last = render_from_last;
        self
    }

    pub fn with_initial_render_count(mut self, count: usize) -> Self {
        self.initial_render_count = count;
        self
    }

    pub fn with_should_recycle(mut self, should_recycle: bool) -> Self {
        self.should_recycle = should_recycle;
        self
    }

    pub fn with_starting_index(mut self, starting_index: usize) -> Self {
        self.starting_index = starting_index;
        self
    }
}
