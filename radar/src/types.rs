/// The virtualized axis. The engine windows one axis at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// A boundary/visibility notification, delivered through the radar's `send_action` callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    FirstVisibleChanged(usize),
    LastVisibleChanged(usize),
    FirstReached(usize),
    LastReached(usize),
}

impl Action {
    /// The host-facing action name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstVisibleChanged(_) => "firstVisibleChanged",
            Self::LastVisibleChanged(_) => "lastVisibleChanged",
            Self::FirstReached(_) => "firstReached",
            Self::LastReached(_) => "lastReached",
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            Self::FirstVisibleChanged(i)
            | Self::LastVisibleChanged(i)
            | Self::FirstReached(i)
            | Self::LastReached(i) => i,
        }
    }
}

/// Per-edge "reached" latch.
///
/// - `Unreached -> Reached` when the rendered window touches the edge (fires the action once).
/// - `Reached -> Unreached` on `prepend` (first edge), `append` (last edge) or `reset` (both).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeLatch {
    #[default]
    Unreached,
    Reached,
}

impl EdgeLatch {
    pub fn is_reached(self) -> bool {
        matches!(self, Self::Reached)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    NotStarted,
    Started,
    Destroyed,
}

/// The rendered window computed by an [`crate::IndexPolicy`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    /// Estimated size of the hidden items before `start_index`.
    pub total_before: f64,
    /// Estimated size of the hidden items from `end_index` on.
    pub total_after: f64,
}

impl Window {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Inclusive last index, `None` for an empty window.
    pub fn last_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end_index - 1)
        }
    }

    pub(crate) fn shifted(self, by: usize, size: f64) -> Self {
        Self {
            start_index: self.start_index + by,
            end_index: self.end_index + by,
            total_before: self.total_before + size,
            total_after: self.total_after,
        }
    }
}

/// Geometry measured from the live DOM at the start of every update.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub estimate_size: f64,
    pub container_size: f64,
    /// Distance from the scroll container's content start to the item container's start.
    pub collection_offset: f64,
    /// Inverse of any scale transform applied to the scroll container.
    pub transform_scale: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            estimate_size: 0.0,
            container_size: 0.0,
            collection_offset: 0.0,
            transform_scale: 1.0,
        }
    }
}

/// A bounding client rect, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            left: self.left * scale,
            top: self.top * scale,
            width: self.width * scale,
            height: self.height * scale,
        }
    }
}
