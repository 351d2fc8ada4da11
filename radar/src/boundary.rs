use alloc::format;
use alloc::string::String;

use crate::{Axis, Dom};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Before,
    After,
}

/// A permanent sentinel that bounds the live window and stands in for the hidden items on one
/// side of it.
#[derive(Clone, Debug)]
pub struct Boundary<N> {
    node: N,
    side: Side,
    extent: f64,
    hidden: usize,
}

impl<N> Boundary<N> {
    pub(crate) fn new(node: N, side: Side) -> Self {
        Self {
            node,
            side,
            extent: 0.0,
            hidden: 0,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Placeholder size along the axis. Never negative.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Number of items this marker stands in for.
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn label(&self) -> String {
        hidden_label(self.hidden, self.side)
    }

    pub(crate) fn update<D>(&mut self, dom: &D, axis: Axis, extent: f64, hidden: usize)
    where
        D: Dom<Node = N> + ?Sized,
    {
        self.extent = if extent > 0.0 { extent } else { 0.0 };
        self.hidden = hidden;
        dom.set_marker_extent(&self.node, axis, self.extent);
        dom.set_marker_text(&self.node, &self.label());
    }
}

fn hidden_label(hidden: usize, side: Side) -> String {
    if hidden == 0 {
        return String::new();
    }
    let noun = if hidden == 1 { "item" } else { "items" };
    let side = match side {
        Side::Before => "before",
        Side::After => "after",
    };
    format!("And {hidden} {noun} {side}")
}
