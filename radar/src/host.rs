use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::{Axis, ClientRect, SlotId};

/// The first and last DOM node of a rendered slot. Both ends are inclusive siblings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotBounds<N> {
    pub first: N,
    pub last: N,
}

/// Everything the radar needs from the DOM.
///
/// Node handles are expected to behave like `web_sys` nodes: cheap to clone, shared, and
/// mutated through `&self`. Event subscriptions must deliver events asynchronously (never from
/// inside the call that caused them).
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    type Listener: 'static;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    /// The closest inclusive ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// The node that scrolls the whole document (used for the `"body"` selector).
    fn document_scroller(&self) -> Self::Node;

    /// Moves `node` under `parent`, before `reference` (or last when `None`).
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);
    fn create_marker(&self) -> Self::Node;
    /// A detached container that holds pooled slot DOM while it is not in use.
    fn create_fragment(&self) -> Self::Node;
    /// Renders a fresh slot for the first time, before `reference`.
    fn mount_slot(
        &self,
        parent: &Self::Node,
        reference: Option<&Self::Node>,
        slot: SlotId,
    ) -> SlotBounds<Self::Node>;
    /// Tears down a slot's DOM for good.
    fn unmount(&self, bounds: &SlotBounds<Self::Node>);

    /// Untransformed layout size (`offsetWidth`/`offsetHeight`).
    fn layout_size(&self, node: &Self::Node, axis: Axis) -> f64;
    /// Bounding client rect, affected by ancestor transforms.
    fn client_rect(&self, node: &Self::Node) -> ClientRect;
    /// Computed `max-width`/`max-height`, `None` when unset.
    fn max_size_style(&self, node: &Self::Node, axis: Axis) -> Option<String>;
    /// Resolves a CSS length to pixels in the context of `context`.
    fn estimate_length(&self, context: &Self::Node, css: &str, axis: Axis) -> f64;
    fn scroll_offset(&self, node: &Self::Node, axis: Axis) -> f64;
    fn set_scroll_offset(&self, node: &Self::Node, axis: Axis, offset: f64);

    fn set_marker_extent(&self, marker: &Self::Node, axis: Axis, extent: f64);
    fn set_marker_text(&self, marker: &Self::Node, text: &str);

    fn subscribe_scroll(
        &self,
        node: &Self::Node,
        axis: Axis,
        handler: Rc<dyn Fn(f64)>,
    ) -> Self::Listener;
    fn subscribe_resize(&self, handler: Rc<dyn Fn()>) -> Self::Listener;
    fn subscribe_click(&self, node: &Self::Node, handler: Rc<dyn Fn()>) -> Self::Listener;
    fn unsubscribe(&self, listener: Self::Listener);
}

/// Moves the sibling range `first..=last` under `parent`, before `reference`.
///
/// The next sibling is read before each move, so the range may come from any parent (including
/// a holding fragment).
pub fn insert_range_before<D: Dom + ?Sized>(
    dom: &D,
    parent: &D::Node,
    reference: Option<&D::Node>,
    first: &D::Node,
    last: &D::Node,
) {
    let mut next = Some(first.clone());
    while let Some(node) = next {
        next = if &node == last {
            None
        } else {
            dom.next_sibling(&node)
        };
        dom.insert_before(parent, &node, reference);
    }
}
