//! An in-memory [`Dom`] for tests, demos and headless hosts.
//!
//! The layout model is one-dimensional and ignores the axis: every node has a single extent and
//! a single scroll offset, and children are laid out back to back.
//!
//! - Nodes with an explicit size (`set_layout_size`) use it; scrollers need one.
//! - Markers use their marker extent, slot heads use the shared item extent, slot tails are empty.
//! - Any other node is as large as its children.
//!
//! Events are queued and only delivered by [`MemoryDom::dispatch_events`], the way a browser
//! delivers them on a later task.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::host::{Dom, SlotBounds};
use crate::{Axis, ClientRect, SlotId};

/// Font size used to resolve `em` lengths.
const EM_PX: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Element,
    Marker,
    Fragment,
    SlotHead(SlotId),
    SlotTail(SlotId),
}

#[derive(Debug)]
struct NodeData {
    kind: Kind,
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    size: Option<f64>,
    extent: f64,
    scroll: f64,
    max_size_style: Option<String>,
    text: String,
}

impl NodeData {
    fn new(kind: Kind, tag: &str) -> Self {
        Self {
            kind,
            tag: String::from(tag),
            parent: None,
            children: Vec::new(),
            size: None,
            extent: 0.0,
            scroll: 0.0,
            max_size_style: None,
            text: String::new(),
        }
    }
}

enum Handler {
    Scroll(NodeId, Rc<dyn Fn(f64)>),
    Resize(Rc<dyn Fn()>),
    Click(NodeId, Rc<dyn Fn()>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Event {
    Scroll(NodeId),
    Resize,
    Click(NodeId),
}

struct Tree {
    nodes: Vec<NodeData>,
    document: NodeId,
    item_extent: f64,
    scale: f64,
    events: VecDeque<Event>,
    listeners: Vec<(ListenerId, Handler)>,
    next_listener: u64,
}

impl Tree {
    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    fn extent(&self, id: NodeId) -> f64 {
        let node = self.node(id);
        if let Some(size) = node.size {
            return size;
        }
        match node.kind {
            Kind::Marker => node.extent,
            Kind::SlotHead(_) => self.item_extent,
            Kind::SlotTail(_) => 0.0,
            Kind::Element | Kind::Fragment => self.content_extent(id),
        }
    }

    fn content_extent(&self, id: NodeId) -> f64 {
        self.node(id)
            .children
            .iter()
            .map(|&c| self.extent(c))
            .sum()
    }

    /// Unscaled client-space start of `id`.
    fn position(&self, id: NodeId) -> f64 {
        let Some(parent) = self.node(id).parent else {
            return 0.0;
        };
        let mut pos = self.position(parent) - self.node(parent).scroll;
        for &sibling in &self.node(parent).children {
            if sibling == id {
                break;
            }
            pos += self.extent(sibling);
        }
        pos
    }

    fn max_scroll(&self, id: NodeId) -> f64 {
        let max = self.content_extent(id) - self.extent(id);
        if max > 0.0 { max } else { 0.0 }
    }

    fn clamped_scroll(&self, id: NodeId, offset: f64) -> f64 {
        let max = self.max_scroll(id);
        if offset < 0.0 {
            0.0
        } else if offset > max {
            max
        } else {
            offset
        }
    }
}

/// A shared, cheaply cloned in-memory document.
#[derive(Clone)]
pub struct MemoryDom {
    tree: Rc<RefCell<Tree>>,
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("MemoryDom")
            .field("nodes", &tree.nodes.len())
            .field("pending_events", &tree.events.len())
            .field("listeners", &tree.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Creates a document whose root (`"html"`) is the document scroller.
    pub fn new() -> Self {
        let document = NodeData::new(Kind::Element, "html");
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: alloc::vec![document],
                document: NodeId(0),
                item_extent: 0.0,
                scale: 1.0,
                events: VecDeque::new(),
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    pub fn document(&self) -> NodeId {
        self.tree.borrow().document
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().push(NodeData::new(Kind::Element, tag))
    }

    /// Creates an element of the given viewport size under `parent`.
    pub fn create_scroller(&self, parent: NodeId, tag: &str, viewport: f64) -> NodeId {
        let node = self.create_element(tag);
        self.set_layout_size(node, Some(viewport));
        self.append_child(parent, node);
        node
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.insert_before(&parent, &child, None);
    }

    /// Fixes a node's size. `None` returns it to its natural size.
    pub fn set_layout_size(&self, node: NodeId, size: Option<f64>) {
        self.tree.borrow_mut().node_mut(node).size = size;
    }

    pub fn set_max_size_style(&self, node: NodeId, style: Option<&str>) {
        self.tree.borrow_mut().node_mut(node).max_size_style = style.map(String::from);
    }

    /// Rendered size of every slot.
    pub fn set_item_extent(&self, extent: f64) {
        self.tree.borrow_mut().item_extent = extent;
    }

    /// Applies a scale transform to the whole document (`client_rect` is multiplied by `scale`).
    pub fn set_scale(&self, scale: f64) {
        self.tree.borrow_mut().scale = scale;
    }

    /// User scroll: moves `node` and queues a scroll event.
    pub fn scroll_to(&self, node: NodeId, offset: f64) {
        self.set_scroll_offset(&node, Axis::Horizontal, offset);
    }

    /// Queues a click on `node`.
    pub fn click(&self, node: NodeId) {
        self.tree.borrow_mut().events.push_back(Event::Click(node));
    }

    /// Resizes `node` and queues a window resize event.
    pub fn resize(&self, node: NodeId, size: f64) {
        let mut tree = self.tree.borrow_mut();
        tree.node_mut(node).size = Some(size);
        tree.events.push_back(Event::Resize);
    }

    pub fn pending_events(&self) -> usize {
        self.tree.borrow().events.len()
    }

    /// Delivers queued events in order, including events queued by the handlers themselves.
    /// Returns how many events were delivered.
    pub fn dispatch_events(&self) -> usize {
        let mut delivered = 0;
        loop {
            let Some(event) = self.tree.borrow_mut().events.pop_front() else {
                return delivered;
            };
            delivered += 1;

            let (scroll_handlers, plain_handlers) = {
                let tree = self.tree.borrow();
                let mut scroll: Vec<(Rc<dyn Fn(f64)>, f64)> = Vec::new();
                let mut plain: Vec<Rc<dyn Fn()>> = Vec::new();
                for (_, handler) in &tree.listeners {
                    match (handler, event) {
                        (Handler::Scroll(node, f), Event::Scroll(target)) if *node == target => {
                            scroll.push((Rc::clone(f), tree.node(target).scroll));
                        }
                        (Handler::Resize(f), Event::Resize) => plain.push(Rc::clone(f)),
                        (Handler::Click(node, f), Event::Click(target)) if *node == target => {
                            plain.push(Rc::clone(f));
                        }
                        _ => {}
                    }
                }
                (scroll, plain)
            };

            for (handler, offset) in scroll_handlers {
                handler(offset);
            }
            for handler in plain_handlers {
                handler();
            }
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(node).children.clone()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).tag.clone()
    }

    /// The slot a node belongs to, if it is part of a mounted slot.
    pub fn slot_of(&self, node: NodeId) -> Option<SlotId> {
        match self.tree.borrow().node(node).kind {
            Kind::SlotHead(slot) | Kind::SlotTail(slot) => Some(slot),
            _ => None,
        }
    }

    /// Slots under `container`, in DOM order.
    pub fn slot_order(&self, container: NodeId) -> Vec<SlotId> {
        let tree = self.tree.borrow();
        tree.node(container)
            .children
            .iter()
            .filter_map(|&c| match tree.node(c).kind {
                Kind::SlotHead(slot) => Some(slot),
                _ => None,
            })
            .collect()
    }

    pub fn marker_extent(&self, node: NodeId) -> f64 {
        self.tree.borrow().node(node).extent
    }

    pub fn marker_text(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).text.clone()
    }

    pub fn scroll_position(&self, node: NodeId) -> f64 {
        self.scroll_offset(&node, Axis::Horizontal)
    }

    /// Natural or fixed size of `node`.
    pub fn extent(&self, node: NodeId) -> f64 {
        self.tree.borrow().extent(node)
    }

    fn listen(&self, handler: Handler) -> ListenerId {
        let mut tree = self.tree.borrow_mut();
        let id = ListenerId(tree.next_listener);
        tree.next_listener += 1;
        tree.listeners.push((id, handler));
        id
    }
}

fn parse_length(css: &str, context_extent: f64) -> f64 {
    let css = css.trim();
    let (number, unit) = match css.find(|c: char| c.is_ascii_alphabetic() || c == '%') {
        Some(at) => css.split_at(at),
        None => (css, "px"),
    };
    let Ok(value) = number.trim().parse::<f64>() else {
        return 0.0;
    };
    match unit {
        "px" => value,
        "em" | "rem" => value * EM_PX,
        "%" => value / 100.0 * context_extent,
        _ => 0.0,
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Listener = ListenerId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*node).parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let parent = tree.node(*node).parent?;
        let siblings = &tree.node(parent).children;
        let at = siblings.iter().position(|c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut cur = Some(*node);
        while let Some(id) = cur {
            let data = tree.node(id);
            if data.kind == Kind::Element && (selector == "*" || data.tag == selector) {
                return Some(id);
            }
            cur = data.parent;
        }
        None
    }

    fn document_scroller(&self) -> NodeId {
        self.document()
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        if reference == Some(node) {
            return;
        }
        let mut tree = self.tree.borrow_mut();
        tree.detach(*node);
        let children = &mut tree.node_mut(*parent).children;
        let at = reference
            .and_then(|r| children.iter().position(|c| c == r))
            .unwrap_or(children.len());
        children.insert(at, *node);
        tree.node_mut(*node).parent = Some(*parent);
    }

    fn create_marker(&self) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeData::new(Kind::Marker, "occluded-content"))
    }

    fn create_fragment(&self) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeData::new(Kind::Fragment, "#document-fragment"))
    }

    fn mount_slot(
        &self,
        parent: &NodeId,
        reference: Option<&NodeId>,
        slot: SlotId,
    ) -> SlotBounds<NodeId> {
        let (first, last) = {
            let mut tree = self.tree.borrow_mut();
            let first = tree.push(NodeData::new(Kind::SlotHead(slot), "slot"));
            let last = tree.push(NodeData::new(Kind::SlotTail(slot), "#comment"));
            (first, last)
        };
        self.insert_before(parent, &first, reference);
        self.insert_before(parent, &last, reference);
        SlotBounds { first, last }
    }

    fn unmount(&self, bounds: &SlotBounds<NodeId>) {
        let mut range = Vec::new();
        let mut next = Some(bounds.first);
        while let Some(node) = next {
            range.push(node);
            next = if node == bounds.last {
                None
            } else {
                self.next_sibling(&node)
            };
        }
        let mut tree = self.tree.borrow_mut();
        for node in range {
            tree.detach(node);
        }
    }

    fn layout_size(&self, node: &NodeId, _axis: Axis) -> f64 {
        self.tree.borrow().extent(*node)
    }

    fn client_rect(&self, node: &NodeId) -> ClientRect {
        let tree = self.tree.borrow();
        let start = tree.position(*node) * tree.scale;
        let extent = tree.extent(*node) * tree.scale;
        ClientRect {
            left: start,
            top: start,
            width: extent,
            height: extent,
        }
    }

    fn max_size_style(&self, node: &NodeId, _axis: Axis) -> Option<String> {
        self.tree.borrow().node(*node).max_size_style.clone()
    }

    fn estimate_length(&self, context: &NodeId, css: &str, _axis: Axis) -> f64 {
        let context_extent = self.tree.borrow().extent(*context);
        parse_length(css, context_extent)
    }

    fn scroll_offset(&self, node: &NodeId, _axis: Axis) -> f64 {
        let mut tree = self.tree.borrow_mut();
        let offset = tree.clamped_scroll(*node, tree.node(*node).scroll);
        tree.node_mut(*node).scroll = offset;
        offset
    }

    fn set_scroll_offset(&self, node: &NodeId, _axis: Axis, offset: f64) {
        let mut tree = self.tree.borrow_mut();
        let offset = tree.clamped_scroll(*node, offset);
        if tree.node(*node).scroll != offset {
            tree.node_mut(*node).scroll = offset;
            tree.events.push_back(Event::Scroll(*node));
        }
    }

    fn set_marker_extent(&self, marker: &NodeId, _axis: Axis, extent: f64) {
        self.tree.borrow_mut().node_mut(*marker).extent = extent;
    }

    fn set_marker_text(&self, marker: &NodeId, text: &str) {
        self.tree.borrow_mut().node_mut(*marker).text = String::from(text);
    }

    fn subscribe_scroll(&self, node: &NodeId, _axis: Axis, handler: Rc<dyn Fn(f64)>) -> ListenerId {
        self.listen(Handler::Scroll(*node, handler))
    }

    fn subscribe_resize(&self, handler: Rc<dyn Fn()>) -> ListenerId {
        self.listen(Handler::Resize(handler))
    }

    fn subscribe_click(&self, node: &NodeId, handler: Rc<dyn Fn()>) -> ListenerId {
        self.listen(Handler::Click(*node, handler))
    }

    fn unsubscribe(&self, listener: ListenerId) {
        self.tree
            .borrow_mut()
            .listeners
            .retain(|(id, _)| *id != listener);
    }
}
