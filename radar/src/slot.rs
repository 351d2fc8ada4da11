use crate::SlotBounds;

/// Stable identity of a pooled slot. Ids of destroyed slots are reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// A recyclable unit that renders one item.
///
/// The radar moves its DOM around and reassigns `(item, index)`; the host renders its content.
#[derive(Clone, Debug)]
pub struct Slot<T, N> {
    item: Option<T>,
    index: usize,
    rendered: bool,
    bounds: Option<SlotBounds<N>>,
}

impl<T, N> Slot<T, N> {
    pub(crate) fn new() -> Self {
        Self {
            item: None,
            index: 0,
            rendered: false,
            bounds: None,
        }
    }

    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the slot's DOM has been attached at least once.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn bounds(&self) -> Option<&SlotBounds<N>> {
        self.bounds.as_ref()
    }

    /// Points the slot at a new item. The DOM stays where it is.
    pub(crate) fn recycle(&mut self, item: Option<T>, index: usize) {
        self.item = item;
        self.index = index;
    }

    pub(crate) fn shift(&mut self, by: usize) {
        self.index += by;
    }

    pub(crate) fn mark_rendered(&mut self, bounds: SlotBounds<N>) {
        self.bounds = Some(bounds);
        self.rendered = true;
    }

    pub(crate) fn clear(&mut self) {
        self.item = None;
        self.index = 0;
        self.rendered = false;
        self.bounds = None;
    }
}
