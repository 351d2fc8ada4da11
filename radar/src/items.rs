use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// A randomly indexable, externally owned item sequence.
///
/// The radar only reads it. Hosts replace it through `Radar::set_items` and then describe the
/// change with `prepend`, `append` or `reset`.
pub trait ItemSource {
    type Item: Clone + 'static;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + 'static> ItemSource for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }
}

macro_rules! shared_slice_source {
    ($($ty:ty),*) => {
        $(
            impl<T: Clone + 'static> ItemSource for $ty {
                type Item = T;

                fn len(&self) -> usize {
                    <[T]>::len(self)
                }

                fn get(&self, index: usize) -> Option<T> {
                    <[T]>::get(self, index).cloned()
                }
            }
        )*
    };
}

shared_slice_source!(Rc<[T]>, Arc<[T]>, Rc<Vec<T>>, Arc<Vec<T>>);
