/// How a new item list relates to the previous one, by item key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Change {
    /// Same keys in the same order.
    Unchanged,
    /// `n` items were inserted before the old first item; the old items follow unchanged.
    Prepend(usize),
    /// `n` items were added after the old last item.
    Append(usize),
    /// Anything else: removals, reorders, inserts in the middle, or growth at both ends.
    Reset,
}

/// Classifies the transition from `old` to `new` by comparing item keys.
///
/// Growing an empty list counts as an append.
pub fn classify_change<T, K: PartialEq>(old: &[T], new: &[T], key: impl Fn(&T) -> K) -> Change {
    let same = |a: &[T], b: &[T]| a.len() == b.len() && a.iter().zip(b).all(|(x, y)| key(x) == key(y));

    if new.len() < old.len() {
        return Change::Reset;
    }
    let grown = new.len() - old.len();
    if same(old, &new[..old.len()]) {
        return if grown == 0 {
            Change::Unchanged
        } else {
            Change::Append(grown)
        };
    }
    if grown > 0 && same(old, &new[grown..]) {
        return Change::Prepend(grown);
    }
    Change::Reset
}
