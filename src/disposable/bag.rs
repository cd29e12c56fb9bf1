use smallvec::SmallVec;

/// Stable handle of an entry in a [`Bag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BagKey(u64);

/// An insertion-ordered container with key-based removal.
///
/// Backs both `CompositeDisposable` and the subject observer registry.
///
/// # Design
///
/// - **SmallVec Optimization**: Uses `SmallVec<[_; 2]>` to avoid heap
///   allocation for the common case of 0-2 entries.
/// - **Monotonic keys**: keys only grow, so the storage stays sorted by key
///   and iteration follows insertion order.
/// - **Removal cost**: finding an entry is a binary search, but taking it
///   out shifts the tail, so `remove` is O(n). Bags hold a handful of
///   observers or disposables; a keyed map would lose the ordered fan-out.
///
/// # Examples
///
/// ```rust
/// use rxcore::disposable::Bag;
///
/// let mut bag = Bag::default();
/// let first = bag.insert("first");
/// bag.insert("second");
///
/// assert_eq!(bag.remove(first), Some("first"));
/// assert_eq!(bag.iter().copied().collect::<Vec<_>>(), vec!["second"]);
/// ```
pub struct Bag<T> {
  next_key: u64,
  items: SmallVec<[(BagKey, T); 2]>,
}

impl<T> Default for Bag<T> {
  fn default() -> Self { Self { next_key: 0, items: SmallVec::new() } }
}

impl<T> Bag<T> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Adds an entry and returns its key.
  pub fn insert(&mut self, item: T) -> BagKey {
    let key = BagKey(self.next_key);
    self.next_key += 1;
    self.items.push((key, item));
    key
  }

  /// Removes the entry stored under `key`.
  pub fn remove(&mut self, key: BagKey) -> Option<T> {
    self
      .items
      .binary_search_by_key(&key, |(k, _)| *k)
      .ok()
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, key: BagKey) -> bool {
    self.items.binary_search_by_key(&key, |(k, _)| *k).is_ok()
  }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Removes every entry, in insertion order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &T> { self.items.iter().map(|(_, item)| item) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxcore_macro::test]
  fn keys_stay_valid_after_removal() {
    let mut bag = Bag::new();
    let a = bag.insert(1);
    let b = bag.insert(2);
    let c = bag.insert(3);

    assert_eq!(bag.remove(b), Some(2));
    assert_eq!(bag.remove(b), None);
    assert!(bag.contains(a));
    assert!(bag.contains(c));

    let d = bag.insert(4);
    assert!(d > c);
    assert_eq!(bag.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
  }

  #[rxcore_macro::test]
  fn drain_empties_in_order() {
    let mut bag = Bag::new();
    (0..5).for_each(|v| {
      bag.insert(v);
    });
    assert_eq!(bag.drain().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(bag.is_empty());
  }
}
