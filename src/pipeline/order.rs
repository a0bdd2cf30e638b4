//! Ordering engine
//!
//! Multi-key stable sort. Keys are compared in the order supplied; the first
//! non-equal key decides. Elements equal on every key keep their upstream
//! order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Sort direction for one key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => write!(f, "asc"),
            Direction::Descending => write!(f, "desc"),
        }
    }
}

type Comparator<'a, T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a>;

/// A key selector paired with a direction.
///
/// The selected key type is erased so keys of different types can share
/// one key list.
pub struct SortKey<'a, T> {
    compare: Comparator<'a, T>,
    direction: Direction,
}

impl<'a, T> SortKey<'a, T> {
    pub fn new<K, F>(selector: F, direction: Direction) -> Self
    where
        T: 'a,
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'a,
    {
        SortKey {
            compare: Arc::new(move |a: &T, b: &T| selector(a).cmp(&selector(b))),
            direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = (self.compare)(a, b);
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

impl<T> Clone for SortKey<'_, T> {
    fn clone(&self) -> Self {
        SortKey {
            compare: Arc::clone(&self.compare),
            direction: self.direction,
        }
    }
}

impl<T> fmt::Debug for SortKey<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// Ascending key.
pub fn asc<'a, T, K, F>(selector: F) -> SortKey<'a, T>
where
    T: 'a,
    K: Ord,
    F: Fn(&T) -> K + Send + Sync + 'a,
{
    SortKey::new(selector, Direction::Ascending)
}

/// Descending key.
pub fn desc<'a, T, K, F>(selector: F) -> SortKey<'a, T>
where
    T: 'a,
    K: Ord,
    F: Fn(&T) -> K + Send + Sync + 'a,
{
    SortKey::new(selector, Direction::Descending)
}

/// Compare two elements key by key.
pub fn compare_by_keys<T>(keys: &[SortKey<'_, T>], a: &T, b: &T) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort in place. `sort_by` is a stable merge sort.
pub fn sort_stable<T>(items: &mut [T], keys: &[SortKey<'_, T>]) {
    items.sort_by(|a, b| compare_by_keys(keys, a, b));
}
