//! Insertion-ordered sets compared by membership alone

use std::{
    fmt,
    hash::{BuildHasher, Hash, Hasher},
};

use foldhash::fast::FixedState;
use indexmap::IndexSet;

/// An insertion-ordered set of distinct elements
///
/// Iteration yields elements in the order they were first added, but two sets
/// compare (and hash) equal whenever they hold the same elements, regardless
/// of the order those elements arrived in.
#[derive(Clone)]
#[repr(transparent)]
pub struct TagSet<T>(IndexSet<T, FixedState>);

impl<T> Default for TagSet<T> {
    #[inline]
    fn default() -> Self { Self(IndexSet::default()) }
}

impl<T> TagSet<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> { self.0.iter() }

    #[inline]
    pub fn clear(&mut self) { self.0.clear(); }
}

impl<T: Eq + Hash> TagSet<T> {
    /// Append `el` unless it is already present, returning whether the set
    /// changed
    #[inline]
    pub fn add(&mut self, el: T) -> bool { self.0.insert(el) }

    #[inline]
    #[must_use]
    pub fn contains(&self, el: &T) -> bool { self.0.contains(el) }

    /// Add every element of `other` not already present
    pub fn union_with(&mut self, other: &Self) -> bool
    where T: Clone {
        let mut any = false;
        for el in other {
            any |= self.add(el.clone());
        }
        any
    }
}

impl<T: Eq + Hash> PartialEq for TagSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|el| other.contains(el))
    }
}

impl<T: Eq + Hash> Eq for TagSet<T> {}

impl<T: Hash> Hash for TagSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Summing per-element hashes keeps the result independent of order
        let sum = self
            .iter()
            .map(|el| FixedState::default().hash_one(el))
            .fold(0_u64, u64::wrapping_add);

        state.write_usize(self.len());
        state.write_u64(sum);
    }
}

impl<T: fmt::Debug> fmt::Debug for TagSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Eq + Hash> FromIterator<T> for TagSet<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(it: I) -> Self {
        Self(IndexSet::from_iter(it))
    }
}

impl<T: Eq + Hash> Extend<T> for TagSet<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, it: I) { self.0.extend(it); }
}

impl<'a, T> IntoIterator for &'a TagSet<T> {
    type IntoIter = indexmap::set::Iter<'a, T>;
    type Item = &'a T;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl<T> IntoIterator for TagSet<T> {
    type IntoIter = indexmap::set::IntoIter<T>;
    type Item = T;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

#[cfg(test)]
mod test {
    use std::hash::BuildHasher;

    use foldhash::fast::FixedState;
    use proptest::prelude::*;

    use super::TagSet;

    #[test]
    fn add_ignores_duplicates() {
        let mut set = TagSet::new();
        assert!(set.add(3));
        assert!(set.add(1));
        assert!(!set.add(3));
        assert!(set.add(2));

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 1, 2]);
    }

    #[test]
    fn equality_ignores_order() {
        let lhs: TagSet<_> = [1, 2, 3].into_iter().collect();
        let rhs: TagSet<_> = [3, 1, 2].into_iter().collect();
        let sub: TagSet<_> = [1, 2].into_iter().collect();
        let other: TagSet<_> = [1, 2, 4].into_iter().collect();

        assert_eq!(lhs, rhs);
        assert_ne!(lhs, sub);
        assert_ne!(sub, lhs);
        assert_ne!(lhs, other);
        assert_eq!(TagSet::<u8>::new(), TagSet::new());
    }

    #[test]
    fn union() {
        let mut lhs: TagSet<_> = [1, 2].into_iter().collect();
        let rhs: TagSet<_> = [2, 3].into_iter().collect();

        assert!(lhs.union_with(&rhs));
        assert!(!lhs.union_with(&rhs));
        assert_eq!(lhs.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    }

    proptest! {
        #[test]
        fn permuted_sets_agree(v in prop::collection::vec(0..64_u32, 0..32)) {
            let fwd: TagSet<_> = v.iter().copied().collect();
            let rev: TagSet<_> = v.iter().rev().copied().collect();

            prop_assert_eq!(&fwd, &rev);
            prop_assert_eq!(
                FixedState::default().hash_one(&fwd),
                FixedState::default().hash_one(&rev),
            );
        }
    }
}
