use std::{collections::VecDeque, hash::Hash};

use crate::tag_set::TagSet;

/// Worklist for computing the least fixed point of a set under a successor
/// function
#[derive(Debug)]
pub struct ClosureBuilder<T>(VecDeque<T>);

impl<T> Default for ClosureBuilder<T> {
    #[inline]
    fn default() -> Self { Self(VecDeque::new()) }
}

impl<T> ClosureBuilder<T> {
    #[inline]
    pub fn init<I: IntoIterator<Item = T>>(&mut self, it: I) {
        assert!(self.0.is_empty());
        self.extend(it);
    }
}

impl<T: Clone + Eq + Hash> ClosureBuilder<T> {
    /// Drain the worklist into `set`, queueing the successors of every element
    /// that was not already present
    ///
    /// Elements are only expanded on first insertion, so this terminates even
    /// when `f` describes a cyclic graph.
    pub fn solve<I: IntoIterator<Item = T>>(
        &mut self,
        set: &mut TagSet<T>,
        f: impl Fn(T) -> I,
    ) -> bool {
        let mut any = false;

        while let Some(el) = self.0.pop_front() {
            if set.add(el.clone()) {
                any = true;
                self.0.extend(f(el));
            }
        }

        any
    }
}

impl<T> Extend<T> for ClosureBuilder<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, it: I) { self.0.extend(it); }
}

#[cfg(test)]
mod test {
    use super::ClosureBuilder;
    use crate::tag_set::TagSet;

    #[test]
    fn follows_chains_to_a_fixed_point() {
        // 0 -> 1 -> 2 -> 3 -> 1, 4 unreachable
        let succ = |n: u32| match n {
            0 => vec![1],
            1 => vec![2],
            2 => vec![3],
            3 => vec![1],
            _ => vec![0],
        };

        let mut closure = ClosureBuilder::default();
        let mut set = TagSet::new();
        closure.init([0]);
        assert!(closure.solve(&mut set, succ));

        assert_eq!(set, [0, 1, 2, 3].into_iter().collect());
        assert!(!set.contains(&4));
    }

    #[test]
    fn reuses_existing_members() {
        let mut closure = ClosureBuilder::default();
        let mut set: TagSet<u32> = [5].into_iter().collect();
        closure.init([5]);

        assert!(!closure.solve(&mut set, |n| [n + 1]));
        assert_eq!(set.len(), 1);
    }
}
