use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    hash::BuildHasher,
};

use foldhash::fast::FixedState;
use hashbrown::HashTable;

use super::{Nfa, NfaId, Node};
use crate::{
    closure_builder::ClosureBuilder,
    dfa::{Dfa, DfaId, State},
    tag_set::TagSet,
};

/// Subset construction over a single NFA
///
/// Each distinct epsilon-closed set of NFA states becomes exactly one DFA
/// state.  States are committed as soon as they are discovered, before their
/// own transitions are explored, so cycles in the NFA resolve to existing
/// states instead of unbounded expansion.
pub struct DfaBuilder<'a> {
    nfa: &'a Nfa,
    closure: ClosureBuilder<NfaId>,
    hasher: FixedState,
    states: Vec<State>,
    index: HashTable<DfaId>,
    queue: VecDeque<DfaId>,
}

impl<'a> DfaBuilder<'a> {
    pub fn new(nfa: &'a Nfa) -> Self {
        Self {
            nfa,
            closure: ClosureBuilder::default(),
            hasher: FixedState::default(),
            states: vec![],
            index: HashTable::new(),
            queue: VecDeque::new(),
        }
    }

    /// Find the state tagged with `tag`, or commit a new one and queue it for
    /// expansion
    fn intern(&mut self, tag: TagSet<NfaId>) -> DfaId {
        let Self {
            nfa,
            hasher,
            states,
            index,
            queue,
            ..
        } = self;

        let hash = hasher.hash_one(&tag);
        if let Some(&id) = index.find(hash, |&DfaId(i)| states[i].tag == tag) {
            return id;
        }

        let id = DfaId(states.len());
        let accept = nfa.any_accept(&tag);
        tracing::trace!(?id, accept, ?tag, "Committing DFA state");

        states.push(State {
            tag,
            edges: BTreeMap::new(),
            accept,
        });
        index.insert_unique(hash, id, |&DfaId(i)| hasher.hash_one(&states[i].tag));
        queue.push_back(id);

        id
    }

    pub fn build(mut self) -> Dfa {
        let mut start = TagSet::new();
        self.closure.init([self.nfa.start()]);
        self.nfa.solve_closure(&mut self.closure, &mut start);
        let start = self.intern(start);

        while let Some(DfaId(i)) = self.queue.pop_front() {
            let syms: BTreeSet<u8> = self.states[i]
                .tag
                .iter()
                .filter_map(|&n| self.nfa.get(n))
                .flat_map(Node::edges)
                .filter_map(|(s, _)| s)
                .collect();

            for sym in syms {
                let next = self.nfa.step(&mut self.closure, &self.states[i].tag, sym);
                debug_assert!(!next.is_empty());

                let next = self.intern(next);
                assert!(self.states[i].edges.insert(sym, next).is_none());
            }
        }

        tracing::debug!(
            nfa_states = self.nfa.len(),
            dfa_states = self.states.len(),
            "Subset construction finished"
        );

        Dfa::new(self.states, start)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use crate::{
        dfa::Dfa,
        nfa::Nfa,
        parser::{parse, pattern},
    };

    fn assert_unique_tags(dfa: &Dfa) {
        for (i, a) in dfa.states() {
            for (j, b) in dfa.states() {
                if i != j {
                    assert_ne!(a.tag(), b.tag(), "{i:?} and {j:?} share a tag");
                }
            }
        }
    }

    fn assert_reachable(dfa: &Dfa) {
        let mut seen = vec![false; dfa.len()];
        let mut stack = vec![dfa.start()];

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.id()], true) {
                continue;
            }

            stack.extend(dfa.get(id).unwrap().edges().map(|(_, d)| d));
        }

        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn entry_is_first() {
        let nfa = parse("abc").unwrap();
        let dfa = nfa.compile();

        assert_eq!(dfa.start().id(), 0);
        assert!(dfa.get(dfa.start()).unwrap().tag().contains(&nfa.start()));
    }

    #[test]
    fn chained_epsilons_close_fully() {
        // 0 -ε-> 1 -ε-> 2 -ε-> 3 (accepting) -x-> 4
        let mut nfa = Nfa::new();
        let mut prev = nfa.start();
        for _ in 0..3 {
            let next = nfa.push();
            nfa.connect(prev, next, None);
            prev = next;
        }
        nfa.set_accept(prev, true);
        let end = nfa.push();
        nfa.connect(prev, end, Some(b'x'));

        let dfa = nfa.compile();
        let start = dfa.get(dfa.start()).unwrap();

        assert_eq!(start.tag().len(), 4);
        assert!(start.accept());
        assert_eq!(start.edges().count(), 1);
        assert!(dfa.is_match(b""));
        assert!(!dfa.is_match(b"x"));
    }

    #[test]
    fn cycles_dedup() {
        let dfa = parse("(ab|a)*").unwrap().compile();

        assert_unique_tags(&dfa);
        assert_reachable(&dfa);
        assert!(dfa.len() <= 4, "{dfa:?}");
    }

    #[test]
    fn repeated_subsets_are_reused() {
        let dfa = parse("a*").unwrap().compile();

        assert_unique_tags(&dfa);
        assert_eq!(dfa.len(), 2);

        let after = dfa.get(dfa.start()).unwrap().next(b'a').unwrap();
        assert_eq!(dfa.get(after).unwrap().next(b'a'), Some(after));
        assert!(dfa.is_match(b"aaaa"));
    }

    proptest! {
        #[test]
        fn tags_unique(re in "[abc|*()]{0,16}") {
            if let Ok(nfa) = parse(&re) {
                let dfa = nfa.compile();
                assert_unique_tags(&dfa);
                assert_reachable(&dfa);
            }
        }

        #[test]
        fn agrees_with_simulation(
            re in pattern(4, 32, 4),
            inputs in prop::collection::vec(r"[ab|*()\\]{0,8}", 0..16),
        ) {
            let nfa = parse(&re).unwrap();
            let dfa = nfa.compile();
            assert_unique_tags(&dfa);

            for input in inputs {
                prop_assert_eq!(
                    dfa.is_match(input.as_bytes()),
                    nfa.simulate(input.as_bytes()),
                    "{:?} on {:?}", re, input,
                );
            }
        }
    }
}
