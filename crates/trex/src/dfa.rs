//! Deterministic automata produced by subset construction

use std::{collections::BTreeMap, fmt};

use crate::{dot, nfa::NfaId, tag_set::TagSet};

/// Handle to a state within one [`Dfa`]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DfaId(pub(crate) usize);

impl DfaId {
    #[inline]
    #[must_use]
    pub fn id(self) -> usize { self.0 }
}

impl fmt::Debug for DfaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DfaId").field(&self.0).finish()
    }
}

impl From<DfaId> for usize {
    #[inline]
    fn from(DfaId(id): DfaId) -> Self { id }
}

/// A DFA state along with the set of NFA states it stands for
#[derive(Debug)]
pub struct State {
    pub(crate) tag: TagSet<NfaId>,
    pub(crate) edges: BTreeMap<u8, DfaId>,
    pub(crate) accept: bool,
}

impl State {
    #[inline]
    #[must_use]
    pub fn accept(&self) -> bool { self.accept }

    /// The epsilon-closed set of NFA states this state was built from
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &TagSet<NfaId> { &self.tag }

    #[inline]
    #[must_use]
    pub fn next(&self, sym: u8) -> Option<DfaId> { self.edges.get(&sym).copied() }

    /// Outgoing transitions in ascending symbol order
    #[inline]
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (u8, DfaId)> {
        self.edges.iter().map(|(&s, &d)| (s, d))
    }
}

#[derive(Debug)]
pub struct Dfa {
    states: Vec<State>,
    start: DfaId,
}

impl Dfa {
    pub(crate) fn new(states: Vec<State>, start: DfaId) -> Self {
        assert!(start.0 < states.len());
        Self { states, start }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> DfaId { self.start }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.states.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    #[inline]
    #[must_use]
    pub fn get(&self, id: DfaId) -> Option<&State> { self.states.get(id.0) }

    /// Every state in creation order, starting with the entry state
    ///
    /// States are only ever created as the target of a transition, so each
    /// one is reachable from [`Dfa::start`].
    #[inline]
    pub fn states(&self) -> impl ExactSizeIterator<Item = (DfaId, &State)> {
        self.states.iter().enumerate().map(|(i, s)| (DfaId(i), s))
    }

    #[inline]
    fn state(&self, id: DfaId) -> &State {
        self.states
            .get(id.0)
            .unwrap_or_else(|| unreachable!("Invalid DFA state {id:?}"))
    }

    /// Run the automaton over `input`, rejecting as soon as a byte has no
    /// transition
    ///
    /// Bytes outside the 7-bit alphabet, including the reserved epsilon
    /// byte `0`, never have a transition and thus always reject.
    #[must_use]
    pub fn is_match(&self, input: &[u8]) -> bool {
        let mut state = self.state(self.start);

        for &byte in input {
            let Some(next) = state.next(byte) else {
                return false;
            };

            state = self.state(next);
        }

        state.accept
    }

    #[must_use]
    pub fn dot(&self) -> dot::Graph<'static> {
        dot::Graph::state_machine(
            self.states().map(|(id, state)| {
                (
                    id.0,
                    state.accept,
                    state.edges().map(|(sym, dst)| (Some(sym), dst.0)),
                )
            }),
            self.start.0,
        )
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::{Dfa, DfaId, State};
    use crate::tag_set::TagSet;

    // a(ba)*
    fn hand_built() -> Dfa {
        let state = |edges: &[(u8, usize)], accept| State {
            tag: TagSet::new(),
            edges: edges.iter().map(|&(s, d)| (s, DfaId(d))).collect::<BTreeMap<_, _>>(),
            accept,
        };

        Dfa::new(
            vec![state(&[(b'a', 1)], false), state(&[(b'b', 2)], true), state(&[(b'a', 1)], false)],
            DfaId(0),
        )
    }

    #[test]
    fn walk() {
        let dfa = hand_built();

        assert!(dfa.is_match(b"a"));
        assert!(dfa.is_match(b"aba"));
        assert!(dfa.is_match(b"ababa"));
        assert!(!dfa.is_match(b""));
        assert!(!dfa.is_match(b"ab"));
        assert!(!dfa.is_match(b"aa"));
        assert!(!dfa.is_match(b"a\0"));
        assert!(!dfa.is_match(b"a\xe1"));
    }

    #[test]
    fn introspection() {
        let dfa = hand_built();

        assert_eq!(dfa.start(), DfaId(0));
        assert_eq!(dfa.len(), 3);
        assert_eq!(
            dfa.states()
                .map(|(i, s)| (i.id(), s.accept(), s.edges().collect::<Vec<_>>()))
                .collect::<Vec<_>>(),
            [
                (0, false, vec![(b'a', DfaId(1))]),
                (1, true, vec![(b'b', DfaId(2))]),
                (2, false, vec![(b'a', DfaId(1))]),
            ],
        );
        assert!(dfa.get(DfaId(3)).is_none());
    }
}
