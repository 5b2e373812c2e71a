//! Nondeterministic automata over the 7-bit alphabet

use std::{collections::BTreeMap, fmt};

use self::dfa_builder::DfaBuilder;
use crate::{closure_builder::ClosureBuilder, dfa::Dfa, dot, tag_set::TagSet};

mod dfa_builder;

/// Reserved byte standing in for an epsilon transition
///
/// Never a valid literal symbol, and never accepted by a compiled automaton.
pub const EPSILON: u8 = 0;

/// Number of byte values in the alphabet, including [`EPSILON`]
pub const ALPHABET: u8 = 128;

/// Returns true if `byte` may label a non-epsilon transition
#[inline]
#[must_use]
pub fn is_symbol(byte: u8) -> bool { byte != EPSILON && byte < ALPHABET }

/// Iterate over every matchable symbol in ascending order
#[inline]
pub fn symbols() -> impl Iterator<Item = u8> { 1..ALPHABET }

/// Handle to a state within one [`Nfa`]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NfaId(usize);

impl NfaId {
    #[inline]
    #[must_use]
    pub fn id(self) -> usize { self.0 }
}

impl fmt::Debug for NfaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NfaId").field(&self.0).finish()
    }
}

impl From<NfaId> for usize {
    #[inline]
    fn from(NfaId(id): NfaId) -> Self { id }
}

#[derive(Debug, Default)]
pub struct Node {
    nil: TagSet<NfaId>,
    map: BTreeMap<u8, TagSet<NfaId>>,
    accept: bool,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn accept(&self) -> bool { self.accept }

    #[inline]
    #[must_use]
    pub fn nil_edges(&self) -> &TagSet<NfaId> { &self.nil }

    /// Destinations reachable by consuming `sym`, if any
    #[inline]
    #[must_use]
    pub fn next(&self, sym: u8) -> Option<&TagSet<NfaId>> { self.map.get(&sym) }

    /// All outgoing edges, epsilon (`None`) first, then symbols ascending
    #[inline]
    pub fn edges(&self) -> Edges<'_> {
        Edges {
            nil: (!self.nil.is_empty()).then_some(&self.nil),
            map: self.map.iter(),
        }
    }
}

#[derive(Debug)]
pub struct Edges<'a> {
    nil: Option<&'a TagSet<NfaId>>,
    map: std::collections::btree_map::Iter<'a, u8, TagSet<NfaId>>,
}

impl<'a> Iterator for Edges<'a> {
    type Item = (Option<u8>, &'a TagSet<NfaId>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(nil) = self.nil.take() {
            return Some((None, nil));
        }

        let (&sym, dst) = self.map.next()?;
        Some((Some(sym), dst))
    }
}

/// An arena of NFA states with a distinguished start state
///
/// States are never removed; every handle produced by [`Nfa::push`] stays
/// valid for the lifetime of the arena.
#[derive(Debug)]
pub struct Nfa {
    nodes: Vec<Node>,
    start: NfaId,
}

impl Default for Nfa {
    fn default() -> Self { Self::new() }
}

impl Nfa {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            start: NfaId(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> NfaId { self.start }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NfaId) -> Option<&Node> { self.nodes.get(id.0) }

    #[inline]
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (NfaId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NfaId(i), n))
    }

    #[inline]
    fn node(&self, id: NfaId) -> &Node {
        self.nodes
            .get(id.0)
            .unwrap_or_else(|| unreachable!("Invalid NFA state {id:?}"))
    }

    #[inline]
    fn node_mut(&mut self, id: NfaId) -> &mut Node {
        self.nodes
            .get_mut(id.0)
            .unwrap_or_else(|| unreachable!("Invalid NFA state {id:?}"))
    }

    #[inline]
    pub fn push(&mut self) -> NfaId {
        let id = NfaId(self.nodes.len());
        self.nodes.push(Node::default());
        id
    }

    #[inline]
    pub fn set_accept(&mut self, id: NfaId, accept: bool) { self.node_mut(id).accept = accept; }

    /// Add an edge from `from` to `to`, consuming `by` or nothing if `by` is
    /// `None`.  Returns false if the edge already existed.
    ///
    /// # Panics
    /// This method panics if `by` is not a valid symbol or either state does
    /// not belong to this NFA.
    pub fn connect(&mut self, from: NfaId, to: NfaId, by: Option<u8>) -> bool {
        assert!(to.0 < self.nodes.len(), "Invalid NFA state {to:?}");
        let from = self.node_mut(from);

        if let Some(sym) = by {
            assert!(is_symbol(sym), "Invalid NFA symbol {sym:#04x}");
            from.map.entry(sym).or_default().add(to)
        } else {
            from.nil.add(to)
        }
    }

    /// Close `set` under epsilon transitions, expanding from the seeds
    /// already queued on `closure`
    pub(crate) fn solve_closure(
        &self,
        closure: &mut ClosureBuilder<NfaId>,
        set: &mut TagSet<NfaId>,
    ) -> bool {
        closure.solve(set, |n| self.node(n).nil.iter().copied())
    }

    /// Union the `sym`-successors of every state in `from`, closed under
    /// epsilon transitions
    pub(crate) fn step(
        &self,
        closure: &mut ClosureBuilder<NfaId>,
        from: &TagSet<NfaId>,
        sym: u8,
    ) -> TagSet<NfaId> {
        let mut to = TagSet::new();
        closure.init(
            from.iter()
                .filter_map(|&n| self.node(n).next(sym))
                .flatten()
                .copied(),
        );
        self.solve_closure(closure, &mut to);
        to
    }

    #[inline]
    pub(crate) fn any_accept(&self, set: &TagSet<NfaId>) -> bool {
        set.iter().any(|&n| self.node(n).accept)
    }

    /// Convert this NFA into an equivalent DFA by subset construction
    #[inline]
    #[must_use]
    pub fn compile(&self) -> Dfa { DfaBuilder::new(self).build() }

    /// Match `input` by tracking every live state at once, without building
    /// a DFA
    #[must_use]
    pub fn simulate(&self, input: &[u8]) -> bool {
        let mut closure = ClosureBuilder::default();
        let mut live = TagSet::new();
        closure.init([self.start]);
        self.solve_closure(&mut closure, &mut live);

        for &byte in input {
            if !is_symbol(byte) {
                return false;
            }

            live = self.step(&mut closure, &live, byte);

            if live.is_empty() {
                return false;
            }
        }

        self.any_accept(&live)
    }

    #[must_use]
    pub fn dot(&self) -> dot::Graph<'static> {
        dot::Graph::state_machine(
            self.nodes().map(|(id, node)| {
                (
                    id.0,
                    node.accept,
                    node.edges()
                        .flat_map(|(sym, dst)| dst.iter().map(move |d| (sym, d.0))),
                )
            }),
            self.start.0,
        )
    }
}
