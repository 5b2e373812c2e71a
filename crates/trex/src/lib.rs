//! A tiny regular expression engine
//!
//! Patterns are parsed directly into a Thompson NFA, which is then converted
//! into a DFA by subset construction.  Only the DFA is kept, so matching is a
//! single linear pass over the input with no backtracking.
//!
//! ```
//! let re = trex::compile("(ab|a)*").unwrap();
//!
//! assert!(re.is_match("aba"));
//! assert!(!re.is_match("abb"));
//! ```

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::str::FromStr;

mod closure_builder;
pub mod dfa;
pub mod dot;
pub mod nfa;
pub mod parser;
pub mod tag_set;

pub use parser::{ParseError, parse};

/// A pattern compiled down to a DFA
///
/// The NFA built while parsing is discarded once compilation finishes.
/// A `Regex` is immutable, and can be shared freely between threads.
#[derive(Debug)]
pub struct Regex {
    dfa: dfa::Dfa,
}

impl Regex {
    /// Compile `pattern`
    ///
    /// # Errors
    /// This function returns an error if the pattern fails to parse.  No
    /// partial automaton is produced in that case.
    pub fn new<P: AsRef<[u8]> + ?Sized>(pattern: &P) -> Result<Self, ParseError> {
        let nfa = parse(pattern)?;
        let dfa = nfa.compile();

        tracing::debug!(
            pattern = %pattern.as_ref().escape_ascii(),
            nfa_states = nfa.len(),
            dfa_states = dfa.len(),
            "Compiled pattern"
        );

        Ok(Self { dfa })
    }

    /// Test whether the whole of `input` belongs to this pattern's language
    #[inline]
    #[must_use]
    pub fn is_match<I: AsRef<[u8]> + ?Sized>(&self, input: &I) -> bool {
        self.dfa.is_match(input.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn dfa(&self) -> &dfa::Dfa { &self.dfa }
}

impl FromStr for Regex {
    type Err = ParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

/// Shorthand for [`Regex::new`]
///
/// # Errors
/// This function returns an error if the pattern fails to parse.
#[inline]
pub fn compile<P: AsRef<[u8]> + ?Sized>(pattern: &P) -> Result<Regex, ParseError> {
    Regex::new(pattern)
}
