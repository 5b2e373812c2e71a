use arbitrary::Arbitrary;
use trex::nfa::Nfa;

/// A pattern and a batch of inputs to run through both matchers
#[derive(Debug, Clone, Arbitrary)]
pub struct Input {
    pattern: Vec<u8>,
    inputs: Vec<Vec<u8>>,
}

#[cfg(not(feature = "trace"))]
fn trace(_: &Nfa) {}

#[cfg(feature = "trace")]
fn trace(nfa: &Nfa) {
    println!("{}", nfa.dot());
    println!("{}", nfa.compile().dot());
}

impl Input {
    pub fn run(&self) {
        let Ok(nfa) = trex::parse(self.pattern.as_slice()) else {
            return;
        };
        trace(&nfa);

        let dfa = nfa.compile();

        for (i, a) in dfa.states() {
            for (j, b) in dfa.states() {
                assert!(i == j || a.tag() != b.tag(), "{i:?} and {j:?} share a tag");
            }
        }

        for input in &self.inputs {
            assert_eq!(
                dfa.is_match(input),
                nfa.simulate(input),
                "Mismatch for pattern {:?} on {:?}",
                self.pattern.escape_ascii().to_string(),
                input.escape_ascii().to_string(),
            );
        }
    }
}
