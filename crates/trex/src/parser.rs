//! Thompson construction straight from pattern text

use crate::nfa::{Nfa, NfaId, is_symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Found extraneous right parenthesis at offset {0}")]
    UnmatchedClose(usize),
    #[error("Byte {0:#04x} at offset {1} is outside the 7-bit alphabet")]
    OutOfAlphabet(u8, usize),
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Char(u8),
    Pipe,
    Star,
    LPar,
    RPar,
    Eof,
}

#[derive(Debug)]
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self { Self { input, pos: 0 } }

    fn literal(byte: u8, pos: usize) -> ParseResult<Token> {
        if is_symbol(byte) {
            Ok(Token::Char(byte))
        } else {
            Err(ParseError::OutOfAlphabet(byte, pos))
        }
    }

    fn scan_next(&mut self) -> ParseResult<(usize, Token)> {
        let pos = self.pos;
        let Some(&byte) = self.input.get(pos) else {
            return Ok((pos, Token::Eof));
        };
        self.pos += 1;

        let tok = match byte {
            b'|' => Token::Pipe,
            b'*' => Token::Star,
            b'(' => Token::LPar,
            b')' => Token::RPar,
            b'\\' => match self.input.get(self.pos) {
                Some(&esc) => {
                    self.pos += 1;
                    Self::literal(esc, pos + 1)?
                },
                // A dangling backslash stands for itself
                None => Token::Char(b'\\'),
            },
            b => Self::literal(b, pos)?,
        };

        Ok((pos, tok))
    }
}

/// One level of parenthesized nesting
#[derive(Debug)]
struct Frame {
    head: NfaId,
    cursor: NfaId,
    branches: Vec<NfaId>,
    open: Option<usize>,
}

impl Frame {
    fn new(head: NfaId, open: Option<usize>) -> Self {
        Self {
            head,
            cursor: head,
            branches: vec![],
            open,
        }
    }
}

#[derive(Debug)]
struct Parser<'a> {
    scanner: Scanner<'a>,
    peeked: Option<(usize, Token)>,
    nfa: Nfa,
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        let nfa = Nfa::new();
        let root = Frame::new(nfa.start(), None);

        Self {
            scanner: Scanner::new(input),
            peeked: None,
            nfa,
            stack: vec![root],
        }
    }

    fn peek(&mut self) -> ParseResult<Token> {
        let (_, tok) = match self.peeked {
            Some(p) => p,
            None => *self.peeked.insert(self.scanner.scan_next()?),
        };
        Ok(tok)
    }

    fn bump(&mut self) -> ParseResult<(usize, Token)> {
        match self.peeked.take() {
            Some(p) => Ok(p),
            None => self.scanner.scan_next(),
        }
    }

    /// Consume any run of stars, returning whether there was one
    fn eat_stars(&mut self) -> ParseResult<bool> {
        let mut any = false;
        while self.peek()? == Token::Star {
            self.bump()?;
            any = true;
        }
        Ok(any)
    }

    #[inline]
    fn depth(&self) -> usize { self.stack.len() - 1 }

    #[inline]
    fn top(&mut self) -> &mut Frame {
        self.stack
            .last_mut()
            .unwrap_or_else(|| unreachable!("Parser stack underflow"))
    }

    #[inline]
    fn connect(&mut self, from: NfaId, to: NfaId, by: Option<u8>) {
        self.nfa.connect(from, to, by);
    }

    fn lit(&mut self, c: u8) -> ParseResult<()> {
        let from = self.top().cursor;

        let to = if self.eat_stars()? {
            // The loop state is fresh, so the self-edge cannot leak into any
            // other branch sharing `from`
            let rep = self.nfa.push();
            self.connect(from, rep, None);
            self.connect(rep, rep, Some(c));
            rep
        } else {
            let next = self.nfa.push();
            self.connect(from, next, Some(c));
            next
        };

        self.top().cursor = to;
        Ok(())
    }

    fn open(&mut self, pos: usize) {
        let from = self.top().cursor;
        let head = self.nfa.push();
        self.connect(from, head, None);
        self.stack.push(Frame::new(head, Some(pos)));
    }

    /// Join every branch of `frame` into a fresh tail state
    fn finish(&mut self, frame: Frame) -> NfaId {
        let Frame {
            cursor, branches, ..
        } = frame;
        let tail = self.nfa.push();

        for end in branches.into_iter().chain([cursor]) {
            self.connect(end, tail, None);
        }

        tail
    }

    fn close(&mut self, starred: impl FnOnce(&mut Self) -> ParseResult<bool>) -> ParseResult<()> {
        let inner = self
            .stack
            .pop()
            .unwrap_or_else(|| unreachable!("Parser stack underflow"));
        let head = inner.head;
        let tail = self.finish(inner);

        if starred(self)? {
            self.connect(head, tail, None);
            self.connect(tail, head, None);
        }

        self.top().cursor = tail;
        Ok(())
    }

    fn run(mut self) -> ParseResult<Nfa> {
        loop {
            let (pos, tok) = self.bump()?;

            match tok {
                Token::Char(c) => self.lit(c)?,
                Token::Pipe => {
                    let frame = self.top();
                    frame.branches.push(frame.cursor);
                    frame.cursor = frame.head;
                },
                // Stars directly after an atom are consumed along with it, so
                // this one has nothing to repeat
                Token::Star => tracing::trace!("Ignoring star with no operand at {pos}"),
                Token::LPar => self.open(pos),
                Token::RPar if self.depth() == 0 => return Err(ParseError::UnmatchedClose(pos)),
                Token::RPar => self.close(Self::eat_stars)?,
                Token::Eof => break,
            }
        }

        while self.depth() > 0 {
            if let Some(open) = self.top().open {
                tracing::debug!("Implicitly closing group opened at offset {open}");
            }

            self.close(|_| Ok(false))?;
        }

        let root = self
            .stack
            .pop()
            .unwrap_or_else(|| unreachable!("Parser stack underflow"));
        let tail = self.finish(root);
        self.nfa.set_accept(tail, true);

        Ok(self.nfa)
    }
}

/// Build an NFA recognizing `pattern`
///
/// The supported syntax is concatenation, alternation (`|`), postfix Kleene
/// star (`*`), grouping (`(` and `)`), and backslash escapes, which make the
/// following byte literal.  A `(` left open at the end of the pattern is
/// closed implicitly.
///
/// # Errors
/// This function returns an error if the pattern contains a `)` with no
/// matching `(`, or a byte outside the range `0x01..=0x7f`.
pub fn parse<P: AsRef<[u8]> + ?Sized>(pattern: &P) -> ParseResult<Nfa> {
    Parser::new(pattern.as_ref()).run()
}

#[cfg(any(test, feature = "proptest"))]
pub use prop::*;

#[cfg(any(test, feature = "proptest"))]
mod prop {
    use proptest::prelude::*;

    /// Well-formed patterns over `a`, `b` and escaped metacharacters
    pub fn pattern(depth: u32, tree_size: u32, branch_size: u32) -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[ab]",
            1 => r"\\[|*()\\]",
            1 => Just(String::new()),
        ]
        .prop_recursive(depth, tree_size, branch_size, move |s| {
            let size = 1..=usize::try_from(branch_size).unwrap();
            prop_oneof![
                prop::collection::vec(s.clone(), size.clone()).prop_map(|v| v.concat()),
                prop::collection::vec(s.clone(), size).prop_map(|v| v.join("|")),
                s.clone().prop_map(|r| format!("({r})")),
                s.prop_map(|r| format!("({r})*")),
            ]
        })
    }
}
