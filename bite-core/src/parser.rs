//! Parsers: primitives, combinators, and the builders composing them.
//!
//! A [`Parser`] is a cheap, shareable handle to an immutable grammar node.
//! Evaluating it is a pure function of the buffer contents and the start
//! offset, so one grammar can serve any number of buffers, including from
//! several threads at once.
//!
//! # Failure propagation
//!
//! ```text
//! primitive      mismatch            -> UnmetExpectation(self, loc)
//! And            child fails         -> child's error, unmodified
//! MatchFirst     all choices fail    -> UnmetExpectation(self, loc)
//! Repeat         fewer than min      -> child's error, unmodified
//!                later failure       -> stop, success
//! Opt            child fails         -> zero-width success
//! Not            child succeeds      -> UnmetExpectation(self, loc)
//! ```
//!
//! Only `UnmetExpectation` is ever intercepted; fatal errors (unbound
//! forward, source failure, value errors) pass through everything.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::buffer::{ByteRange, ParserBuffer};
use crate::error::{ParseError, ValueError};
use crate::node::Node;
use crate::transform::Transform;
use crate::value::Value;

/// Membership set over all 256 byte values.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[usize::from(byte >> 6)] & (1 << (byte & 63)) != 0
    }

    #[inline]
    pub fn insert(&mut self, byte: u8) {
        self.0[usize::from(byte >> 6)] |= 1 << (byte & 63);
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&b| self.contains(b))
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::default();
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<u8> = self.iter().collect();
        write!(f, "b\"{}\"", members.escape_ascii())
    }
}

/// Assign-once target of a `Forward` parser, shared by all its clones.
#[derive(Clone, Default)]
pub struct ForwardCell(Arc<OnceLock<Parser>>);

impl ForwardCell {
    pub fn is_bound(&self) -> bool {
        self.0.get().is_some()
    }
}

impl fmt::Debug for ForwardCell {
    // Never print the target: recursive grammars would not terminate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_bound() { "bound" } else { "unbound" };
        write!(f, "ForwardCell({state})")
    }
}

/// Builds the parser for the counted part once the count is known.
#[derive(Clone)]
pub struct CountedFactory(Arc<dyn Fn(usize) -> Parser + Send + Sync>);

impl fmt::Debug for CountedFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CountedFactory")
    }
}

/// The closed set of parser shapes.
#[derive(Debug, Clone)]
pub enum ParserKind {
    Literal(Vec<u8>),
    /// `folded` is the ASCII-lowercased literal, computed once.
    CaselessLiteral { literal: Vec<u8>, folded: Vec<u8> },
    CharacterSet { set: ByteSet, invert: bool },
    FixedByteCount(usize),
    And(Vec<Parser>),
    MatchFirst(Vec<Parser>),
    /// `max: None` is unbounded.
    Repeat { parser: Parser, min: usize, max: Option<usize> },
    Opt(Parser),
    Not(Parser),
    Forward(ForwardCell),
    Counted { count: Parser, factory: CountedFactory },
    Combine(Parser),
    Transform { parser: Parser, transform: Transform },
}

#[derive(Debug, Clone)]
struct ParserInner {
    name: Option<Arc<str>>,
    kind: ParserKind,
}

/// A grammar node. Clones share the same node.
///
/// Equality is identity: two parsers are equal when they are clones.
#[derive(Clone)]
pub struct Parser(Arc<ParserInner>);

impl Parser {
    pub fn from_kind(kind: ParserKind) -> Self {
        Self(Arc::new(ParserInner { name: None, kind }))
    }

    /// Give this parser a display name, used as node label and in errors.
    pub fn named(self, name: impl Into<Arc<str>>) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.0);
        inner.name = Some(name.into());
        Self(Arc::new(inner))
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> &ParserKind {
        &self.0.kind
    }

    /// Bind the target of a `Forward`.
    ///
    /// Hands `target` back if this is not a `Forward` or is already bound.
    pub fn bind(&self, target: Parser) -> Result<(), Parser> {
        match self.kind() {
            ParserKind::Forward(cell) => cell.0.set(target),
            _ => Err(target),
        }
    }

    /// Sequence: `self` then `other`, extending `self` if it is already an `And`.
    pub fn then(self, other: Parser) -> Parser {
        match self.kind() {
            ParserKind::And(parsers) => {
                let name = format!("{self} + ({other})");
                let mut parsers = parsers.clone();
                parsers.push(other);
                and(parsers).named(name)
            }
            _ => {
                let name = format!("({self}) + ({other})");
                and([self, other]).named(name)
            }
        }
    }

    /// Ordered choice: `self` else `other`, extending `self` if it is already
    /// a `MatchFirst`.
    pub fn or(self, other: Parser) -> Parser {
        match self.kind() {
            ParserKind::MatchFirst(choices) => {
                let name = format!("{self} | ({other})");
                let mut choices = choices.clone();
                choices.push(other);
                match_first(choices).named(name)
            }
            _ => {
                let name = format!("({self}) | ({other})");
                match_first([self, other]).named(name)
            }
        }
    }

    /// Between `min` and `max` repetitions; `None` leaves it unbounded.
    pub fn times(self, min: usize, max: Option<usize>) -> Parser {
        let name = match max {
            Some(max) => format!("({self})[{min}, {max}]"),
            None => format!("({self})[{min}, ...]"),
        };
        repeated(self, min, max).named(name)
    }

    /// Exactly `n` repetitions.
    pub fn exactly(self, n: usize) -> Parser {
        self.times(n, Some(n))
    }

    /// Match at `loc`, producing a node or the reason it did not match.
    pub fn parse<B>(&self, buf: &mut B, loc: usize) -> Result<Node, ParseError>
    where
        B: ParserBuffer + ?Sized,
    {
        let node = match self.kind() {
            ParserKind::Literal(literal) => {
                let end = loc + literal.len();
                if buf.get(ByteRange::from(loc..end))? != *literal {
                    return Err(ParseError::unmet(self, loc));
                }
                Node::leaf(literal.clone(), loc, end)
            }

            ParserKind::CaselessLiteral { literal, folded } => {
                let end = loc + literal.len();
                if buf.get(ByteRange::from(loc..end))?.to_ascii_lowercase() != *folded {
                    return Err(ParseError::unmet(self, loc));
                }
                Node::leaf(literal.clone(), loc, end)
            }

            ParserKind::CharacterSet { set, invert } => {
                match buf.get(ByteRange::window(loc, 1))?[..] {
                    [byte] if set.contains(byte) != *invert => Node::leaf(vec![byte], loc, loc + 1),
                    _ => return Err(ParseError::unmet(self, loc)),
                }
            }

            ParserKind::FixedByteCount(count) => {
                let bytes = buf.get(ByteRange::window(loc, *count))?;
                if bytes.len() != *count {
                    return Err(ParseError::unmet(self, loc));
                }
                Node::leaf(bytes, loc, loc + count)
            }

            ParserKind::And(parsers) => {
                let mut children = Vec::with_capacity(parsers.len());
                let mut at = loc;
                for parser in parsers {
                    let child = parser.parse(buf, at)?;
                    at = child.end_loc();
                    children.push(child);
                }
                Node::sequence(children, loc)
            }

            ParserKind::MatchFirst(choices) => {
                let mut found = None;
                for (index, choice) in choices.iter().enumerate() {
                    match choice.parse(buf, loc) {
                        Ok(chosen) => {
                            found = Some(Node::choice(chosen, index));
                            break;
                        }
                        Err(e) if e.is_backtrackable() => continue,
                        Err(e) => return Err(e),
                    }
                }
                found.ok_or_else(|| ParseError::unmet(self, loc))?
            }

            ParserKind::Repeat { parser, min, max } => {
                // `min` may come from the input (via `Counted`); grow as matches arrive.
                let mut children = Vec::new();
                let mut at = loc;
                for _ in 0..*min {
                    let child = parser.parse(buf, at)?;
                    at = child.end_loc();
                    children.push(child);
                }
                while max.map_or(true, |max| children.len() < max) {
                    match parser.parse(buf, at) {
                        Ok(child) => {
                            let end = child.end_loc();
                            children.push(child);
                            // A zero-width match would repeat forever.
                            if end == at {
                                break;
                            }
                            at = end;
                        }
                        Err(e) if e.is_backtrackable() => break,
                        Err(e) => return Err(e),
                    }
                }
                Node::sequence(children, loc)
            }

            ParserKind::Opt(parser) => match parser.parse(buf, loc) {
                Ok(inner) => Node::optional(Some(inner), loc),
                Err(e) if e.is_backtrackable() => Node::optional(None, loc),
                Err(e) => return Err(e),
            },

            ParserKind::Not(parser) => match parser.parse(buf, loc) {
                Ok(_) => return Err(ParseError::unmet(self, loc)),
                Err(e) if e.is_backtrackable() => Node::nil(loc),
                Err(e) => return Err(e),
            },

            ParserKind::Forward(cell) => match cell.0.get() {
                Some(target) => return target.parse(buf, loc),
                None => {
                    log_debug!("forward parser {} used before it was bound", self);
                    return Err(ParseError::UnboundForward {
                        name: self.to_string(),
                    });
                }
            },

            ParserKind::Counted { count, factory } => {
                let count = count.parse(buf, loc)?;
                let n = count.value()?.as_count().ok_or(ValueError::ExpectedCount)?;
                let counted = (factory.0)(n).parse(buf, count.end_loc())?;
                Node::counted(count, counted)
            }

            ParserKind::Combine(parser) => {
                let inner = parser.parse(buf, loc)?;
                let mut bytes = Vec::new();
                for value in inner.values()? {
                    match value {
                        Value::Bytes(b) => bytes.extend_from_slice(&b),
                        _ => return Err(ValueError::ExpectedBytes.into()),
                    }
                }
                Node::leaf(bytes, inner.start_loc(), inner.end_loc())
            }

            ParserKind::Transform { parser, transform } => {
                Node::transformed(parser.parse(buf, loc)?, transform.clone())
            }
        };
        Ok(node.with_name(self.0.name.as_ref()))
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parsers: &[Parser], sep: &str) -> fmt::Result {
    for (i, parser) in parsers.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "({parser})")?;
    }
    Ok(())
}

/// The explicit name, or a rendering of the parser's structure.
impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        match self.kind() {
            ParserKind::Literal(literal) => write!(f, "b\"{}\"", literal.escape_ascii()),
            ParserKind::CaselessLiteral { literal, .. } => {
                write!(f, "CaselessLiteral(b\"{}\")", literal.escape_ascii())
            }
            ParserKind::CharacterSet { set, invert: false } => write!(f, "CharacterSet({set:?})"),
            ParserKind::CharacterSet { set, invert: true } => {
                write!(f, "CharacterSet(not {set:?})")
            }
            ParserKind::FixedByteCount(count) => write!(f, "FixedByteCount({count})"),
            ParserKind::And(parsers) if parsers.is_empty() => f.write_str("And()"),
            ParserKind::And(parsers) => write_joined(f, parsers, " + "),
            ParserKind::MatchFirst(choices) if choices.is_empty() => f.write_str("MatchFirst()"),
            ParserKind::MatchFirst(choices) => write_joined(f, choices, " | "),
            ParserKind::Repeat { parser, min, max: Some(max) } => {
                write!(f, "({parser})[{min}, {max}]")
            }
            ParserKind::Repeat { parser, min, max: None } => write!(f, "({parser})[{min}, ...]"),
            ParserKind::Opt(parser) => write!(f, "Opt({parser})"),
            ParserKind::Not(parser) => write!(f, "Not({parser})"),
            ParserKind::Forward(_) => f.write_str("Forward"),
            ParserKind::Counted { count, .. } => write!(f, "Counted({count})"),
            ParserKind::Combine(parser) => write!(f, "Combine({parser})"),
            ParserKind::Transform { parser, transform } => {
                write!(f, "{}({parser})", transform.label())
            }
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parser").field(&format_args!("{self}")).finish()
    }
}

impl PartialEq for Parser {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Parser {}

// ============================================================================
// Primitives
// ============================================================================

/// Match `literal` exactly.
pub fn literal(literal: impl AsRef<[u8]>) -> Parser {
    Parser::from_kind(ParserKind::Literal(literal.as_ref().to_vec()))
}

/// Match `literal` ignoring ASCII case. The node carries `literal` as given.
pub fn caseless_literal(literal: impl AsRef<[u8]>) -> Parser {
    let literal = literal.as_ref().to_vec();
    let folded = literal.to_ascii_lowercase();
    Parser::from_kind(ParserKind::CaselessLiteral { literal, folded })
}

/// Match one byte contained in `chars`.
pub fn character_set(chars: impl AsRef<[u8]>) -> Parser {
    let set = chars.as_ref().iter().copied().collect();
    Parser::from_kind(ParserKind::CharacterSet { set, invert: false })
}

/// Match one byte not contained in `chars`.
pub fn inverted_character_set(chars: impl AsRef<[u8]>) -> Parser {
    let set = chars.as_ref().iter().copied().collect();
    Parser::from_kind(ParserKind::CharacterSet { set, invert: true })
}

/// Match any `count` bytes.
pub fn fixed_byte_count(count: usize) -> Parser {
    Parser::from_kind(ParserKind::FixedByteCount(count))
}

// ============================================================================
// Combinators
// ============================================================================

pub fn and(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    Parser::from_kind(ParserKind::And(parsers.into_iter().collect()))
}

pub fn match_first(choices: impl IntoIterator<Item = Parser>) -> Parser {
    Parser::from_kind(ParserKind::MatchFirst(choices.into_iter().collect()))
}

pub fn repeated(parser: Parser, min: usize, max: Option<usize>) -> Parser {
    Parser::from_kind(ParserKind::Repeat { parser, min, max })
}

pub fn zero_or_more(parser: Parser) -> Parser {
    repeated(parser, 0, None)
}

pub fn one_or_more(parser: Parser) -> Parser {
    repeated(parser, 1, None)
}

pub fn opt(parser: Parser) -> Parser {
    Parser::from_kind(ParserKind::Opt(parser))
}

/// Negative lookahead; consumes nothing.
pub fn not(parser: Parser) -> Parser {
    Parser::from_kind(ParserKind::Not(parser))
}

/// Placeholder for recursive grammars; [`Parser::bind`] it before parsing.
pub fn forward() -> Parser {
    Parser::from_kind(ParserKind::Forward(ForwardCell::default()))
}

/// Length-prefixed field: `count`'s single integer value picks the parser
/// `factory` builds for what follows.
pub fn counted<F>(count: Parser, factory: F) -> Parser
where
    F: Fn(usize) -> Parser + Send + Sync + 'static,
{
    Parser::from_kind(ParserKind::Counted {
        count,
        factory: CountedFactory(Arc::new(factory)),
    })
}

/// Join every byte value produced under `parser` into one leaf.
pub fn combine(parser: Parser) -> Parser {
    Parser::from_kind(ParserKind::Combine(parser))
}

// ============================================================================
// Composition builders
// ============================================================================

/// Chain parsers with [`Parser::then`]. Empty input matches nothing, always.
pub fn sequence(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let mut parsers = parsers.into_iter();
    match parsers.next() {
        Some(first) => parsers.fold(first, Parser::then),
        None => and([]),
    }
}

/// Chain alternatives with [`Parser::or`]. Empty input never matches.
pub fn first_of(choices: impl IntoIterator<Item = Parser>) -> Parser {
    let mut choices = choices.into_iter();
    match choices.next() {
        Some(first) => choices.fold(first, Parser::or),
        None => match_first([]),
    }
}

/// Named form of [`repeated`]; see [`Parser::times`].
pub fn repeat(parser: Parser, min: usize, max: Option<usize>) -> Parser {
    parser.times(min, max)
}

pub fn exactly(parser: Parser, n: usize) -> Parser {
    parser.exactly(n)
}
