//! Parse-tree nodes.
//!
//! A node records what matched and where; its values are derived on demand
//! from the retained structure. Location rules per variant:
//!
//! ```text
//! Leaf         start..end as matched
//! Nil          loc..loc
//! Sequence     first child start .. last child end, or loc..loc if empty
//! Choice       same as the chosen node
//! Optional     same as inner, or loc..loc if absent
//! Counted      count start .. counted end
//! Transformed  same as inner
//! ```

use std::sync::Arc;

use crate::error::ValueError;
use crate::transform::Transform;
use crate::value::Value;

/// A parse tree node, labelled with the name of the parser that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<Arc<str>>,
    pub kind: NodeKind,
}

/// The closed set of node shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Matched payload of a primitive (or of `Combine`).
    Leaf {
        bytes: Vec<u8>,
        start: usize,
        end: usize,
    },

    /// Zero-width success.
    Nil { loc: usize },

    /// Result of `And` and `Repeat`.
    Sequence { children: Vec<Node>, loc: usize },

    /// Result of `MatchFirst`.
    Choice { chosen: Box<Node>, choice_index: usize },

    /// Result of `Opt`.
    Optional { inner: Option<Box<Node>>, loc: usize },

    /// Result of `Counted`.
    Counted { count: Box<Node>, counted: Box<Node> },

    /// Result of the transform layer; values computed lazily.
    Transformed { inner: Box<Node>, transform: Transform },
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self { name: None, kind }
    }

    pub fn leaf(bytes: impl Into<Vec<u8>>, start: usize, end: usize) -> Self {
        Self::new(NodeKind::Leaf {
            bytes: bytes.into(),
            start,
            end,
        })
    }

    pub fn nil(loc: usize) -> Self {
        Self::new(NodeKind::Nil { loc })
    }

    pub fn sequence(children: Vec<Node>, loc: usize) -> Self {
        Self::new(NodeKind::Sequence { children, loc })
    }

    pub fn choice(chosen: Node, choice_index: usize) -> Self {
        Self::new(NodeKind::Choice {
            chosen: Box::new(chosen),
            choice_index,
        })
    }

    pub fn optional(inner: Option<Node>, loc: usize) -> Self {
        Self::new(NodeKind::Optional {
            inner: inner.map(Box::new),
            loc,
        })
    }

    pub fn counted(count: Node, counted: Node) -> Self {
        Self::new(NodeKind::Counted {
            count: Box::new(count),
            counted: Box::new(counted),
        })
    }

    pub fn transformed(inner: Node, transform: Transform) -> Self {
        Self::new(NodeKind::Transformed {
            inner: Box::new(inner),
            transform,
        })
    }

    /// Attach a label.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn with_name(mut self, name: Option<&Arc<str>>) -> Self {
        self.name = name.cloned();
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn start_loc(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { start, .. } => *start,
            NodeKind::Nil { loc } => *loc,
            NodeKind::Sequence { children, loc } => {
                children.first().map_or(*loc, Node::start_loc)
            }
            NodeKind::Choice { chosen, .. } => chosen.start_loc(),
            NodeKind::Optional { inner, loc } => inner.as_ref().map_or(*loc, |n| n.start_loc()),
            NodeKind::Counted { count, .. } => count.start_loc(),
            NodeKind::Transformed { inner, .. } => inner.start_loc(),
        }
    }

    pub fn end_loc(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { end, .. } => *end,
            NodeKind::Nil { loc } => *loc,
            NodeKind::Sequence { children, loc } => children.last().map_or(*loc, Node::end_loc),
            NodeKind::Choice { chosen, .. } => chosen.end_loc(),
            NodeKind::Optional { inner, loc } => inner.as_ref().map_or(*loc, |n| n.end_loc()),
            NodeKind::Counted { counted, .. } => counted.end_loc(),
            NodeKind::Transformed { inner, .. } => inner.end_loc(),
        }
    }

    /// Number of bytes spanned.
    #[inline]
    pub fn width(&self) -> usize {
        self.end_loc() - self.start_loc()
    }

    /// The flattened value sequence of this subtree.
    ///
    /// Transforms run here, not at parse time, so this can fail.
    pub fn values(&self) -> Result<Vec<Value>, ValueError> {
        match &self.kind {
            NodeKind::Leaf { bytes, .. } => Ok(vec![Value::Bytes(bytes.clone())]),
            NodeKind::Nil { .. } | NodeKind::Optional { inner: None, .. } => Ok(Vec::new()),
            NodeKind::Sequence { children, .. } => {
                let mut values = Vec::with_capacity(children.len());
                for child in children {
                    values.extend(child.values()?);
                }
                Ok(values)
            }
            NodeKind::Choice { chosen, .. } => chosen.values(),
            NodeKind::Optional { inner: Some(inner), .. } => inner.values(),
            NodeKind::Counted { counted, .. } => counted.values(),
            NodeKind::Transformed { inner, transform } => transform.apply(inner),
        }
    }

    /// The single value of this subtree.
    pub fn value(&self) -> Result<Value, ValueError> {
        single_value(self.values()?)
    }
}

pub(crate) fn single_value(mut values: Vec<Value>) -> Result<Value, ValueError> {
    match values.len() {
        1 => Ok(values.remove(0)),
        count => Err(ValueError::ExpectedSingleValue { count }),
    }
}
