//! Value reshaping over parsed nodes.
//!
//! A transform never changes what was matched or where. It only decides
//! what the node's flattened values are, and only when someone asks.

use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;
use crate::node::{single_value, Node};
use crate::parser::{Parser, ParserKind};
use crate::value::Value;

type NodeFn = Arc<dyn Fn(&Node) -> Result<Vec<Value>, ValueError> + Send + Sync>;
type ValuesFn = Arc<dyn Fn(Vec<Value>) -> Result<Vec<Value>, ValueError> + Send + Sync>;

/// How a `Transformed` node derives its values from the node it wraps.
#[derive(Clone)]
pub enum Transform {
    /// No values at all.
    Suppress,
    /// All values collected into one `Value::Tuple`.
    Group,
    /// Exactly one value, passed through.
    OnlyValue,
    /// Arbitrary function of the wrapped node.
    Node(NodeFn),
    /// Arbitrary function of the wrapped node's flattened values.
    Values(ValuesFn),
}

impl Transform {
    /// Derive values from `inner`.
    pub fn apply(&self, inner: &Node) -> Result<Vec<Value>, ValueError> {
        match self {
            Transform::Suppress => Ok(Vec::new()),
            Transform::Group => Ok(vec![Value::Tuple(inner.values()?)]),
            Transform::OnlyValue => Ok(vec![single_value(inner.values()?)?]),
            Transform::Node(f) => f(inner),
            Transform::Values(f) => f(inner.values()?),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Transform::Suppress => "Suppress",
            Transform::Group => "Group",
            Transform::OnlyValue => "OnlyValue",
            Transform::Node(_) => "Transform",
            Transform::Values(_) => "TransformValues",
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Built-ins compare by kind, closures by identity.
impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Transform::Suppress, Transform::Suppress)
            | (Transform::Group, Transform::Group)
            | (Transform::OnlyValue, Transform::OnlyValue) => true,
            (Transform::Node(a), Transform::Node(b)) => Arc::ptr_eq(a, b),
            (Transform::Values(a), Transform::Values(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn wrap(parser: Parser, transform: Transform) -> Parser {
    Parser::from_kind(ParserKind::Transform { parser, transform })
}

/// Derive values by calling `f` on the parsed node.
pub fn transform<F>(parser: Parser, f: F) -> Parser
where
    F: Fn(&Node) -> Result<Vec<Value>, ValueError> + Send + Sync + 'static,
{
    wrap(parser, Transform::Node(Arc::new(f)))
}

/// Derive values by calling `f` on the parsed node's flattened values.
pub fn transform_values<F>(parser: Parser, f: F) -> Parser
where
    F: Fn(Vec<Value>) -> Result<Vec<Value>, ValueError> + Send + Sync + 'static,
{
    wrap(parser, Transform::Values(Arc::new(f)))
}

/// Consume input but contribute no values, e.g. for delimiters.
pub fn suppress(parser: Parser) -> Parser {
    wrap(parser, Transform::Suppress)
}

/// Keep the structure of the wrapped values as one nested tuple.
pub fn group(parser: Parser) -> Parser {
    wrap(parser, Transform::Group)
}

/// Require exactly one value; anything else fails when values are read.
pub fn only_value(parser: Parser) -> Parser {
    wrap(parser, Transform::OnlyValue)
}
