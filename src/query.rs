//! The JSONPath query syntax tree and its evaluation.
//!
//! A [`Query`] contains zero or more [`Segment`]s, each holding one or
//! more [`Selector`]s. Filter selectors carry a tree of
//! [`FilterExpression`]s, defined in [`crate::filter`].
//!
//! Evaluation never fails. Selecting a member that does not exist, an
//! index out of range or a filter over a scalar all contribute nothing
//! to the node list.
//!
//! Object members are visited in lexicographic key order wherever a
//! wildcard, filter or descendant segment enumerates an object. RFC
//! 9535 leaves this order to the implementation; we pin it down so
//! results are reproducible.

use std::fmt::{self, Write};

use itertools::Itertools;
use lazy_static::lazy_static;
use serde_json::Value;

use crate::{
    env::ENVIRONMENT,
    errors::JSONPathError,
    filter::FilterExpression,
    lexer::{is_name_char, is_name_first},
    parser::Parser,
    typecheck,
};

lazy_static! {
    static ref PARSER: Parser = Parser::new();
}

/// An ordered sequence of references into the queried document.
pub type NodeList<'a> = Vec<&'a Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub segments: Vec<Segment>,
}

impl Query {
    /// Compile `expr` against the standard function extensions defined
    /// by RFC 9535: `length`, `count`, `match`, `search` and `value`.
    pub fn standard(expr: &str) -> Result<Self, JSONPathError> {
        let query = PARSER.parse(expr)?;
        typecheck::check(&query, &ENVIRONMENT)?;
        Ok(query)
    }

    /// Apply this query to `root`, returning the selected nodes in
    /// document traversal order.
    pub fn find<'a>(&self, root: &'a Value) -> NodeList<'a> {
        self.resolve(root, root)
    }

    /// Apply this query starting from `start`, with `$` bound to
    /// `root`. For a top-level query the two are the same value; inside
    /// a filter, `start` is the current node.
    pub(crate) fn resolve<'a>(&self, start: &'a Value, root: &'a Value) -> NodeList<'a> {
        self.segments
            .iter()
            .fold(vec![start], |nodes, segment| segment.resolve(nodes, root))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A singular query addresses at most one node: every segment is a
    /// single name or index selector.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| {
            if let Segment::Child { selectors } = segment {
                return selectors.len() == 1
                    && selectors.first().is_some_and(|selector| {
                        matches!(selector, Selector::Name { .. } | Selector::Index { .. })
                    });
            }
            false
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.segments.iter().join(""))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Child { selectors: Vec<Selector> },
    Recursive { selectors: Vec<Selector> },
}

impl Segment {
    fn resolve<'a>(&self, nodes: NodeList<'a>, root: &'a Value) -> NodeList<'a> {
        match self {
            Segment::Child { selectors } => nodes
                .iter()
                .flat_map(|&node| {
                    selectors
                        .iter()
                        .flat_map(move |selector| selector.resolve(node, root, false))
                })
                .collect(),
            Segment::Recursive { selectors } => nodes
                .iter()
                .flat_map(|&node| {
                    selectors
                        .iter()
                        .flat_map(move |selector| selector.resolve(node, root, true))
                })
                .collect(),
        }
    }

    fn shorthand_name(&self) -> Option<&str> {
        let (Segment::Child { selectors } | Segment::Recursive { selectors }) = self;
        match selectors.as_slice() {
            [Selector::Name { name }] if is_shorthand_safe(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.shorthand_name() {
            return match self {
                Segment::Child { .. } => write!(f, ".{}", name),
                Segment::Recursive { .. } => write!(f, "..{}", name),
            };
        }

        match self {
            Segment::Child { selectors } => {
                write!(f, "[{}]", selectors.iter().join(", "))
            }
            Segment::Recursive { selectors } => {
                write!(f, "..[{}]", selectors.iter().join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Name {
        name: String,
    },
    Index {
        index: i64,
    },
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Wild,
    Filter {
        expression: Box<FilterExpression>,
    },
}

impl Selector {
    /// Select from `node`. With `recursive` set, the selector is also
    /// applied to every descendant of `node`, the node's own matches
    /// first.
    fn resolve<'a>(&self, node: &'a Value, root: &'a Value, recursive: bool) -> NodeList<'a> {
        let mut nodes: NodeList<'a> = Vec::new();

        match self {
            Selector::Name { name } => {
                if let Value::Object(obj) = node {
                    if let Some(value) = obj.get(name) {
                        nodes.push(value);
                    }
                }
                if recursive {
                    for child in children(node) {
                        nodes.extend(self.resolve(child, root, true));
                    }
                }
            }
            Selector::Index { index } => {
                if let Value::Array(array) = node {
                    let length = array.len() as i64;
                    let norm = if *index < 0 { index + length } else { *index };
                    if (0..length).contains(&norm) {
                        nodes.push(&array[norm as usize]);
                    }
                }
                if recursive {
                    for child in children(node) {
                        nodes.extend(self.resolve(child, root, true));
                    }
                }
            }
            Selector::Slice { start, stop, step } => {
                if let Value::Array(array) = node {
                    nodes.extend(slice(array, *start, *stop, *step));
                }
                if recursive {
                    for child in children(node) {
                        nodes.extend(self.resolve(child, root, true));
                    }
                }
            }
            Selector::Wild => match node {
                Value::Array(array) => {
                    nodes.extend(array.iter());
                    if recursive {
                        for element in array {
                            nodes.extend(self.resolve(element, root, true));
                        }
                    }
                }
                Value::Object(obj) => {
                    for value in obj.values() {
                        nodes.push(value);
                        if recursive {
                            nodes.extend(self.resolve(value, root, true));
                        }
                    }
                }
                _ => (),
            },
            Selector::Filter { expression } => match node {
                Value::Array(array) => {
                    for element in array {
                        if expression.test(element, root) {
                            nodes.push(element);
                        }
                    }
                    if recursive {
                        for element in array {
                            nodes.extend(self.resolve(element, root, true));
                        }
                    }
                }
                Value::Object(obj) => {
                    for value in obj.values() {
                        if expression.test(value, root) {
                            nodes.push(value);
                        }
                        if recursive {
                            nodes.extend(self.resolve(value, root, true));
                        }
                    }
                }
                _ => (),
            },
        }

        nodes
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name { name } => write!(f, "'{}'", escape_string(name)),
            Selector::Index { index } => write!(f, "{index}"),
            Selector::Slice { start, stop, step } => {
                if let Some(i) = start {
                    write!(f, "{i}")?;
                }
                f.write_char(':')?;
                if let Some(i) = stop {
                    write!(f, "{i}")?;
                }
                if let Some(i) = step {
                    write!(f, ":{i}")?;
                }
                Ok(())
            }
            Selector::Wild => f.write_char('*'),
            Selector::Filter { expression } => write!(f, "?{expression}"),
        }
    }
}

/// The immediate children of `node`: array elements in index order, or
/// object member values in sorted key order. Scalars have none.
fn children(node: &Value) -> NodeList<'_> {
    match node {
        Value::Array(array) => array.iter().collect(),
        Value::Object(obj) => obj.values().collect(),
        _ => Vec::new(),
    }
}

/// Array slicing per RFC 9535 section 2.3.4.2. Out of range bounds are
/// clamped and a zero step selects nothing.
fn slice(array: &[Value], start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> NodeList<'_> {
    let length = array.len() as i64;
    let step = step.unwrap_or(1);

    if length == 0 || step == 0 {
        return Vec::new();
    }

    let normalize = |index: i64| {
        if index < 0 {
            length + index
        } else {
            index
        }
    };

    let mut nodes: NodeList = Vec::new();

    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, length);
        let upper = normalize(stop.unwrap_or(length)).clamp(0, length);

        let mut i = lower;
        while i < upper {
            nodes.push(&array[i as usize]);
            i += step;
        }
    } else {
        let upper = normalize(start.unwrap_or(length - 1)).clamp(-1, length - 1);
        let lower = normalize(stop.unwrap_or(-length - 1)).clamp(-1, length - 1);

        let mut i = upper;
        while i > lower {
            nodes.push(&array[i as usize]);
            i += step;
        }
    }

    nodes
}

fn is_shorthand_safe(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if is_name_first(ch) => chars.all(is_name_char),
        _ => false,
    }
}

/// Escape `value` for display inside a single-quoted string literal.
pub(crate) fn escape_string(value: &str) -> String {
    let mut rv = String::new();
    for ch in value.chars() {
        match ch {
            '\'' => rv.push_str("\\'"),
            '\\' => rv.push_str("\\\\"),
            '\x08' => rv.push_str("\\b"),
            '\x0C' => rv.push_str("\\f"),
            '\n' => rv.push_str("\\n"),
            '\r' => rv.push_str("\\r"),
            '\t' => rv.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                rv.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => rv.push(ch),
        }
    }
    rv
}
