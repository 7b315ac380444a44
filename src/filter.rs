//! Filter expressions and their evaluation against a current node.

use std::borrow::Cow;
use std::fmt;

use itertools::Itertools;
use serde_json::Value;

use crate::{
    cmp,
    env::ENVIRONMENT,
    function::ExpressionType,
    query::{escape_string, NodeList, Query},
};

/// A node in a filter expression tree, tagged with the byte offset of
/// the token it was parsed from. Offsets are carried for error
/// reporting only and do not take part in equality.
#[derive(Debug, Clone)]
pub struct FilterExpression {
    pub position: usize,
    pub kind: FilterExpressionKind,
}

impl FilterExpression {
    pub fn new(position: usize, kind: FilterExpressionKind) -> Self {
        Self { position, kind }
    }

    pub fn is_literal(&self) -> bool {
        use FilterExpressionKind::*;
        matches!(
            self.kind,
            True | False | Null | String { .. } | Int { .. } | Float { .. }
        )
    }
}

impl PartialEq for FilterExpression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpressionKind {
    True,
    False,
    Null,
    String {
        value: String,
    },
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Not {
        expression: Box<FilterExpression>,
    },
    Logical {
        left: Box<FilterExpression>,
        operator: LogicalOperator,
        right: Box<FilterExpression>,
    },
    Comparison {
        left: Box<FilterExpression>,
        operator: ComparisonOperator,
        right: Box<FilterExpression>,
    },
    RelativeQuery {
        query: Box<Query>,
    },
    RootQuery {
        query: Box<Query>,
    },
    Function {
        name: String,
        args: Vec<FilterExpression>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => f.write_str("=="),
            ComparisonOperator::Ne => f.write_str("!="),
            ComparisonOperator::Ge => f.write_str(">="),
            ComparisonOperator::Gt => f.write_str(">"),
            ComparisonOperator::Le => f.write_str("<="),
            ComparisonOperator::Lt => f.write_str("<"),
        }
    }
}

/// The runtime result of evaluating a filter expression: one of the
/// RFC 9535 expression types, or the distinguished Nothing marker for
/// absent values. Nothing is not JSON `null`.
#[derive(Debug)]
pub enum FilterExpressionResult<'a> {
    Bool(bool),
    Value(Cow<'a, Value>),
    Nodes(NodeList<'a>),
    Nothing,
}

impl FilterExpression {
    /// True if this expression selects the current node `current`.
    pub(crate) fn test(&self, current: &Value, root: &Value) -> bool {
        is_truthy(&self.evaluate(current, root))
    }

    pub(crate) fn evaluate<'a>(
        &self,
        current: &'a Value,
        root: &'a Value,
    ) -> FilterExpressionResult<'a> {
        match &self.kind {
            FilterExpressionKind::True => FilterExpressionResult::Bool(true),
            FilterExpressionKind::False => FilterExpressionResult::Bool(false),
            FilterExpressionKind::Null => FilterExpressionResult::Value(Cow::Owned(Value::Null)),
            FilterExpressionKind::String { value } => {
                FilterExpressionResult::Value(Cow::Owned(Value::String(value.clone())))
            }
            FilterExpressionKind::Int { value } => {
                FilterExpressionResult::Value(Cow::Owned(Value::from(*value)))
            }
            FilterExpressionKind::Float { value } => {
                FilterExpressionResult::Value(Cow::Owned(Value::from(*value)))
            }
            FilterExpressionKind::Not { expression } => {
                FilterExpressionResult::Bool(!is_truthy(&expression.evaluate(current, root)))
            }
            FilterExpressionKind::Logical {
                left,
                operator,
                right,
            } => {
                let rv = match operator {
                    LogicalOperator::And => {
                        is_truthy(&left.evaluate(current, root))
                            && is_truthy(&right.evaluate(current, root))
                    }
                    LogicalOperator::Or => {
                        is_truthy(&left.evaluate(current, root))
                            || is_truthy(&right.evaluate(current, root))
                    }
                };
                FilterExpressionResult::Bool(rv)
            }
            FilterExpressionKind::Comparison {
                left,
                operator,
                right,
            } => {
                let left = single_value(left.evaluate(current, root));
                let right = single_value(right.evaluate(current, root));
                FilterExpressionResult::Bool(cmp::compare(
                    operator,
                    left.as_deref(),
                    right.as_deref(),
                ))
            }
            FilterExpressionKind::RelativeQuery { query } => {
                FilterExpressionResult::Nodes(query.resolve(current, root))
            }
            FilterExpressionKind::RootQuery { query } => {
                FilterExpressionResult::Nodes(query.resolve(root, root))
            }
            FilterExpressionKind::Function { name, args } => {
                let Some(function) = ENVIRONMENT.function_register.get(name) else {
                    // unknown names are rejected at compile time
                    return FilterExpressionResult::Nothing;
                };

                let signature = function.signature();
                let args = args
                    .iter()
                    .enumerate()
                    .map(|(i, expr)| {
                        unpack_argument(
                            expr.evaluate(current, root),
                            signature.param_types.get(i),
                        )
                    })
                    .collect();

                function.call(args)
            }
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterExpressionKind::True => f.write_str("true"),
            FilterExpressionKind::False => f.write_str("false"),
            FilterExpressionKind::Null => f.write_str("null"),
            FilterExpressionKind::String { value } => write!(f, "'{}'", escape_string(value)),
            FilterExpressionKind::Int { value } => write!(f, "{value}"),
            FilterExpressionKind::Float { value } => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            FilterExpressionKind::Not { expression } => write!(f, "!{expression}"),
            FilterExpressionKind::Logical {
                left,
                operator,
                right,
            } => write!(f, "({left} {operator} {right})"),
            FilterExpressionKind::Comparison {
                left,
                operator,
                right,
            } => write!(f, "{left} {operator} {right}"),
            FilterExpressionKind::RelativeQuery { query } => {
                write!(f, "@{}", query.segments.iter().join(""))
            }
            FilterExpressionKind::RootQuery { query } => {
                write!(f, "${}", query.segments.iter().join(""))
            }
            FilterExpressionKind::Function { name, args } => {
                write!(f, "{}({})", name, args.iter().join(", "))
            }
        }
    }
}

/// RFC 9535 truthiness: Nothing and empty node lists are false,
/// booleans are themselves, any other value is true.
pub fn is_truthy(rv: &FilterExpressionResult) -> bool {
    match rv {
        FilterExpressionResult::Nothing => false,
        FilterExpressionResult::Nodes(nodes) => !nodes.is_empty(),
        FilterExpressionResult::Bool(rv) => *rv,
        FilterExpressionResult::Value(_) => true,
    }
}

/// Resolve a comparison operand to at most one value. A singular query
/// yielding no node, or anything that is not a single value, becomes
/// Nothing (`None`).
fn single_value(rv: FilterExpressionResult) -> Option<Cow<'_, Value>> {
    match rv {
        FilterExpressionResult::Value(value) => Some(value),
        FilterExpressionResult::Nodes(nodes) => match nodes.as_slice() {
            [node] => Some(Cow::Borrowed(*node)),
            _ => None,
        },
        _ => None,
    }
}

/// Convert a function argument to the declared parameter type at the
/// call boundary, per RFC 9535 section 2.4.2.
fn unpack_argument<'a>(
    rv: FilterExpressionResult<'a>,
    param_type: Option<&ExpressionType>,
) -> FilterExpressionResult<'a> {
    match param_type {
        Some(ExpressionType::Value) => match rv {
            FilterExpressionResult::Nodes(nodes) => match nodes.as_slice() {
                [node] => FilterExpressionResult::Value(Cow::Borrowed(*node)),
                _ => FilterExpressionResult::Nothing,
            },
            _ => rv,
        },
        Some(ExpressionType::Logical) => match rv {
            FilterExpressionResult::Nodes(nodes) => {
                FilterExpressionResult::Bool(!nodes.is_empty())
            }
            _ => rv,
        },
        _ => rv,
    }
}
