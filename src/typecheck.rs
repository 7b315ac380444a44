//! Static well-typedness checks for filter expressions, following RFC
//! 9535 section 2.4.3.
//!
//! The checker walks a parsed [`Query`] and rejects comparisons whose
//! operands are not singular, function calls with the wrong arity or
//! argument types, and function results used in the wrong position.
//! Unknown function names are rejected here too.

use crate::{
    env::Environment,
    errors::JSONPathError,
    filter::{FilterExpression, FilterExpressionKind},
    function::{ExpressionType, FunctionSignature},
    query::{Query, Segment, Selector},
};

pub fn check(query: &Query, env: &Environment) -> Result<(), JSONPathError> {
    check_segments(&query.segments, env)
}

fn check_segments(segments: &[Segment], env: &Environment) -> Result<(), JSONPathError> {
    for segment in segments {
        let (Segment::Child { selectors } | Segment::Recursive { selectors }) = segment;
        for selector in selectors {
            if let Selector::Filter { expression } = selector {
                check_logical(expression, env)?;
            }
        }
    }
    Ok(())
}

/// Check an expression in logical position: the top of a filter, an
/// operand of `&&`/`||`/`!`, or a LogicalType function argument.
fn check_logical(expr: &FilterExpression, env: &Environment) -> Result<(), JSONPathError> {
    match &expr.kind {
        FilterExpressionKind::Not { expression } => check_logical(expression, env),
        FilterExpressionKind::Logical { left, right, .. } => {
            check_logical(left, env)?;
            check_logical(right, env)
        }
        FilterExpressionKind::Comparison { left, right, .. } => {
            check_comparable(left, env)?;
            check_comparable(right, env)
        }
        FilterExpressionKind::RelativeQuery { query }
        | FilterExpressionKind::RootQuery { query } => {
            // an existence test
            check_segments(&query.segments, env)
        }
        FilterExpressionKind::Function { name, args } => {
            let signature = resolve_signature(name, expr.position, env)?;
            check_args(name, &signature, args, expr.position, env)?;
            match signature.return_type {
                ExpressionType::Logical => Ok(()),
                _ => Err(JSONPathError::typ(
                    format!("result of {}() must be compared", name),
                    expr.position,
                )),
            }
        }
        _ => Err(JSONPathError::typ(
            String::from("filter expression literals must be compared"),
            expr.position,
        )),
    }
}

/// Check an expression in comparison-operand position, which must
/// resolve to at most one value.
fn check_comparable(expr: &FilterExpression, env: &Environment) -> Result<(), JSONPathError> {
    match &expr.kind {
        _ if expr.is_literal() => Ok(()),
        FilterExpressionKind::RelativeQuery { query }
        | FilterExpressionKind::RootQuery { query } => {
            if query.is_singular() {
                Ok(())
            } else {
                Err(JSONPathError::typ(
                    String::from("non-singular query is not comparable"),
                    expr.position,
                ))
            }
        }
        FilterExpressionKind::Function { name, args } => {
            let signature = resolve_signature(name, expr.position, env)?;
            check_args(name, &signature, args, expr.position, env)?;
            match signature.return_type {
                ExpressionType::Value => Ok(()),
                _ => Err(JSONPathError::typ(
                    format!("result of {}() is not comparable", name),
                    expr.position,
                )),
            }
        }
        _ => Err(JSONPathError::typ(
            String::from("expression is not comparable"),
            expr.position,
        )),
    }
}

fn check_args(
    name: &str,
    signature: &FunctionSignature,
    args: &[FilterExpression],
    position: usize,
    env: &Environment,
) -> Result<(), JSONPathError> {
    let expected = signature.param_types.len();
    if args.len() != expected {
        return Err(JSONPathError::typ(
            format!(
                "{}() takes {} argument{} but {} were given",
                name,
                expected,
                if expected == 1 { "" } else { "s" },
                args.len()
            ),
            position,
        ));
    }

    for (index, (arg, param_type)) in args.iter().zip(&signature.param_types).enumerate() {
        match param_type {
            ExpressionType::Value => check_value_arg(name, arg, index, env)?,
            ExpressionType::Nodes => check_nodes_arg(name, arg, index, env)?,
            ExpressionType::Logical => {
                if arg.is_literal() {
                    return Err(argument_error(name, index, "LogicalType", arg.position));
                }
                check_logical(arg, env)?;
            }
        }
    }

    Ok(())
}

fn check_value_arg(
    name: &str,
    arg: &FilterExpression,
    index: usize,
    env: &Environment,
) -> Result<(), JSONPathError> {
    match &arg.kind {
        _ if arg.is_literal() => Ok(()),
        FilterExpressionKind::RelativeQuery { query } | FilterExpressionKind::RootQuery { query } => {
            if query.is_singular() {
                Ok(())
            } else {
                Err(argument_error(name, index, "ValueType", arg.position))
            }
        }
        FilterExpressionKind::Function {
            name: nested_name,
            args,
        } => {
            let signature = resolve_signature(nested_name, arg.position, env)?;
            check_args(nested_name, &signature, args, arg.position, env)?;
            match signature.return_type {
                ExpressionType::Value => Ok(()),
                _ => Err(argument_error(name, index, "ValueType", arg.position)),
            }
        }
        _ => Err(argument_error(name, index, "ValueType", arg.position)),
    }
}

fn check_nodes_arg(
    name: &str,
    arg: &FilterExpression,
    index: usize,
    env: &Environment,
) -> Result<(), JSONPathError> {
    match &arg.kind {
        FilterExpressionKind::RelativeQuery { query } | FilterExpressionKind::RootQuery { query } => {
            check_segments(&query.segments, env)
        }
        FilterExpressionKind::Function {
            name: nested_name,
            args,
        } => {
            let signature = resolve_signature(nested_name, arg.position, env)?;
            check_args(nested_name, &signature, args, arg.position, env)?;
            match signature.return_type {
                ExpressionType::Nodes => Ok(()),
                _ => Err(argument_error(name, index, "NodesType", arg.position)),
            }
        }
        _ => Err(argument_error(name, index, "NodesType", arg.position)),
    }
}

fn resolve_signature(
    name: &str,
    position: usize,
    env: &Environment,
) -> Result<FunctionSignature, JSONPathError> {
    env.signature(name).ok_or_else(|| {
        JSONPathError::name(format!("unknown function '{}'", name), position)
    })
}

fn argument_error(name: &str, index: usize, expected: &str, position: usize) -> JSONPathError {
    JSONPathError::typ(
        format!("{}() argument {} must be of {}", name, index + 1, expected),
        position,
    )
}
