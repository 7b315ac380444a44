//! The comparison engine behind filter expressions like `@.a < $.b`.
//!
//! [`compare`] is total: operands of mismatched or unordered types
//! simply fail the comparison, they never raise an error. `None`
//! stands for the RFC 9535 "Nothing" marker, which only compares equal
//! to itself.

use serde_json::Value;

use crate::filter::ComparisonOperator;

pub fn compare(op: &ComparisonOperator, left: Option<&Value>, right: Option<&Value>) -> bool {
    use ComparisonOperator::*;
    match op {
        Eq => eq(left, right),
        Ne => !eq(left, right),
        Lt => lt(left, right),
        Gt => lt(right, left),
        Le => eq(left, right) || lt(left, right),
        Ge => eq(left, right) || lt(right, left),
    }
}

fn eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => value_eq(left, right),
        _ => false,
    }
}

/// Structural equality with exact cross-type numeric comparison, so
/// `1 == 1.0` holds. Mismatched JSON types are never equal.
fn value_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Number(_), Value::Number(_)) => number_eq(left, right),
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(l, r)| value_eq(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|rv| value_eq(value, rv)))
        }
        _ => false,
    }
}

fn number_eq(left: &Value, right: &Value) -> bool {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Strict less-than. Defined on pairs of numbers and pairs of strings
/// (by Unicode code point), false for everything else.
fn lt(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::String(left)), Some(Value::String(right))) => left < right,
        (Some(left @ Value::Number(_)), Some(right @ Value::Number(_))) => {
            if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
                return left < right;
            }
            match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => left < right,
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ComparisonOperator::*;

    fn sample_values() -> Vec<Value> {
        vec![
            json!(null),
            json!(true),
            json!(false),
            json!(0),
            json!(1),
            json!(1.0),
            json!(-7),
            json!(42.7),
            json!(""),
            json!("a"),
            json!("ab"),
            json!([1, 2, 3]),
            json!({"a": 1, "b": [true, null]}),
        ]
    }

    #[test]
    fn eq_is_reflexive() {
        for value in sample_values() {
            assert!(compare(&Eq, Some(&value), Some(&value)), "{value}");
        }
        assert!(compare(&Eq, None, None));
    }

    #[test]
    fn eq_and_ne_are_symmetric() {
        let values = sample_values();
        for left in values.iter() {
            for right in values.iter() {
                assert_eq!(
                    compare(&Eq, Some(left), Some(right)),
                    compare(&Eq, Some(right), Some(left)),
                );
                assert_eq!(
                    compare(&Ne, Some(left), Some(right)),
                    !compare(&Eq, Some(left), Some(right)),
                );
            }
        }
    }

    #[test]
    fn lt_implies_le_and_excludes_eq_and_gt() {
        let values = sample_values();
        for left in values.iter() {
            for right in values.iter() {
                if compare(&Lt, Some(left), Some(right)) {
                    assert!(compare(&Le, Some(left), Some(right)));
                    assert!(!compare(&Eq, Some(left), Some(right)));
                    assert!(!compare(&Gt, Some(left), Some(right)));
                    assert!(compare(&Gt, Some(right), Some(left)));
                }
            }
        }
    }

    #[test]
    fn int_float_equality_is_exact() {
        assert!(compare(&Eq, Some(&json!(1)), Some(&json!(1.0))));
        assert!(compare(&Eq, Some(&json!(-3)), Some(&json!(-3.0))));
        assert!(!compare(&Eq, Some(&json!(1)), Some(&json!(1.0000001))));
    }

    #[test]
    fn cross_type_numeric_ordering() {
        assert!(compare(&Lt, Some(&json!(1)), Some(&json!(1.5))));
        assert!(compare(&Gt, Some(&json!(2.5)), Some(&json!(2))));
        assert!(compare(&Le, Some(&json!(2)), Some(&json!(2.0))));
        assert!(compare(&Ge, Some(&json!(2)), Some(&json!(2.0))));
    }

    #[test]
    fn string_ordering_is_by_code_point() {
        assert!(compare(&Lt, Some(&json!("a")), Some(&json!("b"))));
        assert!(compare(&Lt, Some(&json!("a")), Some(&json!("ab"))));
        assert!(compare(&Lt, Some(&json!("Z")), Some(&json!("a"))));
    }

    #[test]
    fn mixed_types_are_not_equal() {
        assert!(!compare(&Eq, Some(&json!("13")), Some(&json!(13))));
        assert!(!compare(&Eq, Some(&json!(0)), Some(&json!(false))));
        assert!(!compare(&Eq, Some(&json!(null)), Some(&json!(0))));
        assert!(!compare(&Eq, Some(&json!([])), Some(&json!({}))));
    }

    #[test]
    fn unordered_types_fail_ordering() {
        assert!(!compare(&Lt, Some(&json!(true)), Some(&json!(false))));
        assert!(!compare(&Lt, Some(&json!(null)), Some(&json!(null))));
        assert!(!compare(&Le, Some(&json!([1])), Some(&json!([2]))));
        assert!(!compare(&Lt, Some(&json!("1")), Some(&json!(2))));
    }

    #[test]
    fn nothing_compares_equal_to_nothing_only() {
        assert!(compare(&Eq, None, None));
        assert!(compare(&Le, None, None));
        assert!(compare(&Ge, None, None));
        assert!(!compare(&Eq, None, Some(&json!(null))));
        assert!(!compare(&Lt, None, Some(&json!(1))));
        assert!(!compare(&Lt, None, None));
        assert!(compare(&Ne, None, Some(&json!(1))));
    }

    #[test]
    fn nested_structural_equality() {
        let left = json!({"a": [1, {"b": 2.0}]});
        let right = json!({"a": [1.0, {"b": 2}]});
        assert!(compare(&Eq, Some(&left), Some(&right)));

        let different = json!({"a": [1, {"b": 3}]});
        assert!(!compare(&Eq, Some(&left), Some(&different)));
    }
}
