//! The five function extensions defined by RFC 9535.

use std::{borrow::Cow, num::NonZeroUsize, sync::Mutex};

use lru::LruCache;
use regex::Regex;

use crate::{
    filter::FilterExpressionResult,
    function::{ExpressionType, FunctionExtension, FunctionSignature},
};

const REGEX_CACHE_SIZE: usize = 100;

pub struct Length;

impl Length {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Length {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a> {
        match args.into_iter().next() {
            Some(FilterExpressionResult::Value(value)) => {
                let length = match value.as_ref() {
                    serde_json::Value::String(s) => s.chars().count(),
                    serde_json::Value::Array(a) => a.len(),
                    serde_json::Value::Object(o) => o.len(),
                    _ => return FilterExpressionResult::Nothing,
                };
                FilterExpressionResult::Value(Cow::Owned(serde_json::Value::from(length)))
            }
            _ => FilterExpressionResult::Nothing,
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value],
            return_type: ExpressionType::Value,
        }
    }
}

pub struct Count;

impl Count {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Count {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Count {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a> {
        match args.into_iter().next() {
            Some(FilterExpressionResult::Nodes(nodes)) => FilterExpressionResult::Value(
                Cow::Owned(serde_json::Value::from(nodes.len())),
            ),
            _ => FilterExpressionResult::Nothing,
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

pub struct Value;

impl Value {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Value {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a> {
        match args.into_iter().next() {
            Some(FilterExpressionResult::Nodes(nodes)) => match nodes.as_slice() {
                [node] => FilterExpressionResult::Value(Cow::Borrowed(*node)),
                _ => FilterExpressionResult::Nothing,
            },
            Some(rv @ FilterExpressionResult::Value(_)) => rv,
            _ => FilterExpressionResult::Nothing,
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

pub struct Match {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Match {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(REGEX_CACHE_SIZE).expect("cache size must be non-zero"),
            )),
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Match {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a> {
        FilterExpressionResult::Bool(regex_test(&self.cache, &args, full_match))
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

pub struct Search {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Search {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(REGEX_CACHE_SIZE).expect("cache size must be non-zero"),
            )),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Search {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a> {
        FilterExpressionResult::Bool(regex_test(&self.cache, &args, map_regex))
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

/// Shared implementation of `match` and `search`. Any invalid operand
/// or pattern results in `false`, never an error.
fn regex_test(
    cache: &Mutex<LruCache<String, Regex>>,
    args: &[FilterExpressionResult],
    translate: fn(&str) -> String,
) -> bool {
    let (Some(FilterExpressionResult::Value(value)), Some(FilterExpressionResult::Value(pattern))) =
        (args.first(), args.get(1))
    else {
        return false;
    };

    let (Some(s), Some(p)) = (value.as_str(), pattern.as_str()) else {
        return false;
    };

    let Ok(mut cache) = cache.lock() else {
        return false;
    };

    if let Some(re) = cache.get(p) {
        return re.is_match(s);
    }

    if !iregexp::check(p) {
        return false;
    }

    match Regex::new(&translate(p)) {
        Ok(re) => {
            let rv = re.is_match(s);
            cache.push(p.to_owned(), re);
            rv
        }
        Err(_) => false,
    }
}

/// Translate an I-Regexp pattern to the host regex dialect. The only
/// mapping required is `.`, which in RFC 9485 matches any character
/// other than `\n` and `\r`.
fn map_regex(pattern: &str) -> String {
    let mut escaped = false;
    let mut char_class = false;
    let mut rv = String::new();

    for ch in pattern.chars() {
        if escaped {
            rv.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => {
                escaped = true;
                rv.push(ch);
            }
            '[' => {
                char_class = true;
                rv.push(ch);
            }
            ']' => {
                char_class = false;
                rv.push(ch);
            }
            '.' if !char_class => rv.push_str("[^\\n\\r]"),
            _ => rv.push(ch),
        }
    }

    rv
}

/// `match` requires the whole string to match the pattern.
fn full_match(pattern: &str) -> String {
    format!("^(?:{})$", map_regex(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value_arg(value: serde_json::Value) -> FilterExpressionResult<'static> {
        FilterExpressionResult::Value(Cow::Owned(value))
    }

    fn as_value(rv: FilterExpressionResult) -> Option<serde_json::Value> {
        match rv {
            FilterExpressionResult::Value(value) => Some(value.into_owned()),
            _ => None,
        }
    }

    #[test]
    fn length_of_string_counts_code_points() {
        let rv = Length::new().call(vec![value_arg(json!("déjà"))]);
        assert_eq!(as_value(rv), Some(json!(4)));
    }

    #[test]
    fn length_of_array_and_object() {
        let rv = Length::new().call(vec![value_arg(json!([1, 2, 3]))]);
        assert_eq!(as_value(rv), Some(json!(3)));

        let rv = Length::new().call(vec![value_arg(json!({"a": 1}))]);
        assert_eq!(as_value(rv), Some(json!(1)));
    }

    #[test]
    fn length_of_scalar_is_nothing() {
        assert!(matches!(
            Length::new().call(vec![value_arg(json!(42))]),
            FilterExpressionResult::Nothing
        ));
        assert!(matches!(
            Length::new().call(vec![FilterExpressionResult::Nothing]),
            FilterExpressionResult::Nothing
        ));
    }

    #[test]
    fn count_nodes() {
        let doc = json!([1, 2, 3]);
        let nodes = doc.as_array().unwrap().iter().collect();
        let rv = Count::new().call(vec![FilterExpressionResult::Nodes(nodes)]);
        assert_eq!(as_value(rv), Some(json!(3)));

        let rv = Count::new().call(vec![FilterExpressionResult::Nodes(Vec::new())]);
        assert_eq!(as_value(rv), Some(json!(0)));
    }

    #[test]
    fn value_of_singleton_node_list() {
        let doc = json!(["only"]);
        let nodes = doc.as_array().unwrap().iter().collect();
        let rv = Value::new().call(vec![FilterExpressionResult::Nodes(nodes)]);
        assert_eq!(as_value(rv), Some(json!("only")));
    }

    #[test]
    fn value_of_non_singleton_node_list_is_nothing() {
        let doc = json!([1, 2]);
        let nodes = doc.as_array().unwrap().iter().collect();
        assert!(matches!(
            Value::new().call(vec![FilterExpressionResult::Nodes(nodes)]),
            FilterExpressionResult::Nothing
        ));
        assert!(matches!(
            Value::new().call(vec![FilterExpressionResult::Nodes(Vec::new())]),
            FilterExpressionResult::Nothing
        ));
    }

    #[test]
    fn match_is_anchored() {
        let m = Match::new();
        let rv = m.call(vec![value_arg(json!("ab")), value_arg(json!("a.*"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(true)));

        let rv = m.call(vec![value_arg(json!("xab")), value_arg(json!("a.*"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(false)));
    }

    #[test]
    fn search_is_unanchored() {
        let s = Search::new();
        let rv = s.call(vec![value_arg(json!("xaby")), value_arg(json!("ab"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(true)));
    }

    #[test]
    fn dot_does_not_match_line_terminators() {
        let m = Match::new();
        let rv = m.call(vec![value_arg(json!("a\nb")), value_arg(json!("a.b"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(false)));

        let rv = m.call(vec![value_arg(json!("axb")), value_arg(json!("a.b"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(true)));
    }

    #[test]
    fn invalid_pattern_is_false() {
        let m = Match::new();
        let rv = m.call(vec![value_arg(json!("ab")), value_arg(json!("a(b"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(false)));
    }

    #[test]
    fn non_string_operands_are_false() {
        let m = Match::new();
        let rv = m.call(vec![value_arg(json!(1)), value_arg(json!("a"))]);
        assert!(matches!(rv, FilterExpressionResult::Bool(false)));

        let rv = m.call(vec![
            FilterExpressionResult::Nothing,
            value_arg(json!("a")),
        ]);
        assert!(matches!(rv, FilterExpressionResult::Bool(false)));
    }
}
