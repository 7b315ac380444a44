//! An RFC 9535 JSONPath processor: parse a query expression into a
//! syntax tree, check it for well-typedness, then apply it to a
//! [`serde_json::Value`] to get an ordered list of references into
//! that value.
//!
//! ## Quick start
//!
//! Use [`find`] to compile and evaluate in one call.
//!
//! ```
//! use jsonpath_select::{errors::JSONPathError, find};
//! use serde_json::json;
//!
//! fn main() -> Result<(), JSONPathError> {
//!     let doc = json!({"a": [{"b": 1}, {"b": 2}]});
//!     let nodes = find("$.a[?@.b > 1].b", &doc)?;
//!     assert_eq!(nodes, vec![&json!(2)]);
//!     Ok(())
//! }
//! ```
//!
//! ## Compiled queries
//!
//! A [`Query`] is immutable after [`Query::standard`] returns and can
//! be applied any number of times, from any thread.
//!
//! ```
//! use jsonpath_select::{errors::JSONPathError, Query};
//! use serde_json::json;
//!
//! fn main() -> Result<(), JSONPathError> {
//!     let query = Query::standard("$..foo[0]")?;
//!     let doc = json!({"foo": ["bar", "baz"]});
//!     assert_eq!(query.find(&doc), vec![&json!("bar")]);
//!     Ok(())
//! }
//! ```
//!
//! Errors are raised at compile time only. [`Query::find`] is
//! infallible: absent members, out-of-range indices and mismatched
//! types in filters select nothing rather than failing.
//!
//! ## Ordering
//!
//! RFC 9535 does not prescribe an order for object member enumeration.
//! This crate always visits members in lexicographic key order (the
//! natural order of serde_json's default map), so wildcard, filter and
//! descendant output is deterministic. Do not enable serde_json's
//! `preserve_order` feature when depending on this crate, as it
//! replaces the sorted map.
//!
//! A [`Query`] is displayed in its canonical form when printed, and
//! the canonical form parses back to an equal query.
//!
//! ```
//! use jsonpath_select::{errors::JSONPathError, Query};
//!
//! fn main() -> Result<(), JSONPathError> {
//!     let query = Query::standard("$['foo'][\"bar\"][?@['some thing'] > 1]")?;
//!     assert_eq!(query.to_string(), "$.foo.bar[?@['some thing'] > 1]");
//!     Ok(())
//! }
//! ```

pub mod cmp;
pub mod env;
pub mod errors;
pub mod filter;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod standard_functions;
pub mod token;
pub mod typecheck;

use serde_json::Value;

pub use env::Environment;
pub use errors::{JSONPathError, JSONPathErrorType};
pub use function::{ExpressionType, FunctionSignature};
pub use parser::Parser;
pub use query::{NodeList, Query, Segment, Selector};

/// Compile `expr` and apply it to `value` in one call.
///
/// When the same query is evaluated against more than one document,
/// prefer compiling it once with [`Query::standard`].
pub fn find<'a>(expr: &str, value: &'a Value) -> Result<NodeList<'a>, JSONPathError> {
    Ok(Query::standard(expr)?.find(value))
}
