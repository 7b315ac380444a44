use std::collections::HashMap;

use crate::filter::FilterExpressionResult;

/// The three static types of RFC 9535 section 2.4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Logical,
    Nodes,
    Value,
}

pub struct FunctionSignature {
    pub param_types: Vec<ExpressionType>,
    pub return_type: ExpressionType,
}

/// A filter function extension. Arguments arrive already converted to
/// the declared parameter types; see `unpack_argument` in
/// [`crate::filter`].
pub trait FunctionExtension {
    fn call<'a>(&self, args: Vec<FilterExpressionResult<'a>>) -> FilterExpressionResult<'a>;
    fn signature(&self) -> FunctionSignature;
}

pub type FunctionRegister = HashMap<String, Box<dyn FunctionExtension + Sync>>;
