use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    function::{FunctionRegister, FunctionSignature},
    standard_functions::{Count, Length, Match, Search, Value},
};

lazy_static! {
    /// The environment used by [`crate::query::Query::standard`]. The
    /// function table is closed over the five RFC 9535 built-ins.
    pub static ref ENVIRONMENT: Environment = Environment::standard();
}

pub struct Environment {
    pub function_register: FunctionRegister,
}

impl Environment {
    pub fn standard() -> Self {
        let mut function_register: FunctionRegister = HashMap::new();
        function_register.insert("count".to_string(), Box::new(Count::new()));
        function_register.insert("length".to_string(), Box::new(Length::new()));
        function_register.insert("match".to_string(), Box::new(Match::new()));
        function_register.insert("search".to_string(), Box::new(Search::new()));
        function_register.insert("value".to_string(), Box::new(Value::new()));

        Self { function_register }
    }

    pub fn signature(&self, name: &str) -> Option<FunctionSignature> {
        self.function_register
            .get(name)
            .map(|function| function.signature())
    }
}
