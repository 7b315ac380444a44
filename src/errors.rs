use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JSONPathErrorType {
    SyntaxError,
    TypeError,
    NameError,
    InternalError,
}

/// An error raised while compiling a JSONPath expression.
///
/// `position` is a byte offset into the query string, pointing at the
/// token that caused the error.
#[derive(Debug, Clone)]
pub struct JSONPathError {
    pub kind: JSONPathErrorType,
    pub msg: String,
    pub position: usize,
}

impl JSONPathError {
    pub fn new(kind: JSONPathErrorType, msg: String, position: usize) -> Self {
        Self {
            kind,
            msg,
            position,
        }
    }

    pub fn syntax(msg: String, position: usize) -> Self {
        Self {
            kind: JSONPathErrorType::SyntaxError,
            msg,
            position,
        }
    }

    pub fn typ(msg: String, position: usize) -> Self {
        Self {
            kind: JSONPathErrorType::TypeError,
            msg,
            position,
        }
    }

    pub fn name(msg: String, position: usize) -> Self {
        Self {
            kind: JSONPathErrorType::NameError,
            msg,
            position,
        }
    }
}

impl std::error::Error for JSONPathError {}

impl fmt::Display for JSONPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            JSONPathErrorType::SyntaxError => {
                write!(f, "syntax error: {} ({})", self.msg, self.position)
            }
            JSONPathErrorType::TypeError => {
                write!(f, "type error: {} ({})", self.msg, self.position)
            }
            JSONPathErrorType::NameError => {
                write!(f, "name error: {} ({})", self.msg, self.position)
            }
            JSONPathErrorType::InternalError => {
                write!(f, "internal error: {} ({})", self.msg, self.position)
            }
        }
    }
}
