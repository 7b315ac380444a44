//! A hand-written tokenizer for RFC 9535 JSONPath expressions.
//!
//! [`lex`] drives a small state machine over the query string and
//! returns spanned tokens, or a syntax error pointing at the offending
//! byte offset.

use crate::{
    errors::JSONPathError,
    token::{Token, TokenKind, EOQ},
};

use std::str::CharIndices;

enum State {
    Error,
    EndOfQuery,
    Root,
    Segment,
    DescendantSelection,
    ShorthandSelection,
    InsideBracketed,
    InsideFilter,
    InsideString { quote: char, in_filter: bool },
}

struct Lexer<'q> {
    query: &'q str,
    tokens: Vec<Token>,

    chars: CharIndices<'q>,
    start: usize,
    pos: usize,

    filter_depth: u32,
    paren_stack: Vec<u32>,
}

impl<'q> Lexer<'q> {
    fn new(query: &'q str) -> Self {
        Self {
            query,
            tokens: Vec::new(),
            chars: query.char_indices(),
            start: 0,
            pos: 0,
            filter_depth: 0,
            paren_stack: Vec::new(),
        }
    }

    fn run(&mut self) {
        let mut state = State::Root;
        loop {
            state = match state {
                State::Error | State::EndOfQuery => break,
                State::Root => self.lex_root(),
                State::Segment => self.lex_segment(),
                State::DescendantSelection => self.lex_descendant_selection(),
                State::ShorthandSelection => self.lex_shorthand_selection(),
                State::InsideBracketed => self.lex_inside_bracketed(),
                State::InsideFilter => self.lex_inside_filter(),
                State::InsideString { quote, in_filter } => self.lex_string(quote, in_filter),
            };
        }
    }

    fn emit(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.start, self.pos));
        self.start = self.pos;
    }

    fn value(&self) -> &str {
        self.query
            .get(self.start..self.pos)
            .expect("lexeme out of bounds or not on a codepoint boundary")
    }

    fn boxed_value(&self) -> Box<str> {
        self.value().to_string().into_boxed_str()
    }

    fn next(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.pos = pos + ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn peek(&mut self) -> char {
        if let Some((_, ch)) = self.chars.clone().next() {
            ch
        } else {
            EOQ
        }
    }

    fn accept(&mut self, ch: char) -> bool {
        if self.peek() == ch {
            self.next();
            true
        } else {
            false
        }
    }

    fn accept_if(&mut self, pred: impl FnOnce(char) -> bool) -> bool {
        if pred(self.peek()) {
            self.next();
            true
        } else {
            false
        }
    }

    fn accept_run(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let mut accepted = false;
        while pred(self.peek()) {
            self.next();
            accepted = true;
        }
        accepted
    }

    fn ignore_whitespace(&mut self) -> bool {
        if self.accept_run(is_whitespace_char) {
            self.ignore();
            true
        } else {
            false
        }
    }

    fn error(&mut self, msg: String) -> State {
        self.tokens.push(Token::new(
            TokenKind::Error {
                msg: msg.into_boxed_str(),
            },
            self.start,
            self.pos,
        ));
        State::Error
    }

    fn lex_root(&mut self) -> State {
        if self.accept('$') {
            self.emit(TokenKind::Root);
            State::Segment
        } else {
            let msg = format!("expected '$', found '{}'", self.next().unwrap_or(EOQ));
            self.error(msg)
        }
    }

    fn lex_segment(&mut self) -> State {
        if self.ignore_whitespace() && self.peek() == EOQ {
            return self.error(String::from("unexpected trailing whitespace"));
        }

        if self.accept('.') {
            if self.accept('.') {
                self.emit(TokenKind::DoubleDot);
                State::DescendantSelection
            } else {
                State::ShorthandSelection
            }
        } else if self.accept('[') {
            self.emit(TokenKind::LBracket);
            State::InsideBracketed
        } else if self.filter_depth > 0 {
            State::InsideFilter
        } else if self.peek() == EOQ {
            self.emit(TokenKind::Eoq);
            State::EndOfQuery
        } else {
            let msg = format!(
                "expected '.', '..' or a bracketed selection, found '{}'",
                self.next().unwrap_or(EOQ)
            );
            self.error(msg)
        }
    }

    fn lex_descendant_selection(&mut self) -> State {
        if self.accept('*') {
            self.emit(TokenKind::Wild);
            State::Segment
        } else if self.accept('[') {
            self.emit(TokenKind::LBracket);
            State::InsideBracketed
        } else if self.accept_if(is_name_first) {
            self.accept_run(is_name_char);
            self.emit(TokenKind::Name {
                value: self.boxed_value(),
            });
            State::Segment
        } else {
            let msg = format!("unexpected descendant selection token '{}'", self.peek());
            self.error(msg)
        }
    }

    fn lex_shorthand_selection(&mut self) -> State {
        self.ignore(); // drop the dot

        if self.accept_run(is_whitespace_char) {
            return self.error(String::from("unexpected whitespace after dot"));
        }

        if self.accept('*') {
            self.emit(TokenKind::Wild);
            State::Segment
        } else if self.accept_if(is_name_first) {
            self.accept_run(is_name_char);
            self.emit(TokenKind::Name {
                value: self.boxed_value(),
            });
            State::Segment
        } else {
            let msg = format!(
                "unexpected shorthand selector '{}'",
                self.next().unwrap_or(EOQ)
            );
            self.error(msg)
        }
    }

    fn lex_inside_bracketed(&mut self) -> State {
        self.ignore_whitespace();

        match self.peek() {
            ']' => {
                self.next();
                self.emit(TokenKind::RBracket);
                if self.filter_depth > 0 {
                    State::InsideFilter
                } else {
                    State::Segment
                }
            }
            '*' => {
                self.next();
                self.emit(TokenKind::Wild);
                State::InsideBracketed
            }
            '?' => {
                self.next();
                self.emit(TokenKind::Filter);
                self.filter_depth += 1;
                State::InsideFilter
            }
            ',' => {
                self.next();
                self.emit(TokenKind::Comma);
                State::InsideBracketed
            }
            ':' => {
                self.next();
                self.emit(TokenKind::Colon);
                State::InsideBracketed
            }
            '\'' => {
                self.next();
                State::InsideString {
                    quote: '\'',
                    in_filter: false,
                }
            }
            '"' => {
                self.next();
                State::InsideString {
                    quote: '"',
                    in_filter: false,
                }
            }
            '-' => {
                self.next();
                if self.accept_run(is_digit) {
                    self.emit(TokenKind::Index {
                        value: self.boxed_value(),
                    });
                    State::InsideBracketed
                } else {
                    let msg = format!("expected a digit after '-', found '{}'", self.peek());
                    self.error(msg)
                }
            }
            EOQ => self.error(String::from("unclosed bracketed selection")),
            _ => {
                if self.accept_run(is_digit) {
                    self.emit(TokenKind::Index {
                        value: self.boxed_value(),
                    });
                    State::InsideBracketed
                } else {
                    let msg = format!("unexpected '{}' in bracketed selection", self.peek());
                    self.error(msg)
                }
            }
        }
    }

    fn lex_inside_filter(&mut self) -> State {
        self.ignore_whitespace();

        match self.peek() {
            EOQ => self.error(String::from("unclosed bracketed selection")),
            ']' => {
                self.filter_depth -= 1;
                if !self.paren_stack.is_empty() {
                    self.error(String::from("unbalanced parentheses"))
                } else {
                    State::InsideBracketed
                }
            }
            ',' => {
                self.next();
                self.emit(TokenKind::Comma);
                // Inside a function call a comma separates arguments,
                // otherwise it ends this filter selector.
                if self.paren_stack.is_empty() {
                    self.filter_depth -= 1;
                    State::InsideBracketed
                } else {
                    State::InsideFilter
                }
            }
            '\'' => {
                self.next();
                State::InsideString {
                    quote: '\'',
                    in_filter: true,
                }
            }
            '"' => {
                self.next();
                State::InsideString {
                    quote: '"',
                    in_filter: true,
                }
            }
            '(' => {
                self.next();
                self.emit(TokenKind::LParen);
                if let Some(count) = self.paren_stack.last_mut() {
                    *count += 1;
                }
                State::InsideFilter
            }
            ')' => {
                self.next();
                self.emit(TokenKind::RParen);
                match self.paren_stack.last_mut() {
                    Some(1) => {
                        self.paren_stack.pop();
                    }
                    Some(count) => *count -= 1,
                    None => (),
                }
                State::InsideFilter
            }
            '$' => {
                self.next();
                self.emit(TokenKind::Root);
                State::Segment
            }
            '@' => {
                self.next();
                self.emit(TokenKind::Current);
                State::Segment
            }
            '.' => State::Segment,
            '!' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Ne);
                } else {
                    self.emit(TokenKind::Not);
                }
                State::InsideFilter
            }
            '=' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Eq);
                    State::InsideFilter
                } else {
                    self.error(String::from("expected '==', found '='"))
                }
            }
            '<' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Le);
                } else {
                    self.emit(TokenKind::Lt);
                }
                State::InsideFilter
            }
            '>' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Ge);
                } else {
                    self.emit(TokenKind::Gt);
                }
                State::InsideFilter
            }
            '&' => {
                self.next();
                if self.accept('&') {
                    self.emit(TokenKind::And);
                    State::InsideFilter
                } else {
                    self.error(String::from("unexpected '&', did you mean '&&'?"))
                }
            }
            '|' => {
                self.next();
                if self.accept('|') {
                    self.emit(TokenKind::Or);
                    State::InsideFilter
                } else {
                    self.error(String::from("unexpected '|', did you mean '||'?"))
                }
            }
            '-' => {
                self.next();
                self.lex_number()
            }
            ch => {
                if is_digit(ch) {
                    self.lex_number()
                } else if self.accept_run(is_function_name_first) {
                    self.accept_run(is_function_name_char);
                    match self.value() {
                        "true" => self.emit(TokenKind::True),
                        "false" => self.emit(TokenKind::False),
                        "null" => self.emit(TokenKind::Null),
                        _ => {
                            if self.peek() != '(' {
                                return self
                                    .error(String::from("expected a keyword or function call"));
                            }
                            self.paren_stack.push(1);
                            self.emit(TokenKind::Function {
                                name: self.boxed_value(),
                            });
                            self.next();
                            self.ignore(); // drop the open paren
                        }
                    }
                    State::InsideFilter
                } else {
                    let msg = format!("unexpected filter expression token '{}'", ch);
                    self.error(msg)
                }
            }
        }
    }

    fn lex_number(&mut self) -> State {
        if !self.accept_run(is_digit) {
            let msg = format!("expected a digit, found '{}'", self.peek());
            return self.error(msg);
        }

        let mut is_float = false;

        if self.accept('.') {
            is_float = true;
            if !self.accept_run(is_digit) {
                return self.error(String::from(
                    "a fractional digit is required after a decimal point",
                ));
            }
        }

        if self.accept_if(|ch| ch == 'e' || ch == 'E') {
            is_float = true;
            self.accept_if(|ch| ch == '+' || ch == '-');
            if !self.accept_run(is_digit) {
                return self.error(String::from("at least one exponent digit is required"));
            }
        }

        if is_float {
            self.emit(TokenKind::Float {
                value: self.boxed_value(),
            });
        } else {
            self.emit(TokenKind::Int {
                value: self.boxed_value(),
            });
        }

        State::InsideFilter
    }

    fn lex_string(&mut self, quote: char, in_filter: bool) -> State {
        self.ignore(); // drop the open quote

        loop {
            match self.peek() {
                '\\' => {
                    self.next();
                    if !self.accept_if(|ch| is_escape_char(ch) || ch == quote) {
                        return self.error(String::from("invalid escape sequence"));
                    }
                }
                EOQ => {
                    let msg = format!("unclosed string starting at index {}", self.start);
                    return self.error(msg);
                }
                ch if ch == quote => {
                    self.emit(if quote == '\'' {
                        TokenKind::SingleQuoted {
                            value: self.boxed_value(),
                        }
                    } else {
                        TokenKind::DoubleQuoted {
                            value: self.boxed_value(),
                        }
                    });
                    self.next();
                    self.ignore(); // drop the closing quote
                    return if in_filter {
                        State::InsideFilter
                    } else {
                        State::InsideBracketed
                    };
                }
                _ => {
                    self.next();
                }
            }
        }
    }
}

/// Tokenize `query`, stopping at the first error. An error is reported
/// as a trailing [`TokenKind::Error`] token.
pub fn tokenize(query: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(query);
    lexer.run();
    lexer.tokens
}

pub fn lex(query: &str) -> Result<Vec<Token>, JSONPathError> {
    let tokens = tokenize(query);

    match tokens.last() {
        Some(Token {
            kind: TokenKind::Error { msg },
            span,
            ..
        }) => Err(JSONPathError::syntax((*msg).to_string(), span.0)),
        _ => Ok(tokens),
    }
}

pub(crate) fn is_name_first(ch: char) -> bool {
    // ALPHA / "_" / %x80 and up; surrogates are unrepresentable in char
    let code_point = ch as u32;
    (0x41..=0x5A).contains(&code_point)
        || code_point == 0x5F
        || (0x61..=0x7A).contains(&code_point)
        || code_point >= 0x80
}

pub(crate) fn is_name_char(ch: char) -> bool {
    let code_point = ch as u32;
    (0x30..=0x39).contains(&code_point)
        || (0x41..=0x5A).contains(&code_point)
        || code_point == 0x5F
        || (0x61..=0x7A).contains(&code_point)
        || code_point >= 0x80
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_function_name_first(ch: char) -> bool {
    ch.is_ascii_lowercase()
}

fn is_function_name_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_'
}

fn is_escape_char(ch: char) -> bool {
    matches!(ch, 'b' | 'f' | 'n' | 'r' | 't' | 'u' | '/' | '\\')
}

fn is_whitespace_char(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\r' | '\t')
}
