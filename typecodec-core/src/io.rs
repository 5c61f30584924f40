//! Token stream contract and an in-memory implementation
//!
//! Codecs never see bytes or characters. They talk to an [`Output`] sink and an
//! [`Input`] source of typed tokens; a concrete wire format plugs in by
//! implementing these two traits. [`TokenWriter`] and [`TokenReader`] are the
//! in-memory implementation used by tests, the CLI and the fuzz harness.

use crate::error::CodecError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a token, as seen by a peek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Opening of a labelled element
    StartElement,
    /// Closing of the innermost open element
    EndElement,
    /// Null value
    Null,
    /// Boolean value
    Bool,
    /// Number value, carried as text
    Number,
    /// String value
    String,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::StartElement => "start-element",
            TokenKind::EndElement => "end-element",
            TokenKind::Null => "null",
            TokenKind::Bool => "bool",
            TokenKind::Number => "number",
            TokenKind::String => "string",
        };
        f.write_str(name)
    }
}

/// One token of a serialized value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Token {
    /// Opening of an element with the given label
    StartElement(String),
    /// Closing of the innermost open element
    EndElement,
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value in its exact textual form
    Number(String),
    /// String value
    String(String),
}

impl Token {
    /// Kind of this token
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartElement(_) => TokenKind::StartElement,
            Token::EndElement => TokenKind::EndElement,
            Token::Null => TokenKind::Null,
            Token::Bool(_) => TokenKind::Bool,
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
        }
    }
}

/// Sink of tokens; calls are appended in order and define the token order
pub trait Output {
    /// Open an element with the given label
    fn start_element(&mut self, name: &str) -> Result<()>;

    /// Close the innermost open element
    fn end_element(&mut self) -> Result<()>;

    /// Write a null value
    fn write_null(&mut self) -> Result<()>;

    /// Write a boolean value
    fn write_bool(&mut self, value: bool) -> Result<()>;

    /// Write a number in its textual form
    fn write_number(&mut self, text: &str) -> Result<()>;

    /// Write a string value
    fn write_str(&mut self, value: &str) -> Result<()>;
}

/// Source of tokens.
///
/// Decoders drive all control flow from [`Input::peek_kind`]; they never infer
/// structure from token content.
pub trait Input {
    /// Check whether any token remains
    fn has_next(&self) -> bool;

    /// Kind of the next token without consuming it, `None` at end of stream
    fn peek_kind(&self) -> Option<TokenKind>;

    /// Consume an element opening and return its label.
    ///
    /// When `expected` is given, a different label is an error.
    fn start_element(&mut self, expected: Option<&str>) -> Result<String>;

    /// Consume an element closing
    fn end_element(&mut self) -> Result<()>;

    /// Consume a null value
    fn read_null(&mut self) -> Result<()>;

    /// Consume a boolean value
    fn read_bool(&mut self) -> Result<bool>;

    /// Consume a number and return its exact text
    fn read_number(&mut self) -> Result<String>;

    /// Consume a string value
    fn read_str(&mut self) -> Result<String>;
}

/// In-memory [`Output`] collecting tokens into a vector
#[derive(Debug, Clone, Default)]
pub struct TokenWriter {
    tokens: Vec<Token>,
    open: usize,
}

impl TokenWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens written so far
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of elements opened but not yet closed
    pub fn open_elements(&self) -> usize {
        self.open
    }

    /// Consume the writer, returning the tokens
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl Output for TokenWriter {
    fn start_element(&mut self, name: &str) -> Result<()> {
        self.open += 1;
        self.tokens.push(Token::StartElement(name.to_string()));
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        if self.open == 0 {
            return Err(CodecError::malformed(
                TokenKind::StartElement,
                Some(TokenKind::EndElement),
            ));
        }
        self.open -= 1;
        self.tokens.push(Token::EndElement);
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.tokens.push(Token::Bool(value));
        Ok(())
    }

    fn write_number(&mut self, text: &str) -> Result<()> {
        self.tokens.push(Token::Number(text.to_string()));
        Ok(())
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.tokens.push(Token::String(value.to_string()));
        Ok(())
    }
}

/// In-memory [`Input`] reading from a token slice
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenReader<'a> {
    /// Create a reader positioned at the first token
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Index of the next token
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokens not yet consumed
    pub fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.pos..]
    }

    fn take<T>(
        &mut self,
        expected: TokenKind,
        extract: impl FnOnce(&'a Token) -> Option<T>,
    ) -> Result<T> {
        let token = self.tokens.get(self.pos);
        match token.and_then(extract) {
            Some(value) => {
                self.pos += 1;
                Ok(value)
            }
            None => Err(CodecError::malformed(expected, token.map(Token::kind))),
        }
    }
}

impl Input for TokenReader<'_> {
    fn has_next(&self) -> bool {
        self.pos < self.tokens.len()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(Token::kind)
    }

    fn start_element(&mut self, expected: Option<&str>) -> Result<String> {
        let label = self.take(TokenKind::StartElement, |t| match t {
            Token::StartElement(label) => Some(label),
            _ => None,
        })?;

        match expected {
            Some(name) if name != label.as_str() => Err(CodecError::UnexpectedLabel {
                expected: name.to_string(),
                found: label.clone(),
            }),
            _ => Ok(label.clone()),
        }
    }

    fn end_element(&mut self) -> Result<()> {
        self.take(TokenKind::EndElement, |t| {
            matches!(t, Token::EndElement).then_some(())
        })
    }

    fn read_null(&mut self) -> Result<()> {
        self.take(TokenKind::Null, |t| matches!(t, Token::Null).then_some(()))
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.take(TokenKind::Bool, |t| match t {
            Token::Bool(value) => Some(*value),
            _ => None,
        })
    }

    fn read_number(&mut self) -> Result<String> {
        self.take(TokenKind::Number, |t| match t {
            Token::Number(text) => Some(text.clone()),
            _ => None,
        })
    }

    fn read_str(&mut self) -> Result<String> {
        self.take(TokenKind::String, |t| match t {
            Token::String(value) => Some(value.clone()),
            _ => None,
        })
    }
}
