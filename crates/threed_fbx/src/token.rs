//! The token grammar shared by the text and binary scanners.
//!
//! Both scanners reduce their input to the same five token kinds so a single
//! [`crate::scope::parse`] serves either encoding. Only the attached [`Position`] differs:
//! text tokens know their line and column, binary tokens their byte offset.

use std::fmt;

use crate::error::Result;
use crate::value::PropertyValue;

/// Where a token was found in its source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Offset(u64),
    LineColumn { line: usize, column: usize },
}

impl Position {
    /// Line number for text positions
    pub fn line(&self) -> Option<usize> {
        match self {
            Position::LineColumn { line, .. } => Some(*line),
            Position::Offset(_) => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Offset(offset) => write!(f, "offset {:#x}", offset),
            Position::LineColumn { line, column } => {
                write!(f, "line {}, column {}", line, column)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `{`, or the start of a nested binary block
    OpenScope,
    /// `}`, or the sentinel closing a nested binary block
    CloseScope,
    /// Element name
    Key(String),
    /// One property value
    Data(PropertyValue),
    /// `,` between properties
    Separator,
}

impl TokenKind {
    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            TokenKind::OpenScope => "`{`".into(),
            TokenKind::CloseScope => "`}`".into(),
            TokenKind::Key(key) => format!("key `{}`", key),
            TokenKind::Data(value) => format!("{} value", value.type_name()),
            TokenKind::Separator => "`,`".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::OpenScope => write!(f, "{:<24} OpenScope", self.position.to_string()),
            TokenKind::CloseScope => write!(f, "{:<24} CloseScope", self.position.to_string()),
            TokenKind::Key(key) => write!(f, "{:<24} Key        {}", self.position.to_string(), key),
            TokenKind::Data(value) => {
                write!(f, "{:<24} Data       {}", self.position.to_string(), value)
            }
            TokenKind::Separator => write!(f, "{:<24} Separator", self.position.to_string()),
        }
    }
}

/// Turns a fully buffered document into its token sequence
pub trait Scanner {
    fn scan(&self, buffer: &[u8]) -> Result<Vec<Token>>;
}
