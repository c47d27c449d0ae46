//! Error types that can be emitted from this library
//!
//! Failures are split the same way the decoder is: [`StructuralError`] for binary layout
//! violations (always located by byte offset) and [`GrammarError`] for token streams that do
//! not form a valid document (located by line/column for text input). Unresolvable
//! connections are never errors; the scene builder logs and skips them.

use miette::Diagnostic;
use thiserror::Error;

use crate::token::Position;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`std::str::Utf8Error`]
    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),

    /// the binary layout of the document is corrupt
    #[error(transparent)]
    #[diagnostic(transparent)]
    Structural(#[from] StructuralError),

    /// the token stream does not form a document
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    /// input is neither a binary nor a text document
    #[error("input is neither a binary nor a text fbx document")]
    UnknownFormat,
}

/// Binary layout violations, each located by the byte offset where it was detected
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// the 18 byte preamble is missing
    #[error("missing `Kaydara FBX Binary` magic")]
    #[diagnostic(code(threed_fbx::structural::magic))]
    InvalidMagic,

    /// the buffer ended in the middle of a read
    #[error("unexpected end of data at offset {offset:#x} while reading {context}")]
    #[diagnostic(code(threed_fbx::structural::truncated))]
    Truncated {
        offset: u64,
        context: &'static str,
    },

    /// a scope ends beyond the buffer or the scope containing it
    #[error("scope at offset {offset:#x} ends at {end_offset:#x}, beyond its limit {limit:#x}")]
    #[diagnostic(code(threed_fbx::structural::end_offset))]
    EndOffsetOutOfBounds {
        offset: u64,
        end_offset: u64,
        limit: u64,
    },

    /// a scope ends before its own header
    #[error("scope at offset {offset:#x} ends at {end_offset:#x}, before its own header")]
    #[diagnostic(code(threed_fbx::structural::end_offset))]
    EndOffsetBeforeHeader { offset: u64, end_offset: u64 },

    /// the cursor did not land on the declared end of a scope
    #[error("scope `{key}` at offset {offset:#x} declares its end at {expected:#x} but ends at {actual:#x}")]
    #[diagnostic(code(threed_fbx::structural::end_offset))]
    EndOffsetMismatch {
        key: String,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// the declared property byte length reaches past the scope
    #[error("properties of `{key}` at offset {offset:#x} declare {length} bytes, past the end of the scope")]
    #[diagnostic(code(threed_fbx::structural::property_length))]
    PropertyLengthOutOfBounds { key: String, offset: u64, length: u64 },

    /// properties consumed fewer bytes than declared
    #[error("properties of `{key}` at offset {offset:#x} declare {expected} bytes but use {actual}")]
    #[diagnostic(code(threed_fbx::structural::property_length))]
    PropertyLengthMismatch {
        key: String,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// a property extends past the declared property byte length
    #[error("property `{tag}` at offset {offset:#x} extends past the property block ending at {limit:#x}")]
    #[diagnostic(code(threed_fbx::structural::property_overrun))]
    PropertyOverrun { tag: char, offset: u64, limit: u64 },

    /// a nested block has no room for its sentinel
    #[error("nested block of `{key}` at offset {offset:#x} has no room for its {length} byte sentinel")]
    #[diagnostic(code(threed_fbx::structural::sentinel))]
    MissingSentinel { key: String, offset: u64, length: u64 },

    /// the sentinel after a nested block contains data
    #[error("sentinel at offset {offset:#x} closing `{key}` contains non-zero bytes")]
    #[diagnostic(code(threed_fbx::structural::sentinel))]
    CorruptSentinel { key: String, offset: u64 },

    /// a null record appeared before the end of a nested block
    #[error("null record at offset {offset:#x} inside the nested block of `{key}`")]
    #[diagnostic(code(threed_fbx::structural::null_record))]
    UnexpectedNullRecord { key: String, offset: u64 },

    /// unknown property type tag
    #[error("unknown property type tag {tag:#04x} at offset {offset:#x}")]
    #[diagnostic(code(threed_fbx::structural::type_tag))]
    UnknownPropertyType { tag: u8, offset: u64 },

    /// unknown array encoding
    #[error("array `{tag}` at offset {offset:#x} uses unknown encoding {encoding}")]
    #[diagnostic(code(threed_fbx::structural::array_encoding))]
    UnknownArrayEncoding { tag: char, offset: u64, encoding: u32 },

    /// decoded array payload does not match the element count
    #[error("array `{tag}` at offset {offset:#x} holds {actual} bytes, expected {expected}")]
    #[diagnostic(code(threed_fbx::structural::array_length))]
    ArrayLengthMismatch {
        tag: char,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// a compressed array payload could not be inflated
    #[error("array `{tag}` at offset {offset:#x} failed to inflate: {reason}")]
    #[diagnostic(code(threed_fbx::structural::inflate))]
    Inflate {
        tag: char,
        offset: u64,
        reason: String,
    },

    /// scopes are nested deeper than supported
    #[error("scope at offset {offset:#x} is nested deeper than {limit} levels")]
    #[diagnostic(code(threed_fbx::structural::depth))]
    NestingTooDeep { offset: u64, limit: usize },
}

/// What went wrong while tokenizing or parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    #[error("unterminated quoted string")]
    UnterminatedString,

    #[error("unexpected `:` with no preceding key")]
    StrayColon,

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("array literal element `{0}` is not a number")]
    InvalidArrayElement(String),

    #[error("array literal declares {declared} elements but holds {actual}")]
    ArrayCountMismatch { declared: usize, actual: usize },

    #[error("scopes are nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// A token stream that does not form a document
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {position}")]
#[diagnostic(code(threed_fbx::grammar))]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub position: Position,
}

impl GrammarError {
    pub fn new(kind: GrammarErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
