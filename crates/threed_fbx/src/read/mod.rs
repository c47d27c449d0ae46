//! Scanners turning raw document bytes into [`crate::token::Token`]s.

pub mod binary;
pub mod property;
pub mod text;

use std::io::Cursor;

pub use binary::BinaryScanner;
pub use text::TextScanner;

use crate::error::{Result, StructuralError};
use crate::token::{Scanner, Token};

/// Bytes inspected when sniffing for text input
const SNIFF_LENGTH: usize = 64;

/// The two encodings a document can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Text,
}

impl Encoding {
    /// Guess the encoding of `buffer`: the binary magic wins, otherwise input without NUL
    /// bytes in its first bytes is taken for text
    pub fn detect(buffer: &[u8]) -> Option<Encoding> {
        if buffer.starts_with(binary::MAGIC) {
            Some(Encoding::Binary)
        } else if !buffer.is_empty() && !buffer.iter().take(SNIFF_LENGTH).any(|b| *b == 0) {
            Some(Encoding::Text)
        } else {
            None
        }
    }

    /// Scan `buffer` with the scanner for this encoding
    pub fn scan(self, buffer: &[u8]) -> Result<Vec<Token>> {
        match self {
            Encoding::Binary => BinaryScanner::new().scan(buffer),
            Encoding::Text => TextScanner::new().scan(buffer),
        }
    }
}

/// Borrow the next `length` bytes of `cursor`, failing instead of reading short
pub(crate) fn take<'a>(
    cursor: &mut Cursor<&'a [u8]>,
    length: u64,
    context: &'static str,
) -> Result<&'a [u8]> {
    let data: &'a [u8] = *cursor.get_ref();
    let start = cursor.position();
    let end = start
        .checked_add(length)
        .filter(|end| *end <= data.len() as u64)
        .ok_or(StructuralError::Truncated {
            offset: start,
            context,
        })?;
    cursor.set_position(end);
    Ok(&data[start as usize..end as usize])
}

/// Map a failed primitive read to a truncation at `offset`
pub(crate) fn truncated(offset: u64, context: &'static str) -> impl FnOnce(std::io::Error) -> StructuralError {
    move |_| StructuralError::Truncated { offset, context }
}
