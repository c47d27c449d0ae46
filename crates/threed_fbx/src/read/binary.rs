//! Scanner for binary documents.
//!
//! A binary document is a 27 byte file header followed by a sequence of scopes, terminated by
//! a null record (a scope header of all zero bytes).
//!
//! | Offset | Size | Field                                               |
//! |--------|------|-----------------------------------------------------|
//! | 0      | 18   | magic, `Kaydara FBX Binary`                         |
//! | 18     | 5    | reserved                                            |
//! | 23     | 4    | version, little endian                              |
//!
//! Every scope is laid out as:
//!
//! | Size     | Field                                                   |
//! |----------|---------------------------------------------------------|
//! | width    | absolute offset of the end of the scope                 |
//! | width    | number of properties                                    |
//! | width    | byte length of the properties                           |
//! | 1        | length of the name                                      |
//! | variable | name                                                    |
//! | variable | properties, see [`crate::read::property`]              |
//! | variable | nested scopes followed by a sentinel, if any            |
//!
//! `width` is 4 bytes before version 7500 and 8 bytes from then on. The sentinel closing a
//! nested block is a null record, so it is 13 or 25 zero bytes long.

use std::io::Cursor;

use binrw::{BinRead, BinResult};
use tracing::{debug, instrument, trace, warn};

use crate::error::{Result, StructuralError};
use crate::read::property::decode_property;
use crate::read::take;
use crate::scope::MAX_DEPTH;
use crate::token::{Position, Scanner, Token, TokenKind};

/// Preamble of every binary document
pub const MAGIC: &[u8; 18] = b"Kaydara FBX Binary";

/// First version using 64 bit offsets
pub const WIDE_OFFSET_VERSION: u32 = 7500;

/// Size of the offset fields in scope headers
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OffsetWidth {
    /// 32 bit offsets, versions before 7500
    Narrow,
    /// 64 bit offsets
    Wide,
}

impl OffsetWidth {
    pub fn for_version(version: u32) -> Self {
        if version >= WIDE_OFFSET_VERSION {
            OffsetWidth::Wide
        } else {
            OffsetWidth::Narrow
        }
    }

    /// Length of a null record, which is also the length of a scope header with an empty name
    pub fn sentinel_len(self) -> u64 {
        match self {
            OffsetWidth::Narrow => 13,
            OffsetWidth::Wide => 25,
        }
    }
}

/// Binary file header
#[derive(BinRead, Debug, Copy, Clone, PartialEq, Eq)]
#[br(little, magic = b"Kaydara FBX Binary")]
pub struct BinaryHeader {
    /// Format version, e.g. `7400` for 7.4
    #[br(pad_before = 5)]
    pub version: u32,
}

#[binrw::parser(reader, endian)]
fn read_offset(width: OffsetWidth) -> BinResult<u64> {
    match width {
        OffsetWidth::Narrow => u32::read_options(reader, endian, ()).map(u64::from),
        OffsetWidth::Wide => u64::read_options(reader, endian, ()),
    }
}

/// Header of one scope
#[derive(BinRead, Debug, Clone, PartialEq, Eq)]
#[br(little, import(width: OffsetWidth))]
pub struct ScopeHeader {
    #[br(parse_with = read_offset, args(width))]
    pub end_offset: u64,

    #[br(parse_with = read_offset, args(width))]
    pub property_count: u64,

    #[br(parse_with = read_offset, args(width))]
    pub property_length: u64,

    pub name_length: u8,

    #[br(count = name_length)]
    pub name: Vec<u8>,
}

impl ScopeHeader {
    /// A zero end offset marks the end of a list of scopes
    pub fn is_null(&self) -> bool {
        self.end_offset == 0
    }
}

/// Read the file header at the start of `buffer`
pub fn read_header(buffer: &[u8]) -> Result<BinaryHeader> {
    BinaryHeader::read(&mut Cursor::new(buffer)).map_err(|e| match e {
        binrw::Error::BadMagic { .. } => StructuralError::InvalidMagic.into(),
        _ => StructuralError::Truncated {
            offset: 0,
            context: "file header",
        }
        .into(),
    })
}

/// [`Scanner`] for binary documents
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryScanner;

impl BinaryScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Scanner for BinaryScanner {
    #[instrument(skip_all, fields(length = buffer.len()))]
    fn scan(&self, buffer: &[u8]) -> Result<Vec<Token>> {
        let header = read_header(buffer)?;
        let width = OffsetWidth::for_version(header.version);
        debug!(version = header.version, ?width, "scanning binary document");

        let mut cursor = Cursor::new(buffer);
        cursor.set_position(27);
        let mut tokenizer = Tokenizer {
            cursor,
            width,
            tokens: Vec::new(),
        };
        tokenizer.read_document()?;

        debug!(tokens = tokenizer.tokens.len(), "binary scan complete");
        Ok(tokenizer.tokens)
    }
}

struct Tokenizer<'a> {
    cursor: Cursor<&'a [u8]>,
    width: OffsetWidth,
    tokens: Vec<Token>,
}

impl Tokenizer<'_> {
    fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn push(&mut self, kind: TokenKind, offset: u64) {
        self.tokens.push(Token::new(kind, Position::Offset(offset)));
    }

    fn read_document(&mut self) -> Result<()> {
        let limit = self.cursor.get_ref().len() as u64;
        while self.position() < limit {
            let offset = self.position();
            let header = self.read_scope_header()?;
            if header.is_null() {
                trace!(offset, "null record ends document");
                return Ok(());
            }
            self.read_scope(header, offset, limit, 0)?;
        }
        warn!("document ended without a null record");
        Ok(())
    }

    fn read_scope_header(&mut self) -> Result<ScopeHeader> {
        let offset = self.position();
        ScopeHeader::read_args(&mut self.cursor, (self.width,)).map_err(|_| {
            StructuralError::Truncated {
                offset,
                context: "scope header",
            }
            .into()
        })
    }

    /// Read the rest of the scope whose header started at `offset`. The scope must end at or
    /// before `limit`.
    fn read_scope(&mut self, header: ScopeHeader, offset: u64, limit: u64, depth: usize) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(StructuralError::NestingTooDeep {
                offset,
                limit: MAX_DEPTH,
            }
            .into());
        }

        let key = match String::from_utf8(header.name) {
            Ok(key) => key,
            Err(e) => {
                warn!(offset, "scope name is not valid utf-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let end_offset = header.end_offset;

        if end_offset > limit {
            return Err(StructuralError::EndOffsetOutOfBounds {
                offset,
                end_offset,
                limit,
            }
            .into());
        }
        let properties_start = self.position();
        if end_offset < properties_start {
            return Err(StructuralError::EndOffsetBeforeHeader { offset, end_offset }.into());
        }
        let properties_end = properties_start
            .checked_add(header.property_length)
            .filter(|end| *end <= end_offset)
            .ok_or_else(|| StructuralError::PropertyLengthOutOfBounds {
                key: key.clone(),
                offset,
                length: header.property_length,
            })?;

        trace!(offset, key = key.as_str(), properties = header.property_count, "scope");
        self.push(TokenKind::Key(key.clone()), offset);

        for i in 0..header.property_count {
            if i > 0 {
                self.push(TokenKind::Separator, self.position());
            }
            let at = self.position();
            let value = decode_property(&mut self.cursor, properties_end)?;
            self.push(TokenKind::Data(value), at);
        }

        if self.position() != properties_end {
            return Err(StructuralError::PropertyLengthMismatch {
                key,
                offset,
                expected: header.property_length,
                actual: self.position() - properties_start,
            }
            .into());
        }

        if self.position() < end_offset {
            self.read_body(&key, offset, end_offset, depth)?;
        }

        if self.position() != end_offset {
            return Err(StructuralError::EndOffsetMismatch {
                key,
                offset,
                expected: end_offset,
                actual: self.position(),
            }
            .into());
        }
        Ok(())
    }

    /// Read the nested scopes and sentinel between the properties of `key` and `end_offset`
    fn read_body(&mut self, key: &str, offset: u64, end_offset: u64, depth: usize) -> Result<()> {
        let sentinel_len = self.width.sentinel_len();
        let body_end = end_offset
            .checked_sub(sentinel_len)
            .filter(|end| *end >= self.position())
            .ok_or_else(|| StructuralError::MissingSentinel {
                key: key.to_owned(),
                offset,
                length: sentinel_len,
            })?;

        self.push(TokenKind::OpenScope, self.position());
        while self.position() < body_end {
            let child_offset = self.position();
            let child = self.read_scope_header()?;
            if child.is_null() {
                return Err(StructuralError::UnexpectedNullRecord {
                    key: key.to_owned(),
                    offset: child_offset,
                }
                .into());
            }
            self.read_scope(child, child_offset, body_end, depth + 1)?;
        }

        let sentinel_offset = self.position();
        self.push(TokenKind::CloseScope, sentinel_offset);
        let sentinel = take(&mut self.cursor, sentinel_len, "sentinel")?;
        if sentinel.iter().any(|b| *b != 0) {
            return Err(StructuralError::CorruptSentinel {
                key: key.to_owned(),
                offset: sentinel_offset,
            }
            .into());
        }
        Ok(())
    }
}
