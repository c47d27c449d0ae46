//! Decoding of binary property values.
//!
//! Every property starts with a one byte type tag:
//!
//! | Tag | Value                                      |
//! |-----|--------------------------------------------|
//! | `Y` | 2 bytes: signed integer                    |
//! | `C` | 1 byte: boolean                            |
//! | `I` | 4 bytes: signed integer                    |
//! | `F` | 4 bytes: IEEE 754 single                   |
//! | `D` | 8 bytes: IEEE 754 double                   |
//! | `L` | 8 bytes: signed integer                    |
//! | `S` | 4 byte length, then UTF-8 text             |
//! | `R` | 4 byte length, then raw bytes              |
//! | `f` `d` `l` `i` `b` `c` | array, see [`ArrayHeader`]     |
//!
//! Array payloads hold `count` little endian elements of 4 (`f`, `i`), 8 (`d`, `l`) or
//! 1 (`b`, `c`) bytes each, optionally zlib compressed.

use std::borrow::Cow;
use std::io::Cursor;

use binrw::BinRead;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use tracing::warn;

use crate::compression::{inflate, ArrayEncoding};
use crate::error::{Result, StructuralError};
use crate::read::{take, truncated};
use crate::value::PropertyValue;

/// Header preceding every array payload
#[derive(BinRead, Debug, Copy, Clone, PartialEq, Eq)]
#[br(little)]
pub struct ArrayHeader {
    /// Number of elements
    pub count: u32,

    /// `0` for raw elements, `1` for a compressed payload
    pub encoding: u32,

    /// Size of the payload as stored
    pub byte_length: u32,
}

/// Size of one element of the array with type tag `tag`
pub fn stride(tag: u8) -> Option<u64> {
    match tag {
        b'f' | b'i' => Some(4),
        b'd' | b'l' => Some(8),
        b'b' | b'c' => Some(1),
        _ => None,
    }
}

/// Decode the property at the cursor. The property must end at or before `limit`, the end of
/// the enclosing element's property block.
pub fn decode_property(cursor: &mut Cursor<&[u8]>, limit: u64) -> Result<PropertyValue> {
    let offset = cursor.position();
    let tag = cursor
        .read_u8()
        .map_err(truncated(offset, "property type tag"))?;

    let value = match tag {
        b'Y' => PropertyValue::Int16(
            cursor
                .read_i16::<LittleEndian>()
                .map_err(truncated(offset, "int16 property"))?,
        ),
        b'C' => PropertyValue::Bool(
            cursor
                .read_u8()
                .map_err(truncated(offset, "bool property"))?
                != 0,
        ),
        b'I' => PropertyValue::Int32(
            cursor
                .read_i32::<LittleEndian>()
                .map_err(truncated(offset, "int32 property"))?,
        ),
        b'F' => PropertyValue::Float32(
            cursor
                .read_f32::<LittleEndian>()
                .map_err(truncated(offset, "float32 property"))?,
        ),
        b'D' => PropertyValue::Float64(
            cursor
                .read_f64::<LittleEndian>()
                .map_err(truncated(offset, "float64 property"))?,
        ),
        b'L' => PropertyValue::Int64(
            cursor
                .read_i64::<LittleEndian>()
                .map_err(truncated(offset, "int64 property"))?,
        ),
        b'S' => {
            let length = cursor
                .read_u32::<LittleEndian>()
                .map_err(truncated(offset, "string length"))?;
            let bytes = take(cursor, u64::from(length), "string property")?;
            PropertyValue::String(decode_string(bytes, offset))
        }
        b'R' => {
            let length = cursor
                .read_u32::<LittleEndian>()
                .map_err(truncated(offset, "raw length"))?;
            PropertyValue::Raw(take(cursor, u64::from(length), "raw property")?.to_vec())
        }
        b'f' | b'd' | b'l' | b'i' | b'b' | b'c' => decode_array(cursor, tag, offset)?,
        _ => return Err(StructuralError::UnknownPropertyType { tag, offset }.into()),
    };

    if cursor.position() > limit {
        return Err(StructuralError::PropertyOverrun {
            tag: tag as char,
            offset,
            limit,
        }
        .into());
    }

    Ok(value)
}

fn decode_string(bytes: &[u8], offset: u64) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(e) => {
            warn!(offset, error = %e, "string property is not valid utf-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

fn decode_array(cursor: &mut Cursor<&[u8]>, tag: u8, offset: u64) -> Result<PropertyValue> {
    let header = ArrayHeader::read(cursor).map_err(|_| StructuralError::Truncated {
        offset,
        context: "array header",
    })?;
    let encoding = ArrayEncoding::try_from(header.encoding).map_err(|encoding| {
        StructuralError::UnknownArrayEncoding {
            tag: tag as char,
            offset,
            encoding,
        }
    })?;
    let payload = take(cursor, u64::from(header.byte_length), "array payload")?;

    let expected = u64::from(header.count) * stride(tag).unwrap_or(1);
    let bytes: Cow<'_, [u8]> = match encoding {
        ArrayEncoding::Raw => Cow::Borrowed(payload),
        ArrayEncoding::Deflate => Cow::Owned(inflate(payload, expected, tag as char, offset)?),
    };
    if bytes.len() as u64 != expected {
        return Err(StructuralError::ArrayLengthMismatch {
            tag: tag as char,
            offset,
            expected,
            actual: bytes.len() as u64,
        }
        .into());
    }

    let count = header.count as usize;
    Ok(match tag {
        b'f' => {
            let mut values = vec![0f32; count];
            LittleEndian::read_f32_into(&bytes, &mut values);
            PropertyValue::Float32Array(values)
        }
        b'd' => {
            let mut values = vec![0f64; count];
            LittleEndian::read_f64_into(&bytes, &mut values);
            PropertyValue::Float64Array(values)
        }
        b'l' => {
            let mut values = vec![0i64; count];
            LittleEndian::read_i64_into(&bytes, &mut values);
            PropertyValue::Int64Array(values)
        }
        b'i' => {
            let mut values = vec![0i32; count];
            LittleEndian::read_i32_into(&bytes, &mut values);
            PropertyValue::Int32Array(values)
        }
        b'b' => PropertyValue::BoolArray(bytes.iter().map(|b| *b != 0).collect()),
        _ => PropertyValue::ByteArray(bytes.into_owned()),
    })
}
