//! Array payload compression handling.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::instrument;

use crate::error::{Result, StructuralError};

/// Identifies how the payload of an array property is stored
///
/// Compressed payloads are zlib streams (a DEFLATE body with zlib framing).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ArrayEncoding {
    /// Stores the elements as they are
    #[default]
    Raw,

    /// Elements are DEFLATE compressed
    Deflate,
}

impl TryFrom<u32> for ArrayEncoding {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ArrayEncoding::Raw),
            1 => Ok(ArrayEncoding::Deflate),
            other => Err(other),
        }
    }
}

/// Inflate `payload`, producing at most `expected + 1` bytes so a lying header can neither
/// exhaust memory nor go unnoticed
#[instrument(skip(payload), fields(compressed = payload.len()))]
pub(crate) fn inflate(payload: &[u8], expected: u64, tag: char, offset: u64) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    ZlibDecoder::new(payload)
        .take(expected.saturating_add(1))
        .read_to_end(&mut output)
        .map_err(|e| StructuralError::Inflate {
            tag,
            offset,
            reason: e.to_string(),
        })?;
    Ok(output)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::{write::ZlibEncoder, Compression};

    use super::{inflate, ArrayEncoding};
    use crate::error::{Error, StructuralError};

    #[test]
    fn encoding_values() {
        assert_eq!(ArrayEncoding::try_from(0), Ok(ArrayEncoding::Raw));
        assert_eq!(ArrayEncoding::try_from(1), Ok(ArrayEncoding::Deflate));
        assert_eq!(ArrayEncoding::try_from(2), Err(2));
    }

    #[test]
    fn inflates_zlib_streams() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Hello World").unwrap();
        let payload = encoder.finish().unwrap();

        assert_eq!(inflate(&payload, 11, 'c', 0).unwrap(), b"Hello World");
    }

    #[test]
    fn stops_after_expected_length() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0u8; 4096]).unwrap();
        let payload = encoder.finish().unwrap();

        assert_eq!(inflate(&payload, 16, 'i', 0).unwrap().len(), 17);
    }

    #[test]
    fn rejects_garbage() {
        let result = inflate(&[0xde, 0xad, 0xbe, 0xef], 4, 'f', 0x40);
        assert!(matches!(
            result,
            Err(Error::Structural(StructuralError::Inflate { tag: 'f', offset: 0x40, .. }))
        ));
    }
}
