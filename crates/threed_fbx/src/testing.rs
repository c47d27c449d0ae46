//! Binary document writer used to build test inputs.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::read::binary::{OffsetWidth, MAGIC};
use crate::value::PropertyValue;

/// A node record to encode
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub name: String,
    pub properties: Vec<PropertyValue>,
    pub children: Vec<Record>,
}

impl Record {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn with(mut self, value: PropertyValue) -> Self {
        self.properties.push(value);
        self
    }

    pub fn child(mut self, record: Record) -> Self {
        self.children.push(record);
        self
    }
}

fn encode_array<T>(
    out: &mut Vec<u8>,
    tag: u8,
    values: &[T],
    compress: bool,
    write: impl Fn(&mut Vec<u8>, &T),
) {
    let mut payload = Vec::new();
    for value in values {
        write(&mut payload, value);
    }
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        payload = encoder.finish().unwrap();
    }

    out.push(tag);
    out.write_u32::<LittleEndian>(values.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(u32::from(compress)).unwrap();
    out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
    out.extend_from_slice(&payload);
}

/// Encode one property, compressing array payloads when `compress` is set
pub fn encode_property(value: &PropertyValue, compress: bool) -> Vec<u8> {
    let mut out = Vec::new();
    match value {
        PropertyValue::Int16(v) => {
            out.push(b'Y');
            out.write_i16::<LittleEndian>(*v).unwrap();
        }
        PropertyValue::Bool(v) => out.extend_from_slice(&[b'C', u8::from(*v)]),
        PropertyValue::Int32(v) => {
            out.push(b'I');
            out.write_i32::<LittleEndian>(*v).unwrap();
        }
        PropertyValue::Float32(v) => {
            out.push(b'F');
            out.write_f32::<LittleEndian>(*v).unwrap();
        }
        PropertyValue::Float64(v) => {
            out.push(b'D');
            out.write_f64::<LittleEndian>(*v).unwrap();
        }
        PropertyValue::Int64(v) => {
            out.push(b'L');
            out.write_i64::<LittleEndian>(*v).unwrap();
        }
        PropertyValue::String(s) => {
            out.push(b'S');
            out.write_u32::<LittleEndian>(s.len() as u32).unwrap();
            out.extend_from_slice(s.as_bytes());
        }
        PropertyValue::Raw(bytes) => {
            out.push(b'R');
            out.write_u32::<LittleEndian>(bytes.len() as u32).unwrap();
            out.extend_from_slice(bytes);
        }
        PropertyValue::Float32Array(values) => encode_array(&mut out, b'f', values, compress, |o, v| {
            o.write_f32::<LittleEndian>(*v).unwrap()
        }),
        PropertyValue::Float64Array(values) => encode_array(&mut out, b'd', values, compress, |o, v| {
            o.write_f64::<LittleEndian>(*v).unwrap()
        }),
        PropertyValue::Int64Array(values) => encode_array(&mut out, b'l', values, compress, |o, v| {
            o.write_i64::<LittleEndian>(*v).unwrap()
        }),
        PropertyValue::Int32Array(values) => encode_array(&mut out, b'i', values, compress, |o, v| {
            o.write_i32::<LittleEndian>(*v).unwrap()
        }),
        PropertyValue::BoolArray(values) => {
            encode_array(&mut out, b'b', values, compress, |o, v| o.push(u8::from(*v)))
        }
        PropertyValue::ByteArray(values) => {
            encode_array(&mut out, b'c', values, compress, |o, v| o.push(*v))
        }
    }
    out
}

fn write_offset(out: &mut Vec<u8>, width: OffsetWidth, value: u64) {
    match width {
        OffsetWidth::Narrow => out.write_u32::<LittleEndian>(value as u32).unwrap(),
        OffsetWidth::Wide => out.write_u64::<LittleEndian>(value).unwrap(),
    }
}

fn patch_offset(out: &mut [u8], at: usize, width: OffsetWidth, value: u64) {
    match width {
        OffsetWidth::Narrow => out[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes()),
        OffsetWidth::Wide => out[at..at + 8].copy_from_slice(&value.to_le_bytes()),
    }
}

fn encode_record(out: &mut Vec<u8>, record: &Record, width: OffsetWidth, compress: bool) {
    let properties: Vec<u8> = record
        .properties
        .iter()
        .flat_map(|p| encode_property(p, compress))
        .collect();

    let start = out.len();
    write_offset(out, width, 0);
    write_offset(out, width, record.properties.len() as u64);
    write_offset(out, width, properties.len() as u64);
    out.push(record.name.len() as u8);
    out.extend_from_slice(record.name.as_bytes());
    out.extend_from_slice(&properties);

    if !record.children.is_empty() {
        for child in &record.children {
            encode_record(out, child, width, compress);
        }
        out.extend(std::iter::repeat(0).take(width.sentinel_len() as usize));
    }

    let end = out.len() as u64;
    patch_offset(out, start, width, end);
}

/// Encode a complete binary document of `version`
pub fn encode_document(version: u32, records: &[Record], compress: bool) -> Vec<u8> {
    let width = OffsetWidth::for_version(version);

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(b"  \x00\x1a\x00");
    out.write_u32::<LittleEndian>(version).unwrap();

    for record in records {
        encode_record(&mut out, record, width, compress);
    }
    out.extend(std::iter::repeat(0).take(width.sentinel_len() as usize));
    out
}

/// Small deterministic generator for test data
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    /// Uniform in `[-1, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}
