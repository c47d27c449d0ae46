//! Typed property values carried by elements.

use std::fmt;

use winnow::ascii::{dec_int, float};
use winnow::error::ContextError;
use winnow::Parser;

/// Number of array items printed before eliding the rest
const DISPLAY_ITEMS: usize = 8;

/// The closed set of values a property list may contain
///
/// Arrays are homogeneous. The binary encoding selects the variant through its type tag; the
/// text encoding only distinguishes integers, reals and strings, so text documents produce
/// [`PropertyValue::Int64`], [`PropertyValue::Float64`], [`PropertyValue::String`] and the
/// matching array variants. Use the widening accessors ([`PropertyValue::as_i64`],
/// [`PropertyValue::to_f64_vec`], ...) to read values independently of the encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int16(i16),
    Bool(bool),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Int64(i64),
    Raw(Vec<u8>),
    String(String),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    Float32Array(Vec<f32>),
    Float64Array(Vec<f64>),
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Int16(_) => "int16",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int32(_) => "int32",
            PropertyValue::Float32(_) => "float32",
            PropertyValue::Float64(_) => "float64",
            PropertyValue::Int64(_) => "int64",
            PropertyValue::Raw(_) => "raw",
            PropertyValue::String(_) => "string",
            PropertyValue::Int32Array(_) => "int32 array",
            PropertyValue::Int64Array(_) => "int64 array",
            PropertyValue::Float32Array(_) => "float32 array",
            PropertyValue::Float64Array(_) => "float64 array",
            PropertyValue::BoolArray(_) => "bool array",
            PropertyValue::ByteArray(_) => "byte array",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            PropertyValue::Int32Array(_)
                | PropertyValue::Int64Array(_)
                | PropertyValue::Float32Array(_)
                | PropertyValue::Float64Array(_)
                | PropertyValue::BoolArray(_)
                | PropertyValue::ByteArray(_)
        )
    }

    /// Any integer scalar, widened
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int16(v) => Some(i64::from(*v)),
            PropertyValue::Int32(v) => Some(i64::from(*v)),
            PropertyValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric scalar, widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float32(v) => Some(f64::from(*v)),
            PropertyValue::Float64(v) => Some(*v),
            PropertyValue::Int16(v) => Some(f64::from(*v)),
            PropertyValue::Int32(v) => Some(f64::from(*v)),
            PropertyValue::Int64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Booleans, and integers read as non-zero
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            other => other.as_i64().map(|v| v != 0),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Any numeric array, widened to `f64`
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            PropertyValue::Float64Array(v) => Some(v.clone()),
            PropertyValue::Float32Array(v) => Some(v.iter().copied().map(f64::from).collect()),
            PropertyValue::Int32Array(v) => Some(v.iter().copied().map(f64::from).collect()),
            PropertyValue::Int64Array(v) => Some(v.iter().map(|i| *i as f64).collect()),
            _ => None,
        }
    }

    /// Any integer array, widened to `i64`
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            PropertyValue::Int64Array(v) => Some(v.clone()),
            PropertyValue::Int32Array(v) => Some(v.iter().copied().map(i64::from).collect()),
            _ => None,
        }
    }

    /// Interpret an unquoted text literal
    pub fn from_literal(text: &str) -> PropertyValue {
        if let Some(v) = parse_integer(text) {
            PropertyValue::Int64(v)
        } else if let Some(v) = parse_real(text) {
            PropertyValue::Float64(v)
        } else {
            PropertyValue::String(text.to_owned())
        }
    }
}

pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    dec_int::<_, i64, ContextError>.parse(text).ok()
}

pub(crate) fn parse_real(text: &str) -> Option<f64> {
    float::<_, f64, ContextError>.parse(text).ok()
}

fn write_array<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in values.iter().take(DISPLAY_ITEMS).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    if values.len() > DISPLAY_ITEMS {
        write!(f, ", … {} items", values.len())?;
    }
    write!(f, "]")
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int16(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int32(v) => write!(f, "{}", v),
            PropertyValue::Float32(v) => write!(f, "{}", v),
            PropertyValue::Float64(v) => write!(f, "{}", v),
            PropertyValue::Int64(v) => write!(f, "{}", v),
            PropertyValue::Raw(v) => write!(f, "<{} bytes>", v.len()),
            PropertyValue::String(v) => write!(f, "{:?}", v),
            PropertyValue::Int32Array(v) => write_array(f, v),
            PropertyValue::Int64Array(v) => write_array(f, v),
            PropertyValue::Float32Array(v) => write_array(f, v),
            PropertyValue::Float64Array(v) => write_array(f, v),
            PropertyValue::BoolArray(v) => write_array(f, v),
            PropertyValue::ByteArray(v) => write_array(f, v),
        }
    }
}
