//! Document level metadata: who wrote the file and which axis system it uses.

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One signed axis of a coordinate system, `index` 0..=2 for X, Y, Z
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Axis {
    pub index: u8,
    pub positive: bool,
}

impl Axis {
    pub const X: Axis = Axis::new(0, true);
    pub const Y: Axis = Axis::new(1, true);
    pub const Z: Axis = Axis::new(2, true);

    pub const fn new(index: u8, positive: bool) -> Self {
        Self { index, positive }
    }
}

/// A loosely typed property value kept from a document's settings blocks
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Property {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Vector3([f64; 3]),
}

/// Metadata describing the document a scene was loaded from
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AssetInfo {
    pub creator: Option<String>,
    pub format_version: Option<u32>,
    pub up_axis: Option<Axis>,
    pub front_axis: Option<Axis>,
    pub coord_axis: Option<Axis>,
    /// Scale to convert document units to centimeters
    pub unit_scale_factor: Option<f64>,
    /// Raw settings retained on request, in document order
    pub properties: IndexMap<String, Property>,
}
