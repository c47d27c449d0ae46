//! Typed property blocks attached to objects and settings.
//!
//! ```text
//! Properties70:  {
//!     P: "Lcl Translation", "Lcl Translation", "", "A",0,1.5,0
//!     P: "Visibility", "Visibility", "", "A",1
//! }
//! ```
//!
//! Each `P` element lists a name, a type, a label and flags before its values. The legacy
//! `Properties60` block uses `Property` elements without the label.

use threed_scene::Property;

use crate::scope::Element;
use crate::value::PropertyValue;

/// Index of the first value in a `P` element
const VALUES_70: usize = 4;

/// Index of the first value in a legacy `Property` element
const VALUES_60: usize = 3;

/// One named entry of a property block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyEntry<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub values: &'a [PropertyValue],
}

impl<'a> PropertyEntry<'a> {
    fn from_element(element: &'a Element, first_value: usize) -> Option<Self> {
        let name = element.property(0)?.as_str()?;
        let type_name = element
            .property(1)
            .and_then(PropertyValue::as_str)
            .unwrap_or_default();
        let values = element.properties.get(first_value..).unwrap_or_default();
        Some(Self {
            name,
            type_name,
            values,
        })
    }

    pub fn f64(&self) -> Option<f64> {
        self.values.first()?.as_f64()
    }

    pub fn i64(&self) -> Option<i64> {
        let value = self.values.first()?;
        value.as_i64().or_else(|| value.as_f64().map(|v| v as i64))
    }

    pub fn bool(&self) -> Option<bool> {
        let value = self.values.first()?;
        value.as_bool().or_else(|| value.as_f64().map(|v| v != 0.0))
    }

    pub fn vector3(&self) -> Option<[f64; 3]> {
        match self.values {
            [x, y, z] => Some([x.as_f64()?, y.as_f64()?, z.as_f64()?]),
            _ => None,
        }
    }

    /// Convert to a loosely typed scene property
    pub fn to_property(&self) -> Option<Property> {
        if let Some(v) = self.vector3() {
            return Some(Property::Vector3(v));
        }
        let [value] = self.values else {
            return None;
        };
        if self.type_name.eq_ignore_ascii_case("bool") {
            return self.bool().map(Property::Bool);
        }
        match value {
            PropertyValue::Bool(v) => Some(Property::Bool(*v)),
            PropertyValue::String(s) => Some(Property::String(s.clone())),
            PropertyValue::Float32(_) | PropertyValue::Float64(_) => value.as_f64().map(Property::Double),
            other => other.as_i64().map(Property::Integer),
        }
    }
}

/// The property entries of an object, first occurrence of a name wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBlock<'a> {
    entries: Vec<PropertyEntry<'a>>,
}

impl<'a> PropertyBlock<'a> {
    /// Read the `Properties70` block of `element`, followed by its `Properties60` block when
    /// `legacy` is set
    pub fn read(element: &'a Element, legacy: bool) -> Self {
        let mut entries: Vec<PropertyEntry<'a>> = element
            .first("Properties70")
            .map(|block| block.elements("P"))
            .unwrap_or_default()
            .iter()
            .filter_map(|p| PropertyEntry::from_element(p, VALUES_70))
            .collect();

        if legacy {
            entries.extend(
                element
                    .first("Properties60")
                    .map(|block| block.elements("Property"))
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|p| PropertyEntry::from_element(p, VALUES_60)),
            );
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyEntry<'a>> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyEntry<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.f64()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.i64()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.bool()
    }

    pub fn vector3(&self, name: &str) -> Option<[f64; 3]> {
        self.get(name)?.vector3()
    }

    /// The first of `names` present as a vector
    pub fn any_vector3(&self, names: &[&str]) -> Option<[f64; 3]> {
        names.iter().find_map(|name| self.vector3(name))
    }

    /// The first of `names` present as a number
    pub fn any_f64(&self, names: &[&str]) -> Option<f64> {
        names.iter().find_map(|name| self.f64(name))
    }
}
