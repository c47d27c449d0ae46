//! Surface materials bound to nodes.

#[cfg(feature = "serde")]
use serde::Serialize;

/// Lighting model a material was authored for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ShadingModel {
    #[default]
    Lambert,
    Phong,
    Other(String),
}

impl ShadingModel {
    /// Map a shading model name, ignoring case
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "lambert" => ShadingModel::Lambert,
            "phong" => ShadingModel::Phong,
            _ => ShadingModel::Other(name.to_owned()),
        }
    }
}

/// A named material. Colors are linear RGB triples.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Material {
    pub name: String,
    pub shading_model: ShadingModel,
    pub diffuse_color: Option<[f64; 3]>,
    pub ambient_color: Option<[f64; 3]>,
    pub emissive_color: Option<[f64; 3]>,
    pub specular_color: Option<[f64; 3]>,
    pub shininess: Option<f64>,
    pub transparency: Option<f64>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::ShadingModel;

    #[test]
    fn shading_model_names() {
        assert_eq!(ShadingModel::from_name("Phong"), ShadingModel::Phong);
        assert_eq!(ShadingModel::from_name("lambert"), ShadingModel::Lambert);
        assert_eq!(
            ShadingModel::from_name("unlit"),
            ShadingModel::Other("unlit".into())
        );
    }
}
