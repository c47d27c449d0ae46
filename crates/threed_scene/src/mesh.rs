//! Polygon meshes and their per-vertex attribute layers.

#[cfg(feature = "serde")]
use serde::Serialize;

/// How the values of a [`VertexElement`] are distributed over the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MappingMode {
    /// One value per control point
    ControlPoint,
    /// One value per corner of every polygon
    PolygonVertex,
    /// One value per polygon
    Polygon,
    /// One value per edge
    Edge,
    /// A single value for the whole mesh
    AllSame,
}

/// How values of a [`VertexElement`] are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ReferenceMode {
    /// The n-th mapped item uses the n-th value
    Direct,
    /// The n-th mapped item uses the value at `indices[n]`
    IndexToDirect,
}

/// Values carried by a vertex element layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum VertexElementData {
    Normals(Vec<[f64; 3]>),
    Uvs(Vec<[f64; 2]>),
}

impl VertexElementData {
    pub fn len(&self) -> usize {
        match self {
            VertexElementData::Normals(v) => v.len(),
            VertexElementData::Uvs(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A layer of per-vertex attributes such as normals or texture coordinates
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VertexElement {
    pub name: String,
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub data: VertexElementData,
    /// Only meaningful with [`ReferenceMode::IndexToDirect`]
    pub indices: Vec<u32>,
}

/// A polygon mesh: control point positions, faces indexing into them and attribute layers
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Mesh {
    pub name: String,
    pub control_points: Vec<[f64; 3]>,
    pub polygons: Vec<Vec<u32>>,
    pub vertex_elements: Vec<VertexElement>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a face made of control point indices
    pub fn create_polygon(&mut self, indices: impl Into<Vec<u32>>) {
        self.polygons.push(indices.into());
    }

    /// Number of polygon corners over all faces
    pub fn polygon_vertex_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// The first normal layer, if any
    pub fn normals(&self) -> Option<&VertexElement> {
        self.vertex_elements
            .iter()
            .find(|e| matches!(e.data, VertexElementData::Normals(_)))
    }

    /// The first texture coordinate layer, if any
    pub fn uvs(&self) -> Option<&VertexElement> {
        self.vertex_elements
            .iter()
            .find(|e| matches!(e.data, VertexElementData::Uvs(_)))
    }
}
