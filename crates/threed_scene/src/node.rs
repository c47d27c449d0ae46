//! Scene nodes and their local transforms.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::scene::{MaterialId, MeshId, NodeId};

/// Local transform of a node relative to its parent
///
/// Rotation is stored as euler angles in degrees, the way the source documents express it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Transform {
    pub translation: [f64; 3],
    pub rotation: [f64; 3],
    pub scaling: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scaling: [1.0; 3],
        }
    }
}

impl Transform {
    /// Whether this transform leaves its node where the parent puts it
    pub fn is_identity(&self) -> bool {
        *self == Transform::default()
    }
}

/// A named position in the hierarchy carrying at most one entity and any number of materials
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) entity: Option<MeshId>,
    pub(crate) materials: Vec<MaterialId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
            entity: None,
            materials: Vec::new(),
        }
    }

    /// The node this one is attached under, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The mesh this node instantiates
    pub fn entity(&self) -> Option<MeshId> {
        self.entity
    }

    /// Materials bound to this node in attachment order
    pub fn materials(&self) -> &[MaterialId] {
        &self.materials
    }

    /// The first bound material
    pub fn material(&self) -> Option<MaterialId> {
        self.materials.first().copied()
    }
}
