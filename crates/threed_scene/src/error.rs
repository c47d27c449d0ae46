//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::{MaterialId, MeshId, NodeId};

/// Error type for library
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum Error {
    /// no node is stored under the given id
    #[error("no node is stored under {0}")]
    UnknownNode(NodeId),

    /// no mesh is stored under the given id
    #[error("no mesh is stored under {0}")]
    UnknownMesh(MeshId),

    /// no material is stored under the given id
    #[error("no material is stored under {0}")]
    UnknownMaterial(MaterialId),

    /// attaching would make a node its own ancestor
    #[error("attaching {child} under {parent} would create a cycle")]
    #[diagnostic(help("a node can not be parented to itself or one of its descendants"))]
    Cycle {
        /// node being attached
        child: NodeId,
        /// requested parent
        parent: NodeId,
    },

    /// the root node can not be given a parent
    #[error("the root node can not be attached to another node")]
    RootReparent,
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
