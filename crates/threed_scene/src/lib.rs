//! In-memory scene graph shared by the *threed* importers.
//!
//! A [`Scene`] owns every [`Node`], [`Mesh`] and [`Material`] in flat arenas and hands out
//! opaque, copyable ids ([`NodeId`], [`MeshId`], [`MaterialId`]) instead of references. The
//! hierarchy is expressed by ids as well, which keeps the graph free of reference cycles and
//! lets importers create objects first and wire them together later.
//!
//! ```
//! use threed_scene::{Mesh, Scene};
//!
//! # fn main() -> threed_scene::error::Result<()> {
//! let mut scene = Scene::new();
//! let cube = scene.create_node("Cube");
//! let mesh = scene.add_mesh(Mesh::new("CubeMesh"));
//!
//! scene.set_entity(cube, mesh)?;
//! scene.set_parent(cube, scene.root_node())?;
//!
//! assert_eq!(scene.find_node("Cube"), Some(cube));
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod error;
pub mod material;
pub mod mesh;
pub mod node;
pub mod scene;

pub use asset::{AssetInfo, Axis, Property};
pub use material::{Material, ShadingModel};
pub use mesh::{MappingMode, Mesh, ReferenceMode, VertexElement, VertexElementData};
pub use node::{Node, Transform};
pub use scene::{MaterialId, MeshId, NodeId, Scene};
