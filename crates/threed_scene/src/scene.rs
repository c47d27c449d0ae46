//! The scene arena and the ids used to address it.

use derive_more::Display;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::asset::AssetInfo;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::node::Node;

/// Opaque handle to a [`Node`] stored in a [`Scene`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[display("node#{_0}")]
pub struct NodeId(u32);

/// Opaque handle to a [`Mesh`] stored in a [`Scene`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[display("mesh#{_0}")]
pub struct MeshId(u32);

/// Opaque handle to a [`Material`] stored in a [`Scene`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[display("material#{_0}")]
pub struct MaterialId(u32);

/// A scene graph rooted at a single node
///
/// Objects are only ever added; ids stay valid for the lifetime of the scene. Nodes start out
/// detached and join the hierarchy through [`Scene::set_parent`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Scene {
    pub asset_info: AssetInfo,
    root: NodeId,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene containing only the root node
    pub fn new() -> Self {
        Self {
            asset_info: AssetInfo::default(),
            root: NodeId(0),
            nodes: vec![Node::new("RootNode")],
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(name));
        id
    }

    /// Create a node directly attached under `parent`
    pub fn create_child_node(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.node(parent).ok_or(Error::UnknownNode(parent))?;
        let id = self.create_node(name);
        self.set_parent(id, parent)?;
        Ok(id)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    /// Make `mesh` the entity instantiated by `node`, replacing any previous one
    pub fn set_entity(&mut self, node: NodeId, mesh: MeshId) -> Result<()> {
        self.mesh(mesh).ok_or(Error::UnknownMesh(mesh))?;
        let target = self.node_mut(node).ok_or(Error::UnknownNode(node))?;
        target.entity = Some(mesh);
        Ok(())
    }

    /// Bind `material` to `node` after the materials already bound to it
    pub fn add_node_material(&mut self, node: NodeId, material: MaterialId) -> Result<()> {
        self.material(material)
            .ok_or(Error::UnknownMaterial(material))?;
        let target = self.node_mut(node).ok_or(Error::UnknownNode(node))?;
        if !target.materials.contains(&material) {
            target.materials.push(material);
        }
        Ok(())
    }

    /// Attach `child` under `parent`, detaching it from its previous parent first
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.node(child).ok_or(Error::UnknownNode(child))?;
        self.node(parent).ok_or(Error::UnknownNode(parent))?;

        if child == self.root {
            return Err(Error::RootReparent);
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(Error::Cycle { child, parent });
        }

        if let Some(previous) = self.nodes[child.0 as usize].parent.take() {
            self.nodes[previous.0 as usize]
                .children
                .retain(|id| *id != child);
        }

        trace!(%child, %parent, "attaching node");
        self.nodes[child.0 as usize].parent = Some(parent);
        self.nodes[parent.0 as usize].children.push(child);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0 as usize)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0 as usize)
    }

    /// All nodes including the root and detached ones, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshId(i as u32), m))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    /// Number of nodes, including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First node with the given name in creation order
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    /// Walk from `id` up to the top of its hierarchy, starting with `id` itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.node(*current).and_then(Node::parent)
        })
    }

    /// Whether `id` is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| n == self.root)
    }

    /// Depth first, pre-order listing of `id` and everything below it, paired with the depth
    /// relative to `id`
    pub fn descendants(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        let mut result = Vec::new();
        let mut stack = vec![(id, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            result.push((current, depth));
            stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        result
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::{Material, Mesh, Scene};

    #[test]
    fn new_scene_has_root() {
        let scene = Scene::new();
        let root = scene.root_node();

        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.node(root).map(|n| n.name.as_str()), Some("RootNode"));
        assert!(scene.is_attached(root));
    }

    #[test]
    fn nodes_start_detached() {
        let mut scene = Scene::new();
        let node = scene.create_node("Loose");

        assert!(!scene.is_attached(node));
        assert!(scene.node(scene.root_node()).unwrap().children().is_empty());
    }

    #[test]
    fn reparenting_moves_child() -> Result<()> {
        let mut scene = Scene::new();
        let a = scene.create_child_node(scene.root_node(), "A")?;
        let b = scene.create_child_node(scene.root_node(), "B")?;
        let c = scene.create_child_node(a, "C")?;

        scene.set_parent(c, b)?;

        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.node(b).unwrap().children(), &[c]);
        assert_eq!(scene.node(c).unwrap().parent(), Some(b));
        Ok(())
    }

    #[test]
    fn rejects_cycles() -> Result<()> {
        let mut scene = Scene::new();
        let a = scene.create_child_node(scene.root_node(), "A")?;
        let b = scene.create_child_node(a, "B")?;

        assert_eq!(
            scene.set_parent(a, b),
            Err(Error::Cycle { child: a, parent: b })
        );
        assert_eq!(
            scene.set_parent(a, a),
            Err(Error::Cycle { child: a, parent: a })
        );
        assert_eq!(
            scene.set_parent(scene.root_node(), a),
            Err(Error::RootReparent)
        );
        Ok(())
    }

    #[test]
    fn binds_entities_and_materials() -> Result<()> {
        let mut scene = Scene::new();
        let node = scene.create_node("Cube");
        let mesh = scene.add_mesh(Mesh::new("CubeMesh"));
        let red = scene.add_material(Material::new("Red"));
        let blue = scene.add_material(Material::new("Blue"));

        scene.set_entity(node, mesh)?;
        scene.add_node_material(node, red)?;
        scene.add_node_material(node, blue)?;
        scene.add_node_material(node, red)?;

        let node = scene.node(node).unwrap();
        assert_eq!(node.entity(), Some(mesh));
        assert_eq!(node.materials(), &[red, blue]);
        assert_eq!(node.material(), Some(red));
        Ok(())
    }

    #[test]
    fn descendants_are_pre_order() -> Result<()> {
        let mut scene = Scene::new();
        let root = scene.root_node();
        let a = scene.create_child_node(root, "A")?;
        let a1 = scene.create_child_node(a, "A1")?;
        let b = scene.create_child_node(root, "B")?;

        assert_eq!(
            scene.descendants(root),
            vec![(root, 0), (a, 1), (a1, 2), (b, 1)]
        );
        Ok(())
    }
}
