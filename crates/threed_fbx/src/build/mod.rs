//! Resolution of a parsed document into a [`Scene`].
//!
//! Objects reference each other only through [`DocumentId`]s, and a document may declare an
//! object before the objects it is connected to. Building therefore runs in two passes:
//!
//! 1. [`SceneBuilder::instantiate`] creates a mesh, node or material for every `Geometry`,
//!    `Model` and `Material` element under `Objects` and records it in an [`ObjectTable`].
//! 2. [`SceneBuilder::link`] walks `Connections` and wires the recorded objects together.
//!
//! Connections that cannot be resolved are never fatal. They are logged, skipped and counted in
//! [`LinkStats`].

mod connection;
mod geometry;
mod properties;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use derive_more::Display;
use threed_scene::{Axis, Material, MaterialId, MeshId, NodeId, Scene, ShadingModel};
use tracing::{debug, info, instrument, trace, warn};

pub use connection::{Connection, DocumentId, Relation};
pub use geometry::{decode_polygons, read_mesh};
pub use properties::{PropertyBlock, PropertyEntry};

use crate::options::FbxLoadOptions;
use crate::scope::{Element, Scope};
use crate::value::PropertyValue;

/// A scene object created in the first pass
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ObjectHandle {
    Mesh(MeshId),
    Node(NodeId),
    Material(MaterialId),
}

/// Maps document ids to the objects created for them
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: HashMap<DocumentId, ObjectHandle>,
}

impl ObjectTable {
    /// Record `handle` under `id`. The first object registered for an id is kept.
    pub fn insert(&mut self, id: DocumentId, handle: ObjectHandle) -> bool {
        match self.objects.entry(id) {
            Entry::Occupied(existing) => {
                warn!(%id, existing = %existing.get(), ignored = %handle, "duplicate object id");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    pub fn get(&self, id: DocumentId) -> Option<ObjectHandle> {
        self.objects.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Outcome of the connection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Edges applied to the scene
    pub linked: usize,
    /// Edges naming an id that no object was created for
    pub unresolved: usize,
    /// Edges between kinds of objects that are never attached to each other
    pub ignored: usize,
    /// Edges the scene refused, such as ones that would close a cycle
    pub rejected: usize,
    /// Edges of a relation other than object to object
    pub unsupported: usize,
    /// `C` elements without a relation and two integer ids
    pub malformed: usize,
}

/// The parent side of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    Object(ObjectHandle),
}

/// Strip the class decoration from an object name: binary documents store `Name\0\x01Class`,
/// text documents `Class::Name`
pub fn object_name(raw: &str) -> &str {
    if let Some((name, _class)) = raw.split_once("\u{0}\u{1}") {
        name
    } else if let Some((_class, name)) = raw.split_once("::") {
        name
    } else {
        raw
    }
}

fn object_id(element: &Element) -> Option<DocumentId> {
    element
        .property(0)
        .and_then(PropertyValue::as_i64)
        .map(DocumentId)
}

fn element_name(element: &Element) -> &str {
    element
        .property(1)
        .and_then(PropertyValue::as_str)
        .map(object_name)
        .unwrap_or_default()
}

fn axis(block: &PropertyBlock<'_>, index: &str, sign: &str) -> Option<Axis> {
    let index = u8::try_from(block.i64(index)?).ok().filter(|i| *i < 3)?;
    let positive = block.i64(sign).map_or(true, |s| s >= 0);
    Some(Axis::new(index, positive))
}

/// Builds a [`Scene`] from a parsed document
pub struct SceneBuilder<'a> {
    options: &'a FbxLoadOptions,
    scene: Scene,
    objects: ObjectTable,
    stats: LinkStats,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(options: &'a FbxLoadOptions) -> Self {
        Self {
            options,
            scene: Scene::new(),
            objects: ObjectTable::default(),
            stats: LinkStats::default(),
        }
    }

    /// Run both passes over `root`
    pub fn build(mut self, root: &Scope) -> (Scene, LinkStats) {
        self.read_header(root);
        self.read_global_settings(root);
        self.instantiate(root);
        self.link(root);
        (self.scene, self.stats)
    }

    /// Read creator and version from `FBXHeaderExtension`
    pub fn read_header(&mut self, root: &Scope) {
        let info = &mut self.scene.asset_info;
        if let Some(header) = root.first("FBXHeaderExtension") {
            info.format_version = header
                .value("FBXVersion")
                .and_then(PropertyValue::as_i64)
                .and_then(|v| u32::try_from(v).ok());
            info.creator = header
                .value("Creator")
                .and_then(PropertyValue::as_str)
                .map(str::to_owned);
        }
        if info.creator.is_none() {
            info.creator = root
                .first("Creator")
                .and_then(|e| e.property(0))
                .and_then(PropertyValue::as_str)
                .map(str::to_owned);
        }
    }

    /// Read the axis system and unit scale from `GlobalSettings`
    pub fn read_global_settings(&mut self, root: &Scope) {
        let Some(settings) = root.first("GlobalSettings") else {
            debug!("document has no GlobalSettings");
            return;
        };
        let block = PropertyBlock::read(settings, self.options.compatible_mode);

        let info = &mut self.scene.asset_info;
        info.up_axis = axis(&block, "UpAxis", "UpAxisSign");
        info.front_axis = axis(&block, "FrontAxis", "FrontAxisSign");
        info.coord_axis = axis(&block, "CoordAxis", "CoordAxisSign");
        info.unit_scale_factor = block.f64("UnitScaleFactor");

        if self.options.keep_builtin_global_settings {
            for entry in block.iter() {
                match entry.to_property() {
                    Some(property) => {
                        info.properties
                            .entry(entry.name.to_owned())
                            .or_insert(property);
                    }
                    None => trace!(name = entry.name, "skipping setting without a simple value"),
                }
            }
        }
        debug!(settings = block.len(), "read global settings");
    }

    fn register(&mut self, element: &Element, handle: ObjectHandle) {
        match object_id(element) {
            Some(id) => {
                self.objects.insert(id, handle);
            }
            None => warn!(
                key = %element.key,
                position = %element.position,
                "object without an id cannot be connected"
            ),
        }
    }

    /// First pass: create an object for every `Geometry`, `Model` and `Material`
    #[instrument(skip_all)]
    pub fn instantiate(&mut self, root: &Scope) {
        let Some(objects) = root.first("Objects") else {
            warn!("document has no Objects");
            return;
        };

        for geometry in objects.elements("Geometry") {
            if let Some(class) = geometry.property(2).and_then(PropertyValue::as_str) {
                trace!(class, "reading geometry");
            }
            let mesh = read_mesh(geometry, element_name(geometry));
            let id = self.scene.add_mesh(mesh);
            self.register(geometry, ObjectHandle::Mesh(id));
        }

        for model in objects.elements("Model") {
            let id = self.read_model(model);
            self.register(model, ObjectHandle::Node(id));
        }

        for material in objects.elements("Material") {
            let id = self.read_material(material);
            self.register(material, ObjectHandle::Material(id));
        }

        debug!(objects = self.objects.len(), "instantiated objects");
    }

    fn read_model(&mut self, model: &Element) -> NodeId {
        let id = self.scene.create_node(element_name(model));
        let block = PropertyBlock::read(model, false);

        if let Some(node) = self.scene.node_mut(id) {
            if let Some(v) = block.vector3("Lcl Translation") {
                node.transform.translation = v;
            }
            if let Some(v) = block.vector3("Lcl Rotation") {
                node.transform.rotation = v;
            }
            if let Some(v) = block.vector3("Lcl Scaling") {
                node.transform.scaling = v;
            }
            if let Some(visible) = block.bool("Visibility") {
                node.visible = visible;
            }
        }
        id
    }

    fn read_material(&mut self, element: &Element) -> MaterialId {
        let mut material = Material::new(element_name(element));
        if let Some(model) = element
            .value("ShadingModel")
            .and_then(PropertyValue::as_str)
        {
            material.shading_model = ShadingModel::from_name(model);
        }

        let block = PropertyBlock::read(element, false);
        material.diffuse_color = block.any_vector3(&["DiffuseColor", "Diffuse"]);
        material.ambient_color = block.any_vector3(&["AmbientColor", "Ambient"]);
        material.emissive_color = block.any_vector3(&["EmissiveColor", "Emissive"]);
        material.specular_color = block.any_vector3(&["SpecularColor", "Specular"]);
        material.shininess = block.any_f64(&["Shininess", "ShininessExponent"]);
        material.transparency = block
            .f64("TransparencyFactor")
            .or_else(|| block.f64("Opacity").map(|opacity| 1.0 - opacity));

        self.scene.add_material(material)
    }

    fn resolve_parent(&self, id: DocumentId) -> Option<Parent> {
        if id == DocumentId::ROOT {
            Some(Parent::Root)
        } else {
            self.objects.get(id).map(Parent::Object)
        }
    }

    /// Second pass: apply every object to object connection
    #[instrument(skip_all)]
    pub fn link(&mut self, root: &Scope) {
        let Some(connections) = root.first("Connections") else {
            debug!("document has no Connections");
            return;
        };

        for element in connections.elements("C") {
            let Some(connection) = Connection::from_element(element) else {
                warn!(position = %element.position, "malformed connection");
                self.stats.malformed += 1;
                continue;
            };

            if connection.relation != Relation::ObjectObject {
                debug!(
                    relation = connection.relation.code(),
                    child = %connection.child,
                    parent = %connection.parent,
                    "connection relation not supported"
                );
                self.stats.unsupported += 1;
                continue;
            }
            self.link_objects(connection.child, connection.parent);
        }

        info!(
            linked = self.stats.linked,
            unresolved = self.stats.unresolved,
            ignored = self.stats.ignored,
            rejected = self.stats.rejected,
            unsupported = self.stats.unsupported,
            malformed = self.stats.malformed,
            "resolved connections"
        );
    }

    fn link_objects(&mut self, child_id: DocumentId, parent_id: DocumentId) {
        let (Some(child), Some(parent)) = (self.objects.get(child_id), self.resolve_parent(parent_id))
        else {
            debug!(child = %child_id, parent = %parent_id, "connection names an unknown object");
            self.stats.unresolved += 1;
            return;
        };

        let result = match (child, parent) {
            (ObjectHandle::Mesh(mesh), Parent::Object(ObjectHandle::Node(node))) => {
                self.scene.set_entity(node, mesh)
            }
            (ObjectHandle::Material(material), Parent::Object(ObjectHandle::Node(node))) => {
                self.scene.add_node_material(node, material)
            }
            (ObjectHandle::Node(node), Parent::Object(ObjectHandle::Node(parent))) => {
                self.scene.set_parent(node, parent)
            }
            (ObjectHandle::Node(node), Parent::Root) => {
                let root = self.scene.root_node();
                self.scene.set_parent(node, root)
            }
            _ => {
                trace!(child = %child_id, parent = %parent_id, "no attachment between these kinds");
                self.stats.ignored += 1;
                return;
            }
        };

        match result {
            Ok(()) => self.stats.linked += 1,
            Err(e) => {
                warn!(child = %child_id, parent = %parent_id, error = %e, "connection rejected");
                self.stats.rejected += 1;
            }
        }
    }
}

/// Build a scene from a parsed document
pub fn build(root: &Scope, options: &FbxLoadOptions) -> Scene {
    SceneBuilder::new(options).build(root).0
}
