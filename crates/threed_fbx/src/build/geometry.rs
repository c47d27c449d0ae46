//! Mesh geometry: control points, polygons and vertex element layers.

use threed_scene::{MappingMode, Mesh, ReferenceMode, VertexElement, VertexElementData};
use tracing::{debug, warn};

use crate::scope::Element;
use crate::value::PropertyValue;

/// Split a `PolygonVertexIndex` array into faces.
///
/// The last index of every face is stored as its one's complement (`-(i + 1)`), which closes
/// the face. Faces with fewer than three vertices are dropped, as are faces referencing an index
/// that does not fit a `u32`. A trailing face without a closing index is kept.
///
/// ```
/// use threed_fbx::build::decode_polygons;
///
/// assert_eq!(
///     decode_polygons(&[0, 1, -3, 4, 5, -1]),
///     vec![vec![0, 1, 2], vec![4, 5, 0]]
/// );
/// ```
pub fn decode_polygons(indices: &[i64]) -> Vec<Vec<u32>> {
    fn close(polygons: &mut Vec<Vec<u32>>, current: &mut Vec<u32>, valid: &mut bool) {
        let polygon = std::mem::take(current);
        if !*valid {
            warn!(vertices = polygon.len(), "dropping polygon with an out of range index");
        } else if polygon.len() < 3 {
            debug!(vertices = polygon.len(), "dropping degenerate polygon");
        } else {
            polygons.push(polygon);
        }
        *valid = true;
    }

    let mut polygons = Vec::new();
    let mut current = Vec::new();
    let mut valid = true;

    for &raw in indices {
        let (index, closes) = if raw < 0 { (!raw, true) } else { (raw, false) };
        match u32::try_from(index) {
            Ok(index) => current.push(index),
            Err(_) => valid = false,
        }
        if closes {
            close(&mut polygons, &mut current, &mut valid);
        }
    }

    if !current.is_empty() || !valid {
        warn!(vertices = current.len(), "polygon index list ends without closing its last face");
        close(&mut polygons, &mut current, &mut valid);
    }
    polygons
}

/// Numbers held by the first child element named `key`: one array property, or a plain comma
/// list of scalars as text documents may write it
fn f64_list(parent: &Element, key: &str) -> Option<Vec<f64>> {
    match parent.first(key)?.properties.as_slice() {
        [array] if array.is_array() => array.to_f64_vec(),
        [] => None,
        scalars => scalars.iter().map(PropertyValue::as_f64).collect(),
    }
}

fn i64_list(parent: &Element, key: &str) -> Option<Vec<i64>> {
    match parent.first(key)?.properties.as_slice() {
        [array] if array.is_array() => array.to_i64_vec(),
        [] => None,
        scalars => scalars.iter().map(PropertyValue::as_i64).collect(),
    }
}

fn mapping_mode(name: &str) -> Option<MappingMode> {
    match name {
        "ByControlPoint" | "ByVertice" | "ByVertex" => Some(MappingMode::ControlPoint),
        "ByPolygonVertex" => Some(MappingMode::PolygonVertex),
        "ByPolygon" => Some(MappingMode::Polygon),
        "ByEdge" => Some(MappingMode::Edge),
        "AllSame" => Some(MappingMode::AllSame),
        _ => None,
    }
}

fn reference_mode(name: &str) -> Option<ReferenceMode> {
    match name {
        "Direct" => Some(ReferenceMode::Direct),
        "IndexToDirect" | "Index" => Some(ReferenceMode::IndexToDirect),
        _ => None,
    }
}

/// Read one `LayerElementNormal` or `LayerElementUV` block. `values_key` and `index_key` name
/// its value and index arrays; `stride` is the number of components per value and `data`
/// groups the flat values.
fn read_layer(
    layer: &Element,
    values_key: &str,
    index_key: &str,
    stride: usize,
    data: fn(&[f64]) -> VertexElementData,
) -> Option<VertexElement> {
    let mapping_name = layer
        .value("MappingInformationType")
        .and_then(PropertyValue::as_str)
        .unwrap_or("ByControlPoint");
    let Some(mapping) = mapping_mode(mapping_name) else {
        warn!(layer = %layer.key, mapping = mapping_name, "unknown mapping mode");
        return None;
    };

    let reference_name = layer
        .value("ReferenceInformationType")
        .and_then(PropertyValue::as_str)
        .unwrap_or("Direct");
    let Some(reference) = reference_mode(reference_name) else {
        warn!(layer = %layer.key, reference = reference_name, "unknown reference mode");
        return None;
    };

    let Some(values) = f64_list(layer, values_key) else {
        warn!(layer = %layer.key, "layer has no {} array", values_key);
        return None;
    };
    if values.len() % stride != 0 {
        warn!(
            layer = %layer.key,
            len = values.len(),
            stride,
            "layer values do not divide into whole items"
        );
    }

    let indices = match reference {
        ReferenceMode::Direct => Vec::new(),
        ReferenceMode::IndexToDirect => {
            let Some(raw) = i64_list(layer, index_key) else {
                warn!(layer = %layer.key, "indexed layer has no {} array", index_key);
                return None;
            };
            let Ok(indices) = raw.into_iter().map(u32::try_from).collect::<Result<Vec<_>, _>>()
            else {
                warn!(layer = %layer.key, "layer index out of range");
                return None;
            };
            indices
        }
    };

    let name = layer
        .value("Name")
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_owned();
    Some(VertexElement {
        name,
        mapping,
        reference,
        data: data(&values),
        indices,
    })
}

fn read_normals(layer: &Element) -> Option<VertexElement> {
    read_layer(layer, "Normals", "NormalsIndex", 3, |values| {
        VertexElementData::Normals(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    })
}

fn read_uvs(layer: &Element) -> Option<VertexElement> {
    read_layer(layer, "UV", "UVIndex", 2, |values| {
        VertexElementData::Uvs(values.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
    })
}

/// Build a mesh from a `Geometry` element
pub fn read_mesh(geometry: &Element, name: &str) -> Mesh {
    let mut mesh = Mesh::new(name);

    if let Some(values) = f64_list(geometry, "Vertices") {
        if values.len() % 3 != 0 {
            warn!(len = values.len(), "vertex array length is not a multiple of 3");
        }
        mesh.control_points = values
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
    }

    if let Some(indices) = i64_list(geometry, "PolygonVertexIndex") {
        let control_points = mesh.control_points.len();
        for polygon in decode_polygons(&indices) {
            if polygon.iter().any(|i| *i as usize >= control_points) {
                warn!(mesh = name, "dropping polygon referencing a missing control point");
                continue;
            }
            mesh.create_polygon(polygon);
        }
    }

    mesh.vertex_elements.extend(
        geometry
            .elements("LayerElementNormal")
            .iter()
            .filter_map(read_normals),
    );
    mesh.vertex_elements.extend(
        geometry
            .elements("LayerElementUV")
            .iter()
            .filter_map(read_uvs),
    );

    debug!(
        mesh = name,
        control_points = mesh.control_points.len(),
        polygons = mesh.polygons.len(),
        layers = mesh.vertex_elements.len(),
        "read geometry"
    );
    mesh
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use threed_scene::{MappingMode, ReferenceMode, VertexElementData};
    use tracing_test::traced_test;

    use super::{decode_polygons, read_mesh};
    use crate::error::Result;
    use crate::read::TextScanner;
    use crate::scope::parse;
    use crate::token::Scanner;

    #[test]
    fn decodes_negative_index_face_termination() {
        assert_eq!(
            decode_polygons(&[0, 1, -3, 4, 5, -1]),
            vec![vec![0, 1, 2], vec![4, 5, 0]]
        );
        assert_eq!(
            decode_polygons(&[0, 1, 2, -4]),
            vec![vec![0, 1, 2, 3]]
        );
        assert!(decode_polygons(&[]).is_empty());
    }

    #[traced_test]
    #[test]
    fn drops_degenerate_and_out_of_range_faces() {
        assert_eq!(
            decode_polygons(&[0, -2, 1, 2, -4]),
            vec![vec![1, 2, 3]]
        );
        assert_eq!(
            decode_polygons(&[0, 1, 1 << 40, -3, 3, 4, -6]),
            vec![vec![3, 4, 5]]
        );
        assert!(logs_contain("dropping polygon with an out of range index"));
    }

    #[traced_test]
    #[test]
    fn keeps_unterminated_trailing_face() {
        assert_eq!(
            decode_polygons(&[0, 1, -3, 2, 3, 0]),
            vec![vec![0, 1, 2], vec![2, 3, 0]]
        );
        assert!(logs_contain("ends without closing its last face"));
    }

    const QUAD: &str = r#"
Geometry: 100, "Geometry::Quad", "Mesh" {
    Vertices: *12 {
        a: 0,0,0,1,0,0,1,1,0,0,1,0
    }
    PolygonVertexIndex: *4 {
        a: 0,1,2,-4
    }
    LayerElementNormal: 0 {
        Version: 101
        Name: ""
        MappingInformationType: "ByPolygonVertex"
        ReferenceInformationType: "Direct"
        Normals: *12 {
            a: 0,0,1,0,0,1,0,0,1,0,0,1
        }
    }
    LayerElementUV: 0 {
        Name: "UVMap"
        MappingInformationType: "ByPolygonVertex"
        ReferenceInformationType: "IndexToDirect"
        UV: *4 {
            a: 0,0,1,1
        }
        UVIndex: *4 {
            a: 0,0,1,1
        }
    }
    LayerElementUV: 1 {
        MappingInformationType: "ByNothing"
        UV: *2 {
            a: 0,0
        }
    }
}
"#;

    #[traced_test]
    #[test]
    fn reads_mesh_layers() -> Result<()> {
        let root = parse(TextScanner::new().scan(QUAD.as_bytes())?)?;
        let mesh = read_mesh(root.first("Geometry").unwrap(), "Quad");

        assert_eq!(mesh.name, "Quad");
        assert_eq!(mesh.control_points.len(), 4);
        assert_eq!(mesh.control_points[2], [1.0, 1.0, 0.0]);
        assert_eq!(mesh.polygons, vec![vec![0, 1, 2, 3]]);

        let normals = mesh.normals().unwrap();
        assert_eq!(normals.mapping, MappingMode::PolygonVertex);
        assert_eq!(normals.reference, ReferenceMode::Direct);
        assert_eq!(normals.data.len(), 4);

        let uvs = mesh.uvs().unwrap();
        assert_eq!(uvs.name, "UVMap");
        assert_eq!(uvs.reference, ReferenceMode::IndexToDirect);
        assert_eq!(uvs.indices, vec![0, 0, 1, 1]);
        assert_eq!(uvs.data, VertexElementData::Uvs(vec![[0.0, 0.0], [1.0, 1.0]]));

        // The layer with an unknown mapping is skipped
        assert_eq!(mesh.vertex_elements.len(), 2);
        assert!(logs_contain("unknown mapping mode"));
        Ok(())
    }

    #[traced_test]
    #[test]
    fn drops_polygons_past_control_points() -> Result<()> {
        let text = "Geometry: 1, \"\", \"Mesh\" {\n\
                    \tVertices: *9 {\n\t\ta: 0,0,0,1,0,0,1,1,0\n\t}\n\
                    \tPolygonVertexIndex: *6 {\n\t\ta: 0,1,-3,0,1,-4\n\t}\n\
                    }\n";
        let root = parse(TextScanner::new().scan(text.as_bytes())?)?;
        let mesh = read_mesh(root.first("Geometry").unwrap(), "Tri");
        assert_eq!(mesh.polygons, vec![vec![0, 1, 2]]);
        assert!(logs_contain("missing control point"));
        Ok(())
    }

    #[traced_test]
    #[test]
    fn reads_plain_scalar_lists() -> Result<()> {
        let text = "Geometry: 1, \"Geometry::Tri\", \"Mesh\" {\n\
                    \tVertices: 0,0,0,1,0,0\n\
                    \t0,1,0\n\
                    \tPolygonVertexIndex: 0,1,-3\n\
                    \tLayerElementNormal: 0 {\n\
                    \t\tMappingInformationType: \"ByPolygon\"\n\
                    \t\tNormals: 0,0,1\n\
                    \t}\n\
                    }\n";
        let root = parse(TextScanner::new().scan(text.as_bytes())?)?;
        let geometry = root.first("Geometry").unwrap();
        assert_eq!(geometry.first("Vertices").unwrap().properties.len(), 9);

        let mesh = read_mesh(geometry, "Tri");
        assert_eq!(
            mesh.control_points,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
        assert_eq!(mesh.polygons, vec![vec![0, 1, 2]]);
        assert_eq!(
            mesh.normals().unwrap().data,
            VertexElementData::Normals(vec![[0.0, 0.0, 1.0]])
        );
        assert!(logs_contain("read geometry"));
        Ok(())
    }

    #[test]
    fn ignores_lists_with_text_entries() -> Result<()> {
        let text = "Geometry: 1 {\n\tVertices: 0,\"x\",0\n\tPolygonVertexIndex: 0,1,-3\n}\n";
        let root = parse(TextScanner::new().scan(text.as_bytes())?)?;
        let mesh = read_mesh(root.first("Geometry").unwrap(), "Broken");
        assert!(mesh.control_points.is_empty());
        assert!(mesh.polygons.is_empty());
        Ok(())
    }
}
