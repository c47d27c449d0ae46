use pretty_assertions::assert_eq;
use threed_scene::error::{Error, Result};
use threed_scene::{Material, Mesh, Scene};
use tracing_test::traced_test;

fn sample() -> Result<Scene> {
    let mut scene = Scene::new();
    let body = scene.create_child_node(scene.root_node(), "Body")?;
    let wheel = scene.create_child_node(body, "Wheel")?;

    let mut mesh = Mesh::new("WheelMesh");
    mesh.control_points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    mesh.create_polygon([0, 1, 2]);
    let mesh = scene.add_mesh(mesh);
    scene.set_entity(wheel, mesh)?;

    let rubber = scene.add_material(Material::new("Rubber"));
    scene.add_node_material(wheel, rubber)?;
    Ok(scene)
}

#[traced_test]
#[test]
fn builds_a_hierarchy() -> Result<()> {
    let mut scene = sample()?;
    let body = scene.find_node("Body").unwrap();
    let wheel = scene.find_node("Wheel").unwrap();

    assert!(scene.is_attached(wheel));
    assert_eq!(
        scene.ancestors(wheel).collect::<Vec<_>>(),
        vec![wheel, body, scene.root_node()]
    );
    assert_eq!(
        scene.set_parent(body, wheel),
        Err(Error::Cycle {
            child: body,
            parent: wheel
        })
    );

    let spare = scene.create_node("Spare");
    assert!(!scene.is_attached(spare));
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn serializes_to_json() -> Result<()> {
    let scene = sample()?;
    let json = serde_json::to_value(&scene).unwrap();

    assert_eq!(json["nodes"][2]["name"], "Wheel");
    assert_eq!(json["nodes"][2]["entity"], 0);
    assert_eq!(json["meshes"][0]["polygons"][0], serde_json::json!([0, 1, 2]));
    assert_eq!(json["materials"][0]["name"], "Rubber");
    Ok(())
}
