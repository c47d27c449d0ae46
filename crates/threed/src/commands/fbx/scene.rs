use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use threed_fbx::FbxLoadOptions;
use threed_scene::Scene;
use tracing::info;

#[derive(Args)]
pub struct SceneArgs {
    /// An input FBX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print the scene as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Keep every GlobalSettings property in the asset info
    #[arg(long, default_value_t = false)]
    keep_global_settings: bool,

    /// Also read the legacy Properties60 layout of GlobalSettings
    #[arg(long, default_value_t = false)]
    compatible: bool,
}

fn print_hierarchy(scene: &Scene) {
    for (id, depth) in scene.descendants(scene.root_node()) {
        let Some(node) = scene.node(id) else {
            continue;
        };
        let mut details = Vec::new();
        if let Some(mesh) = node.entity().and_then(|m| scene.mesh(m)) {
            details.push(format!(
                "mesh {:?} ({} points, {} polygons)",
                mesh.name,
                mesh.control_points.len(),
                mesh.polygons.len()
            ));
        }
        if !node.materials().is_empty() {
            details.push(format!(
                "materials [{}]",
                node.materials()
                    .iter()
                    .filter_map(|m| scene.material(*m))
                    .map(|m| format!("{:?}", m.name))
                    .join(", ")
            ));
        }
        if !node.visible {
            details.push("hidden".to_string());
        }
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            node.name.bold(),
            details.join(", ").dimmed()
        );
    }

    let detached = scene
        .nodes()
        .filter(|(id, _)| !scene.is_attached(*id))
        .count();
    if detached > 0 {
        println!("{} nodes are not attached to the root", detached.yellow());
    }
}

impl SceneArgs {
    pub fn handle(&self) -> Result<()> {
        let document = super::open(&self.file)?;
        let options = FbxLoadOptions::builder()
            .keep_builtin_global_settings(self.keep_global_settings)
            .compatible_mode(self.compatible)
            .build();
        let (scene, stats) = document.to_scene_with_stats(&options);
        info!(?stats, "built scene");

        if self.json {
            let json = serde_json::to_string_pretty(&scene).into_diagnostic()?;
            println!("{}", json);
        } else {
            print_hierarchy(&scene);
        }
        Ok(())
    }
}
