use std::path::PathBuf;

use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use threed_fbx::{FbxDocument, FbxLoadOptions};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Args)]
pub struct CheckArgs {
    /// A directory to search for FBX files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,
}

impl CheckArgs {
    pub fn handle(&self) -> Result<()> {
        let files = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("fbx")))
            .collect::<Vec<_>>();
        info!("checking {} files in {}", files.len(), self.directory.display());

        let options = FbxLoadOptions::default();
        let mut failures = files
            .par_iter()
            .filter_map(|path| {
                let result = std::fs::read(path)
                    .map_err(threed_fbx::Error::from)
                    .and_then(|data| FbxDocument::parse(&data));
                match result {
                    Ok(document) => {
                        let (scene, stats) = document.to_scene_with_stats(&options);
                        debug!(path = %path.display(), nodes = scene.node_count(), ?stats, "decoded");
                        None
                    }
                    Err(e) => Some((path, e)),
                }
            })
            .collect::<Vec<_>>();
        failures.sort_by(|a, b| a.0.cmp(b.0));

        for (path, error) in &failures {
            println!("{} {}: {}", "failed".red(), path.display(), error);
        }
        println!(
            "{} of {} files decoded",
            (files.len() - failures.len()).green(),
            files.len()
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(miette!("{} files failed to decode", failures.len()))
        }
    }
}
