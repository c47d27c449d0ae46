pub mod check;
pub mod scene;
pub mod tokens;
pub mod tree;

use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use threed_fbx::FbxDocument;

#[derive(clap::Subcommand)]
pub enum FbxCommands {
    /// Print the token stream of a document
    Tokens(tokens::TokensArgs),
    /// Print the element tree of a document
    Tree(tree::TreeArgs),
    /// Build the scene of a document and print its hierarchy
    Scene(scene::SceneArgs),
    /// Decode every document in a directory and report failures
    Check(check::CheckArgs),
}

impl FbxCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            FbxCommands::Tokens(tokens) => tokens.handle(),
            FbxCommands::Tree(tree) => tree.handle(),
            FbxCommands::Scene(scene) => scene.handle(),
            FbxCommands::Check(check) => check.handle(),
        }
    }
}

/// Read the whole file at `path`
fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}

/// Read and parse the document at `path`
fn open(path: &Path) -> Result<FbxDocument> {
    let data = read(path)?;
    FbxDocument::parse(&data).context(format!("decoding {}", path.display()))
}
