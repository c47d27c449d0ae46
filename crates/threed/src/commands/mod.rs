pub mod fbx;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle FBX documents
    Fbx {
        #[command(subcommand)]
        command: fbx::FbxCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Fbx { command } => command.handle(),
        }
    }
}
