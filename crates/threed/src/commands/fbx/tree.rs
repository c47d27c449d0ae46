use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use threed_fbx::{PropertyValue, Scope};

/// Properties shown per element before eliding the rest
const SHOWN_PROPERTIES: usize = 4;

#[derive(Args)]
pub struct TreeArgs {
    /// An input FBX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only print elements up to this depth
    #[arg(short, long)]
    depth: Option<usize>,
}

fn summarize(properties: &[PropertyValue]) -> String {
    let mut summary = properties
        .iter()
        .take(SHOWN_PROPERTIES)
        .map(|p| match p {
            PropertyValue::String(s) => format!("{:?}", s),
            other => other.to_string(),
        })
        .join(", ");
    if properties.len() > SHOWN_PROPERTIES {
        summary.push_str(&format!(", ... ({} total)", properties.len()));
    }
    summary
}

impl TreeArgs {
    fn print(&self, scope: &Scope, depth: usize) {
        if self.depth.is_some_and(|max| depth > max) {
            return;
        }
        let indent = "  ".repeat(depth);
        for element in scope.in_order() {
            println!(
                "{}{}: {}",
                indent,
                element.key.bold(),
                summarize(&element.properties).cyan()
            );
            if let Some(child) = element.child() {
                self.print(child, depth + 1);
            }
        }
    }

    pub fn handle(&self) -> Result<()> {
        let document = super::open(&self.file)?;
        println!(
            "{:?} document, version {}",
            document.encoding(),
            document
                .version()
                .map_or_else(|| "unknown".to_string(), |v| v.to_string())
        );
        self.print(document.root(), 0);
        Ok(())
    }
}
