use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use threed_fbx::read::Encoding;
use threed_fbx::token::{Token, TokenKind};

#[derive(Args)]
pub struct TokensArgs {
    /// An input FBX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Stop after this many tokens
    #[arg(short, long)]
    limit: Option<usize>,
}

fn print_token(token: &Token) {
    let position = token.position.to_string();
    match &token.kind {
        TokenKind::Key(key) => println!("{:>28}  {}", position.dimmed(), key.bold()),
        TokenKind::Data(value) => println!("{:>28}  {}", position.dimmed(), value.cyan()),
        TokenKind::OpenScope | TokenKind::CloseScope | TokenKind::Separator => {
            println!("{:>28}  {}", position.dimmed(), token.kind.describe().yellow())
        }
    }
}

impl TokensArgs {
    pub fn handle(&self) -> Result<()> {
        let data = super::read(&self.file)?;
        let encoding = Encoding::detect(&data).ok_or(threed_fbx::Error::UnknownFormat)?;
        let tokens = encoding
            .scan(&data)
            .context(format!("scanning {}", self.file.display()))?;

        let shown = self.limit.unwrap_or(tokens.len()).min(tokens.len());
        tokens.iter().take(shown).for_each(print_token);
        if shown < tokens.len() {
            println!("... {} more tokens", tokens.len() - shown);
        }
        Ok(())
    }
}
