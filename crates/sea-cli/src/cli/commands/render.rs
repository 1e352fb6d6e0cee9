//! Markdown render command.

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sea_core::markdown;

pub fn run(file: Option<&Path>) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read markdown from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read markdown from stdin")?;
            buf
        }
    };

    print!("{}", markdown::to_html(&input));
    Ok(())
}
