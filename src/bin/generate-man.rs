// Writes the tdl(1) man page into the given directory (default: current directory)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_mangen::Man;
use tdl::cli::Cli;

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;

    let mut buffer = Vec::new();
    Man::new(Cli::command()).render(&mut buffer).context("Failed to render man page")?;

    let path = out_dir.join("tdl.1");
    std::fs::write(&path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
