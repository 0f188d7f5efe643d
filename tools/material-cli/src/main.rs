//! Nether Material - resource pack material tool
//!
//! # Commands
//!
//! - `nether-material inspect` - Summarise one .material.bin file
//! - `nether-material check` - Compare a pack's material revisions with the game's
//! - `nether-material update` - Re-encode a pack's materials at the game's revision
//! - `nether-material retarget` - Re-encode one file at an explicit revision
//! - `nether-material bgfx` - List the shader binaries inside one file
//!
//! # Usage
//!
//! ```bash
//! # Is this pack built for the installed game?
//! nether-material check ./MyShaderPack --data-dir ~/games/bedrock/data
//!
//! # Bring it up to date (in place, atomic per file)
//! nether-material update ./MyShaderPack --data-dir ~/games/bedrock/data
//!
//! # Preview what would change
//! nether-material update ./MyShaderPack --dry-run --json
//! ```
//!
//! # Configuration (nether-material.toml)
//!
//! ```toml
//! [game]
//! data_dir = "/path/to/installation/data"
//!
//! [update]
//! jobs = 4
//! ```

mod bgfx;
mod compat;
mod config;
#[cfg(test)]
mod fixtures;
mod fs;
mod inspect;
mod retarget;
mod scan;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Nether Material - resource pack material tool
#[derive(Parser)]
#[command(name = "nether-material")]
#[command(about = "Inspect, check and retarget RenderDragon .material.bin files")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./nether-material.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a .material.bin file
    Inspect(inspect::InspectArgs),

    /// Check whether a pack's materials match the game's revision
    Check(compat::CheckArgs),

    /// Re-encode a pack's materials at the game's revision
    Update(compat::UpdateArgs),

    /// Re-encode one file at an explicit revision
    Retarget(retarget::RetargetArgs),

    /// List the shader binaries inside a .material.bin file
    Bgfx(bgfx::BgfxArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::ToolConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Check(args) => compat::execute_check(args, &config),
        Commands::Update(args) => compat::execute_update(args, &config),
        Commands::Retarget(args) => retarget::execute(args),
        Commands::Bgfx(args) => bgfx::execute(args),
    }
}
