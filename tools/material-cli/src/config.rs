//! nether-material.toml configuration
//!
//! Every value is optional; command-line flags take precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "nether-material.toml";

/// Game-relative location of the reference material.
pub const REFERENCE_MATERIAL: [&str; 3] = ["renderer", "materials", "RenderChunk.material.bin"];

#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub update: UpdateSection,
}

/// Where the installed game lives
#[derive(Debug, Default, Deserialize)]
pub struct GameSection {
    /// Installation data directory (contains `renderer/materials`).
    pub data_dir: Option<PathBuf>,
    /// Explicit reference material; wins over `data_dir`.
    pub reference: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSection {
    /// Worker threads for `update`. 0 = rayon default.
    #[serde(default)]
    pub jobs: usize,
}

impl ToolConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// An explicit path must exist; the default file is optional.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            tracing::debug!(path = %default.display(), "loading default config");
            return Self::load(default);
        }
        Ok(Self::default())
    }
}

/// Flags locating the game's reference material.
#[derive(Args, Debug, Default, Clone)]
pub struct GameArgs {
    /// Game data directory (reads renderer/materials/RenderChunk.material.bin)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Explicit reference .material.bin (overrides --data-dir)
    #[arg(long)]
    pub reference: Option<PathBuf>,
}

impl GameArgs {
    /// Resolve the reference material path.
    ///
    /// Priority:
    /// 1. `--reference`
    /// 2. `--data-dir`
    /// 3. `[game] reference` in the config file
    /// 4. `[game] data_dir` in the config file
    pub fn reference_path(&self, config: &ToolConfig) -> Option<PathBuf> {
        self.reference
            .clone()
            .or_else(|| self.data_dir.as_deref().map(reference_in))
            .or_else(|| config.game.reference.clone())
            .or_else(|| config.game.data_dir.as_deref().map(reference_in))
    }
}

/// The reference material inside a game data directory.
pub fn reference_in(data_dir: &Path) -> PathBuf {
    REFERENCE_MATERIAL
        .iter()
        .fold(data_dir.to_path_buf(), |path, component| path.join(component))
}
