//! Pack compatibility check and in-place update
//!
//! The installed game's `RenderChunk.material.bin` defines the target
//! revision. A pack is compatible when every material it ships decodes at
//! that same revision; updating re-encodes each material at the target and
//! atomically replaces the files whose bytes change.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use nether_materialbin::{marshal, parse_auto};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{GameArgs, ToolConfig};
use crate::fs::{read_material, write_atomic};
use crate::scan::list_pack_materials;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Resource pack directory
    pub pack: PathBuf,

    #[command(flatten)]
    pub game: GameArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the update command
#[derive(Args)]
pub struct UpdateArgs {
    /// Resource pack directory
    pub pack: PathBuf,

    #[command(flatten)]
    pub game: GameArgs,

    /// Compute the report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Worker threads (default: config `[update] jobs`, then rayon's default)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Operator-facing failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    ErrInvalidPath,
    ErrReadGameRenderchunk,
    ErrReadPackMaterialbin,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusCode::ErrInvalidPath => "ERR_INVALID_PATH",
            StatusCode::ErrReadGameRenderchunk => "ERR_READ_GAME_RENDERCHUNK",
            StatusCode::ErrReadPackMaterialbin => "ERR_READ_PACK_MATERIALBIN",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatReport {
    pub has_material_bin: bool,
    pub compatible: bool,
    pub needs_update: bool,
    pub pack_material_path: Option<PathBuf>,
    pub pack_material_revision: Option<u64>,
    pub game_material_path: Option<PathBuf>,
    pub game_material_revision: Option<u64>,
    pub error: Option<StatusCode>,
}

impl Default for CompatReport {
    fn default() -> Self {
        Self {
            has_material_bin: false,
            compatible: true,
            needs_update: false,
            pack_material_path: None,
            pack_material_revision: None,
            game_material_path: None,
            game_material_revision: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub has_material_bin: bool,
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub error: Option<StatusCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Updated,
    Skipped,
    Failed,
}

/// Decode a material file and return its revision.
pub fn read_revision(path: &Path) -> Result<u64> {
    let bytes = read_material(path)?;
    let (_, revision) =
        parse_auto(&bytes).with_context(|| format!("Failed to decode: {}", path.display()))?;
    Ok(revision)
}

/// Compare every material in `pack` against the revision of `reference`.
///
/// Stops at the first pack material whose revision differs. Pack materials
/// that fail to decode are skipped.
pub fn check_pack(pack: &Path, reference: &Path) -> CompatReport {
    let mut report = CompatReport::default();
    if !pack.is_dir() {
        report.error = Some(StatusCode::ErrInvalidPath);
        return report;
    }

    let files = list_pack_materials(pack);
    if files.is_empty() {
        return report;
    }
    report.has_material_bin = true;
    report.game_material_path = Some(reference.to_path_buf());

    let game_revision = match read_revision(reference) {
        Ok(revision) => revision,
        Err(e) => {
            tracing::warn!(path = %reference.display(), error = %format!("{e:#}"), "reference material unreadable");
            report.error = Some(StatusCode::ErrReadGameRenderchunk);
            return report;
        }
    };
    report.game_material_revision = Some(game_revision);

    let mut parsed_any = false;
    for path in files {
        let revision = match read_revision(&path) {
            Ok(revision) => revision,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %format!("{e:#}"), "skipping undecodable material");
                continue;
            }
        };

        let differs = revision != game_revision;
        if !parsed_any || differs {
            report.pack_material_path = Some(path);
            report.pack_material_revision = Some(revision);
            parsed_any = true;
        }
        if differs {
            report.compatible = false;
            report.needs_update = true;
            return report;
        }
    }

    if !parsed_any {
        report.error = Some(StatusCode::ErrReadPackMaterialbin);
    }
    report
}

/// Re-encode one material at `target`. Unchanged bytes are left alone.
fn update_file(path: &Path, target: u64, dry_run: bool) -> Result<FileOutcome> {
    let raw = read_material(path)?;
    let (material, revision) =
        parse_auto(&raw).with_context(|| format!("Failed to decode: {}", path.display()))?;
    let rebuilt = marshal(&material, target)
        .with_context(|| format!("Failed to encode at revision {target}: {}", path.display()))?;

    if rebuilt == raw {
        tracing::debug!(path = %path.display(), revision, "skipped");
        return Ok(FileOutcome::Skipped);
    }

    if !dry_run {
        write_atomic(path, &rebuilt)?;
    }
    tracing::info!(path = %path.display(), from = revision, to = target, dry_run, "updated");
    Ok(FileOutcome::Updated)
}

/// Run `op` on a dedicated pool when `jobs` is non-zero, else on rayon's
/// global pool.
fn with_jobs<T: Send>(jobs: usize, op: impl FnOnce() -> T + Send) -> Result<T> {
    if jobs == 0 {
        return Ok(op());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build worker pool")?;
    Ok(pool.install(op))
}

/// Re-encode every material in `pack` at the revision of `reference`.
pub fn update_pack(pack: &Path, reference: &Path, dry_run: bool, jobs: usize) -> Result<UpdateReport> {
    let mut report = UpdateReport::default();
    if !pack.is_dir() {
        report.error = Some(StatusCode::ErrInvalidPath);
        return Ok(report);
    }

    let files = list_pack_materials(pack);
    if files.is_empty() {
        return Ok(report);
    }
    report.has_material_bin = true;
    report.total = files.len();

    let target = match read_revision(reference) {
        Ok(revision) => revision,
        Err(e) => {
            tracing::warn!(path = %reference.display(), error = %format!("{e:#}"), "reference material unreadable");
            report.error = Some(StatusCode::ErrReadGameRenderchunk);
            return Ok(report);
        }
    };

    let outcomes: Vec<FileOutcome> = with_jobs(jobs, || {
        files
            .par_iter()
            .map(|path| {
                update_file(path, target, dry_run).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "failed");
                    FileOutcome::Failed
                })
            })
            .collect()
    })?;

    for outcome in outcomes {
        match outcome {
            FileOutcome::Updated => report.updated += 1,
            FileOutcome::Skipped => report.skipped += 1,
            FileOutcome::Failed => report.failed += 1,
        }
    }
    Ok(report)
}

fn require_reference(game: &GameArgs, config: &ToolConfig) -> Result<PathBuf> {
    game.reference_path(config).ok_or_else(|| {
        anyhow::anyhow!(
            "No game reference material.\n\
            Pass --data-dir or --reference, or set [game] in nether-material.toml."
        )
    })
}

fn print_optional<T: fmt::Display>(label: &str, value: Option<T>) {
    match value {
        Some(v) => println!("  {label}: {v}"),
        None => println!("  {label}: -"),
    }
}

/// Execute the check command
pub fn execute_check(args: CheckArgs, config: &ToolConfig) -> Result<()> {
    let reference = require_reference(&args.game, config)?;
    let report = check_pack(&args.pack, &reference);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("=== Material Compatibility ===");
        println!("  Pack: {}", args.pack.display());
        println!("  Has materials: {}", report.has_material_bin);
        println!("  Compatible: {}", report.compatible);
        println!("  Needs update: {}", report.needs_update);
        print_optional(
            "Game material",
            report.game_material_path.as_ref().map(|p| p.display()),
        );
        print_optional("Game revision", report.game_material_revision);
        print_optional(
            "Pack material",
            report.pack_material_path.as_ref().map(|p| p.display()),
        );
        print_optional("Pack revision", report.pack_material_revision);
    }

    if let Some(code) = report.error {
        anyhow::bail!("Check failed: {code}");
    }
    Ok(())
}

/// Execute the update command
pub fn execute_update(args: UpdateArgs, config: &ToolConfig) -> Result<()> {
    let reference = require_reference(&args.game, config)?;
    let jobs = args.jobs.unwrap_or(config.update.jobs);
    let report = update_pack(&args.pack, &reference, args.dry_run, jobs)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mode = if args.dry_run { " (dry run)" } else { "" };
        println!("=== Material Update{mode} ===");
        println!("  Pack: {}", args.pack.display());
        println!("  Total: {}", report.total);
        println!("  Updated: {}", report.updated);
        println!("  Skipped: {}", report.skipped);
        println!("  Failed: {}", report.failed);
    }

    if let Some(code) = report.error {
        anyhow::bail!("Update failed: {code}");
    }
    Ok(())
}
