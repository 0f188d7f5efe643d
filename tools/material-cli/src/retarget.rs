//! Retarget command - re-encode one material at an explicit revision

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use nether_materialbin::{marshal, parse_auto};

use crate::fs::{read_material, write_atomic};

/// Arguments for the retarget command
#[derive(Args)]
pub struct RetargetArgs {
    /// Material file to re-encode
    pub input: PathBuf,

    /// Target format revision
    #[arg(long, short)]
    pub revision: u64,

    /// Output file, or `-` for stdout
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Decode `input` and encode it at `revision`. Returns the decoded revision
/// and the new bytes.
pub fn retarget(input: &Path, revision: u64) -> Result<(u64, Vec<u8>)> {
    if revision == 0 {
        anyhow::bail!("Target revision must be non-zero");
    }
    let bytes = read_material(input)?;
    let (material, from) =
        parse_auto(&bytes).with_context(|| format!("Failed to decode: {}", input.display()))?;
    let out = marshal(&material, revision).with_context(|| {
        format!(
            "Cannot express {} at revision {revision} (decoded at {from})",
            input.display()
        )
    })?;
    Ok((from, out))
}

/// Execute the retarget command
pub fn execute(args: RetargetArgs) -> Result<()> {
    if args.output.as_os_str() == "-" {
        let bytes = read_material(&args.input)?;
        let (material, _) = parse_auto(&bytes)
            .with_context(|| format!("Failed to decode: {}", args.input.display()))?;
        let mut stdout = std::io::stdout().lock();
        material
            .write_to(&mut stdout, args.revision)
            .context("Failed to write material to stdout")?;
        stdout.flush()?;
        return Ok(());
    }

    let (from, out) = retarget(&args.input, args.revision)?;
    write_atomic(&args.output, &out)?;
    tracing::info!(
        path = %args.output.display(),
        from,
        to = args.revision,
        bytes = out.len(),
        "retargeted"
    );
    Ok(())
}
