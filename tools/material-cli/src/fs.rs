//! Filesystem helpers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Maximum material size read into memory.
pub const MAX_MATERIAL_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Read a material file, refusing anything over [`MAX_MATERIAL_BYTES`]
/// before allocating.
pub fn read_material(path: &Path) -> Result<Vec<u8>> {
    let len = std::fs::metadata(path)
        .with_context(|| format!("Cannot stat material: {}", path.display()))?
        .len();
    if len > MAX_MATERIAL_BYTES {
        anyhow::bail!(
            "Material too large: {} is {len} bytes (limit {MAX_MATERIAL_BYTES})",
            path.display()
        );
    }
    std::fs::read(path).with_context(|| format!("Cannot read material: {}", path.display()))
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Replace `path` with `bytes` via a sibling temp file and rename.
///
/// The target's permissions are carried over. The temp file is removed if
/// any step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let permissions = std::fs::metadata(path).map(|m| m.permissions()).ok();

    let result = (|| -> Result<()> {
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
        if let Some(permissions) = permissions {
            std::fs::set_permissions(&tmp, permissions)
                .with_context(|| format!("Failed to set permissions: {}", tmp.display()))?;
        }
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace: {}", path.display()))
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
