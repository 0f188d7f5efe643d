//! Resource pack material discovery
//!
//! A pack's materials live in `<pack>/renderer/materials` and in
//! `<pack>/subpacks/<name>/renderer/materials`. Only direct children of those
//! directories whose names end in `.material.bin` (any case) are considered.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const MATERIAL_SUFFIX: &str = ".material.bin";

fn materials_dir(root: &Path) -> PathBuf {
    root.join("renderer").join("materials")
}

/// Immediate child entries of `dir`, sorted by name. Missing or unreadable
/// directories yield nothing.
fn children(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> + use<> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
}

pub fn is_material_file(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(MATERIAL_SUFFIX)
}

/// Every material file in `pack`: the base pack first, then each subpack in
/// name order.
pub fn list_pack_materials(pack: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![materials_dir(pack)];
    dirs.extend(
        children(&pack.join("subpacks"))
            .filter(|e| e.file_type().is_dir())
            .map(|e| materials_dir(e.path())),
    );

    dirs.iter()
        .flat_map(|dir| children(dir))
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().is_some_and(is_material_file))
        .map(|e| e.into_path())
        .collect()
}
