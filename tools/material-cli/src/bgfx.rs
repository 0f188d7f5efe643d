//! Bgfx command - list the shader binaries inside a material

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nether_materialbin::{
    BgfxShader, CompiledMaterialDefinition, ShaderCodePlatform, ShaderStage, parse_auto,
};

use crate::fs::read_material;

/// Arguments for the bgfx command
#[derive(Args)]
pub struct BgfxArgs {
    /// Material file to list
    pub file: PathBuf,

    /// Only list shaders of this pass
    #[arg(long)]
    pub pass: Option<String>,

    /// Only list shaders for this platform (e.g. ESSL_310, Metal)
    #[arg(long)]
    pub platform: Option<String>,
}

/// One shader code entry and its decoded payload, if any.
#[derive(Debug)]
pub struct ShaderEntry {
    pub pass: String,
    pub variant: usize,
    pub stage: ShaderStage,
    pub platform: ShaderCodePlatform,
    pub payload_len: usize,
    pub shader: Option<BgfxShader>,
}

impl ShaderEntry {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} #{} {} {} ({} bytes)",
            self.pass, self.variant, self.stage, self.platform, self.payload_len
        )];
        match &self.shader {
            Some(shader) => {
                lines.push(format!(
                    "  hash {:#010x}, code {} bytes, {} uniforms",
                    shader.hash,
                    shader.code.len(),
                    shader.uniforms.len()
                ));
                for uniform in &shader.uniforms {
                    lines.push(format!(
                        "    {} type={} num={} reg={}+{}",
                        uniform.name, uniform.ty, uniform.num, uniform.reg_index, uniform.reg_count
                    ));
                }
            }
            None => lines.push("  (not a BGFX shader)".to_string()),
        }
        lines
    }
}

/// Every shader code entry in document order, narrowed by the filters.
pub fn shader_entries(
    material: &CompiledMaterialDefinition,
    pass_filter: Option<&str>,
    platform_filter: Option<&str>,
) -> Vec<ShaderEntry> {
    let mut entries = Vec::new();
    for pass in &material.passes {
        if pass_filter.is_some_and(|name| name != pass.name) {
            continue;
        }
        for (index, variant) in pass.value.variants.iter().enumerate() {
            for entry in &variant.shader_codes {
                let platform = entry.stage.platform;
                if platform_filter.is_some_and(|name| !name.eq_ignore_ascii_case(platform.name())) {
                    continue;
                }
                let shader = match entry.code.bgfx_shader() {
                    Ok(shader) => Some(shader),
                    Err(e) => {
                        tracing::debug!(pass = %pass.name, variant = index, error = %e, "payload is not BGFX");
                        None
                    }
                };
                entries.push(ShaderEntry {
                    pass: pass.name.clone(),
                    variant: index,
                    stage: entry.stage.stage,
                    platform,
                    payload_len: entry.code.bgfx_shader_data.len(),
                    shader,
                });
            }
        }
    }
    entries
}

/// Execute the bgfx command
pub fn execute(args: BgfxArgs) -> Result<()> {
    let bytes = read_material(&args.file)?;
    let (material, revision) = parse_auto(&bytes)
        .with_context(|| format!("Failed to decode: {}", args.file.display()))?;

    let entries = shader_entries(&material, args.pass.as_deref(), args.platform.as_deref());
    println!(
        "=== {} (revision {revision}): {} shader codes ===",
        material.name,
        entries.len()
    );
    for entry in &entries {
        for line in entry.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_bytes, sample_material};

    #[test]
    fn test_entries_decode_bgfx_payloads() {
        let entries = shader_entries(&sample_material(24), None, None);
        assert_eq!(entries.len(), 2);

        let vertex = &entries[0];
        assert_eq!(vertex.stage, ShaderStage::Vertex);
        assert_eq!(vertex.payload_len, 3);
        assert!(vertex.shader.is_none());
        assert_eq!(vertex.lines()[1], "  (not a BGFX shader)");

        let fragment = &entries[1];
        assert_eq!(fragment.pass, "Opaque");
        assert_eq!(fragment.platform, ShaderCodePlatform::Essl310);
        let shader = fragment.shader.as_ref().unwrap();
        assert_eq!(shader.code.len(), 48);
        let names: Vec<_> = shader.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["u_fogColor", "s_MatTexture"]);
        assert_eq!(fragment.lines().len(), 4);
        assert!(fragment.lines()[0].starts_with("Opaque #0 Fragment ESSL_310"));
    }

    #[test]
    fn test_entry_filters() {
        let material = sample_material(24);
        assert!(shader_entries(&material, Some("Transparent"), None).is_empty());
        assert_eq!(shader_entries(&material, Some("Opaque"), Some("essl_310")).len(), 2);
        assert!(shader_entries(&material, None, Some("Metal")).is_empty());
    }

    #[test]
    fn test_execute_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sky.material.bin");
        std::fs::write(&path, sample_bytes(22)).unwrap();
        execute(BgfxArgs {
            file: path,
            pass: None,
            platform: None,
        })
        .unwrap();
    }
}
