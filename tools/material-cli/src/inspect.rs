//! Inspect command - summarise a material file

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nether_materialbin::{CompiledMaterialDefinition, EncryptionVariant, ShaderCodePlatform, parse_auto};

use crate::fs::read_material;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Material file to inspect
    pub file: PathBuf,

    /// Also list each pass with its variant count
    #[arg(long)]
    pub passes: bool,
}

/// Counts and identity of one decoded material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSummary {
    pub revision: u64,
    pub encryption: EncryptionVariant,
    pub name: String,
    pub parent: Option<String>,
    pub samplers: usize,
    pub properties: usize,
    /// `None` when the document has no override block.
    pub overrides: Option<usize>,
    pub passes: Vec<(String, usize)>,
    pub variants: usize,
    pub shader_codes: usize,
    pub platforms: Vec<ShaderCodePlatform>,
}

impl MaterialSummary {
    pub fn of(material: &CompiledMaterialDefinition) -> Self {
        Self {
            revision: material.revision,
            encryption: material.encryption_variant,
            name: material.name.clone(),
            parent: material.parent_name.clone(),
            samplers: material.sampler_definitions.len(),
            properties: material.property_fields.len(),
            overrides: material.uniform_overrides.as_ref().map(Vec::len),
            passes: material
                .passes
                .iter()
                .map(|pass| (pass.name.clone(), pass.value.variants.len()))
                .collect(),
            variants: material.variant_count(),
            shader_codes: material.shader_code_count(),
            platforms: material.platforms().into_iter().collect(),
        }
    }

    /// Pass lines, shown with `--passes`.
    pub fn pass_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.passes
            .iter()
            .map(|(name, variants)| format!("  {name}: {variants} variants"))
    }
}

impl fmt::Display for MaterialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.name)?;
        writeln!(f, "  Revision: {}", self.revision)?;
        writeln!(f, "  Encryption: {}", self.encryption)?;
        writeln!(f, "  Parent: {}", self.parent.as_deref().unwrap_or("-"))?;
        writeln!(f, "  Samplers: {}", self.samplers)?;
        writeln!(f, "  Properties: {}", self.properties)?;
        match self.overrides {
            Some(count) => writeln!(f, "  Uniform overrides: {count}")?,
            None => writeln!(f, "  Uniform overrides: -")?,
        }
        writeln!(f, "  Passes: {}", self.passes.len())?;
        writeln!(f, "  Variants: {}", self.variants)?;
        writeln!(f, "  Shader codes: {}", self.shader_codes)?;

        let platforms: Vec<&str> = self.platforms.iter().map(|p| p.name()).collect();
        if platforms.is_empty() {
            write!(f, "  Platforms: -")
        } else {
            write!(f, "  Platforms: {}", platforms.join(", "))
        }
    }
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let bytes = read_material(&args.file)?;
    let (material, revision) = parse_auto(&bytes)
        .with_context(|| format!("Failed to decode: {}", args.file.display()))?;
    tracing::debug!(path = %args.file.display(), revision, bytes = bytes.len(), "decoded");

    let summary = MaterialSummary::of(&material);
    println!("{summary}");
    if args.passes {
        println!();
        println!("Passes:");
        for line in summary.pass_lines() {
            println!("{line}");
        }
    }
    Ok(())
}
