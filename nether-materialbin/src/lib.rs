//! Nether-Materialbin: RenderDragon compiled material (`.material.bin`) codec
//!
//! Decodes and encodes the binary material definitions shipped with the
//! Bedrock renderer, including resource-pack overrides. The format changes
//! shape between revisions; a document decoded at one revision can be
//! re-encoded at another to bring an outdated pack up to the installed
//! game's layout.
//!
//! # Key Features
//!
//! - **Pure codec**: No file system access, no logging, no global state
//! - **Revision gates**: Every revision-dependent field consults
//!   [`FormatRevision`]; nothing else compares revision numbers
//! - **Strict decoding**: Unknown enum values, attribute tuples and
//!   encryption tags are errors, never defaults
//! - **BGFX payloads**: Shader code blobs can be decoded with [`BgfxShader`]
//!
//! # Usage
//!
//! ```ignore
//! use nether_materialbin::{marshal, parse_auto};
//!
//! let bytes = std::fs::read("RenderChunk.material.bin").unwrap();
//! let (material, revision) = parse_auto(&bytes).unwrap();
//!
//! println!("{} (revision {revision})", material.name);
//! println!("Passes: {}", material.passes.len());
//! println!("Shader codes: {}", material.shader_code_count());
//!
//! // Retarget to a newer layout
//! let upgraded = marshal(&material, 24).unwrap();
//! ```

mod bgfx;
mod error;
mod io;
mod material;
mod pass;
mod property;
mod sampler;
mod version;


pub use bgfx::{BgfxShader, Uniform, VertexAttributes};
pub use error::{MagicLocation, MaterialError, Result};
pub use material::{CompiledMaterialDefinition, EncryptionVariant, Named, StringPair};
pub use pass::{
    Attribute, BlendMode, InterpolationConstraint, LEGACY_BITSET_SENTINEL, NamedShaderInput, Pass,
    PlatformShaderCode, PlatformShaderStage, PlatformSupport, ShaderCode, ShaderCodePlatform,
    ShaderInput, ShaderInputType, ShaderStage, Variant,
};
pub use property::{MAT3_SIZE, MAT4_SIZE, PropertyField, VEC4_SIZE};
pub use sampler::{
    CustomTypeInfo, PrecisionConstraint, SamplerAccess, SamplerDefinition, SamplerState,
    SamplerType,
};
pub use version::{Capabilities, FormatRevision};

// =============================================================================
// Constants
// =============================================================================

/// Header and footer magic
pub const MATERIAL_MAGIC: u64 = 0x0A11_DA1A;

/// Class name following the header magic
pub const DEFINITION_CLASS: &str = "RenderDragon.CompiledMaterialDefinition";

/// Material name that never carries a uniform override block
pub const CORE_BUILTINS_NAME: &str = "Core/Builtins";

// =============================================================================
// Entry points
// =============================================================================

/// Decode a material.
///
/// A non-zero `expected_revision` must equal the header's revision or the
/// call fails with [`MaterialError::RevisionMismatch`]. Zero accepts any
/// revision.
pub fn parse(bytes: &[u8], expected_revision: u64) -> Result<CompiledMaterialDefinition> {
    CompiledMaterialDefinition::read(&mut io::Reader::new(bytes), expected_revision)
}

/// Decode a material at whatever revision its header declares.
pub fn parse_auto(bytes: &[u8]) -> Result<(CompiledMaterialDefinition, u64)> {
    let material = parse(bytes, 0)?;
    let revision = material.revision;
    Ok((material, revision))
}

/// Encode a material at `target_revision`, or at the document's own revision
/// when `target_revision` is zero.
pub fn marshal(material: &CompiledMaterialDefinition, target_revision: u64) -> Result<Vec<u8>> {
    material.marshal(target_revision)
}
