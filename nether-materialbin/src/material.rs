//! Top-level compiled material document
//!
//! # Layout
//! ```text
//! u64     magic (0x0A11DA1A)
//! string  "RenderDragon.CompiledMaterialDefinition"
//! u64     revision
//! u32     encryption variant
//! string  name
//! optional string parent name
//! u8      sampler count,  { string name, SamplerDefinition }
//! u16     property count, { string name, PropertyField }
//! u16     uniform override count, string pairs  (rev >= 22, name != "Core/Builtins")
//! u16     pass count,     { string name, Pass }
//! u64     magic
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{MagicLocation, MaterialError, Result};
use crate::io::{Reader, Writer};
use crate::pass::{Pass, ShaderCodePlatform};
use crate::property::PropertyField;
use crate::sampler::SamplerDefinition;
use crate::version::Capabilities;
use crate::{CORE_BUILTINS_NAME, DEFINITION_CLASS, MATERIAL_MAGIC};

/// A value paired with its string name, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named<T> {
    pub name: String,
    pub value: T,
}

impl<T> Named<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub(crate) fn read_with(
        r: &mut Reader<'_>,
        read_value: impl FnOnce(&mut Reader<'_>) -> Result<T>,
    ) -> Result<Self> {
        let name = r.read_string()?;
        let value = read_value(r)?;
        Ok(Self { name, value })
    }

    pub(crate) fn write_with(
        &self,
        w: &mut Writer,
        field: &'static str,
        write_value: impl FnOnce(&T, &mut Writer) -> Result<()>,
    ) -> Result<()> {
        w.write_string(field, &self.name)?;
        write_value(&self.value, w)
    }
}

/// Key/value string pair (flags, uniform overrides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPair {
    pub key: String,
    pub value: String,
}

impl StringPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            key: r.read_string()?,
            value: r.read_string()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_string("string pair key", &self.key)?;
        w.write_string("string pair value", &self.value)
    }
}

/// Header encryption tag. Only [`EncryptionVariant::None`] can be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum EncryptionVariant {
    #[default]
    None = 0x4E4F_4E45,
    SimplePassphrase = 0x534D_504C,
    KeyPair = 0x4B59_5052,
}

impl EncryptionVariant {
    pub fn from_u32(v: u32) -> Result<Self> {
        match v {
            0x4E4F_4E45 => Ok(EncryptionVariant::None),
            0x534D_504C => Ok(EncryptionVariant::SimplePassphrase),
            0x4B59_5052 => Ok(EncryptionVariant::KeyPair),
            _ => Err(MaterialError::UnknownEncryption(v)),
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn is_encrypted(self) -> bool {
        self != EncryptionVariant::None
    }
}

impl fmt::Display for EncryptionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncryptionVariant::None => "none",
            EncryptionVariant::SimplePassphrase => "simple-passphrase",
            EncryptionVariant::KeyPair => "key-pair",
        })
    }
}

/// A decoded `.material.bin` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMaterialDefinition {
    /// Format revision from the header. Used by [`marshal`](crate::marshal)
    /// when the caller passes no target.
    pub revision: u64,
    pub encryption_variant: EncryptionVariant,
    pub name: String,
    pub parent_name: Option<String>,
    pub sampler_definitions: Vec<Named<SamplerDefinition>>,
    pub property_fields: Vec<Named<PropertyField>>,
    /// `None` when the decoded revision or name has no override block.
    pub uniform_overrides: Option<Vec<StringPair>>,
    pub passes: Vec<Named<Pass>>,
}

impl CompiledMaterialDefinition {
    /// An empty document at `revision`.
    pub fn new(name: impl Into<String>, revision: u64) -> Self {
        Self {
            revision,
            encryption_variant: EncryptionVariant::None,
            name: name.into(),
            parent_name: None,
            sampler_definitions: Vec::new(),
            property_fields: Vec::new(),
            uniform_overrides: None,
            passes: Vec::new(),
        }
    }

    /// Whether the override block exists for this document at `caps`.
    fn has_uniform_overrides(name: &str, caps: Capabilities) -> bool {
        caps.uniform_overrides && name != CORE_BUILTINS_NAME
    }

    pub(crate) fn read(r: &mut Reader<'_>, expected_revision: u64) -> Result<Self> {
        let magic = r.read_u64()?;
        if magic != MATERIAL_MAGIC {
            return Err(MaterialError::InvalidMagic {
                location: MagicLocation::Header,
                found: magic,
            });
        }

        let class = r.read_string()?;
        if class != DEFINITION_CLASS {
            return Err(MaterialError::InvalidClassName(class));
        }

        let revision = r.read_u64()?;
        let encryption_variant = EncryptionVariant::from_u32(r.read_u32()?)?;
        if encryption_variant.is_encrypted() {
            return Err(MaterialError::UnsupportedEncryption(encryption_variant));
        }

        let name = r.read_string()?;
        let parent_name = r.read_optional(Reader::read_string)?;

        if expected_revision != 0 && expected_revision != revision {
            return Err(MaterialError::RevisionMismatch {
                file: revision,
                expected: expected_revision,
            });
        }
        let caps = Capabilities::for_revision(revision);

        let sampler_count = usize::from(r.read_u8()?);
        let sampler_definitions = r.read_list(sampler_count, |r| {
            Named::read_with(r, |r| SamplerDefinition::read(r, caps))
        })?;

        let property_count = usize::from(r.read_u16()?);
        let property_fields =
            r.read_list(property_count, |r| Named::read_with(r, PropertyField::read))?;

        let uniform_overrides = if Self::has_uniform_overrides(&name, caps) {
            let count = usize::from(r.read_u16()?);
            Some(r.read_list(count, StringPair::read)?)
        } else {
            None
        };

        let pass_count = usize::from(r.read_u16()?);
        let passes = r.read_list(pass_count, |r| Named::read_with(r, |r| Pass::read(r, caps)))?;

        let footer = r.read_u64()?;
        if footer != MATERIAL_MAGIC {
            return Err(MaterialError::InvalidMagic {
                location: MagicLocation::Footer,
                found: footer,
            });
        }

        Ok(Self {
            revision,
            encryption_variant,
            name,
            parent_name,
            sampler_definitions,
            property_fields,
            uniform_overrides,
            passes,
        })
    }

    /// Non-zero `target`, else the document's own revision.
    pub fn resolve_revision(&self, target: u64) -> Result<u64> {
        match (target, self.revision) {
            (0, 0) => Err(MaterialError::MissingRevision),
            (0, own) => Ok(own),
            (target, _) => Ok(target),
        }
    }

    pub(crate) fn write(&self, w: &mut Writer, target: u64) -> Result<()> {
        if self.encryption_variant.is_encrypted() {
            return Err(MaterialError::UnsupportedEncryption(self.encryption_variant));
        }
        let revision = self.resolve_revision(target)?;
        let caps = Capabilities::for_revision(revision);

        w.write_u64(MATERIAL_MAGIC);
        w.write_string("definition class", DEFINITION_CLASS)?;
        w.write_u64(revision);
        w.write_u32(self.encryption_variant.as_u32());
        w.write_string("material name", &self.name)?;
        w.write_optional(self.parent_name.as_ref(), |w, parent| {
            w.write_string("parent name", parent)
        })?;

        w.write_count_u8("sampler definitions", self.sampler_definitions.len())?;
        for sampler in &self.sampler_definitions {
            sampler.write_with(w, "sampler name", |s, w| s.write(w, caps))?;
        }

        w.write_count_u16("property fields", self.property_fields.len())?;
        for field in &self.property_fields {
            field.write_with(w, "property name", PropertyField::write)?;
        }

        if Self::has_uniform_overrides(&self.name, caps) {
            let overrides = self.uniform_overrides.as_deref().unwrap_or_default();
            w.write_count_u16("uniform overrides", overrides.len())?;
            for pair in overrides {
                pair.write(w)?;
            }
        }

        w.write_count_u16("passes", self.passes.len())?;
        for pass in &self.passes {
            pass.write_with(w, "pass name", |p, w| p.write(w, caps))?;
        }

        w.write_u64(MATERIAL_MAGIC);
        Ok(())
    }

    /// Encode at `target` (or the document's own revision when `target` is 0).
    pub fn marshal(&self, target: u64) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write(&mut w, target)?;
        Ok(w.into_bytes())
    }

    /// Encode at `target` into `out`, returning the number of bytes written.
    pub fn write_to<W: std::io::Write>(&self, out: &mut W, target: u64) -> std::io::Result<u64> {
        let bytes = self
            .marshal(target)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        out.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }

    pub fn variant_count(&self) -> usize {
        self.passes.iter().map(|p| p.value.variants.len()).sum()
    }

    /// Total shader code entries across every pass and variant.
    pub fn shader_code_count(&self) -> usize {
        self.passes
            .iter()
            .flat_map(|p| p.value.variants.iter())
            .map(|v| v.shader_codes.len())
            .sum()
    }

    /// Distinct shader platforms present, in enum order.
    pub fn platforms(&self) -> BTreeSet<ShaderCodePlatform> {
        self.passes
            .iter()
            .flat_map(|p| p.value.shader_codes())
            .map(|code| code.stage.platform)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_tags() {
        assert_eq!(&EncryptionVariant::None.as_u32().to_be_bytes(), b"NONE");
        assert_eq!(
            &EncryptionVariant::SimplePassphrase.as_u32().to_be_bytes(),
            b"SMPL"
        );
        assert_eq!(&EncryptionVariant::KeyPair.as_u32().to_be_bytes(), b"KYPR");
        for v in [
            EncryptionVariant::None,
            EncryptionVariant::SimplePassphrase,
            EncryptionVariant::KeyPair,
        ] {
            assert_eq!(EncryptionVariant::from_u32(v.as_u32()).unwrap(), v);
        }
        assert_eq!(
            EncryptionVariant::from_u32(0).unwrap_err(),
            MaterialError::UnknownEncryption(0)
        );
    }

    #[test]
    fn test_resolve_revision() {
        let mut doc = CompiledMaterialDefinition::new("Test", 0);
        assert_eq!(doc.resolve_revision(0), Err(MaterialError::MissingRevision));
        assert_eq!(doc.resolve_revision(22), Ok(22));
        doc.revision = 20;
        assert_eq!(doc.resolve_revision(0), Ok(20));
        assert_eq!(doc.resolve_revision(23), Ok(23));
    }

    #[test]
    fn test_builtins_never_carry_overrides() {
        let caps = Capabilities::for_revision(25);
        assert!(!CompiledMaterialDefinition::has_uniform_overrides(
            CORE_BUILTINS_NAME,
            caps
        ));
        assert!(CompiledMaterialDefinition::has_uniform_overrides(
            "RenderChunk",
            caps
        ));
        assert!(!CompiledMaterialDefinition::has_uniform_overrides(
            "RenderChunk",
            Capabilities::for_revision(21)
        ));
    }

    #[test]
    fn test_write_to_counts_bytes() {
        let doc = CompiledMaterialDefinition::new("Test", 21);
        let mut out = Vec::new();
        let n = doc.write_to(&mut out, 0).unwrap();
        assert_eq!(n, out.len() as u64);
        assert_eq!(out, doc.marshal(21).unwrap());

        let err = CompiledMaterialDefinition::new("Test", 0)
            .write_to(&mut Vec::new(), 0)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
