//! Render pass codec
//!
//! # Layout
//! ```text
//! platform_support          string | legacy sentinel framing (see PlatformSupport)
//! fallback                  string
//! default_blend_mode        optional u16
//! default_flag_values       u16 count, string pairs
//! output_binding_signature  u32 (rev >= 23 only)
//! variants                  u16 count, Variant
//! ```

mod shader_code;
mod variant;

pub use shader_code::{
    Attribute, InterpolationConstraint, NamedShaderInput, ShaderCode, ShaderInput, ShaderInputType,
};
pub use variant::{PlatformShaderCode, PlatformShaderStage, ShaderCodePlatform, ShaderStage, Variant};

use crate::error::{MaterialError, Result};
use crate::io::{Reader, Writer};
use crate::material::StringPair;
use crate::version::Capabilities;

/// First byte of a legacy platform-support field that carries a bitset
/// string. It is the low byte of the string's length prefix.
pub const LEGACY_BITSET_SENTINEL: u8 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub platform_support: PlatformSupport,
    pub fallback: String,
    pub default_blend_mode: Option<BlendMode>,
    pub default_flag_values: Vec<StringPair>,
    /// Always `None` when decoded below revision 23. Written as 0 when `None`
    /// at revisions that carry the field.
    pub output_binding_signature: Option<u32>,
    pub variants: Vec<Variant>,
}

/// Pass platform-support field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSupport {
    /// A bitset string of platform flags.
    Bitset(String),
    /// Legacy layouts only: a single non-sentinel marker byte in place of the
    /// bitset.
    Legacy(u8),
}

impl PlatformSupport {
    /// The bitset string, if the field carried one.
    pub fn bitset(&self) -> Option<&str> {
        match self {
            PlatformSupport::Bitset(bits) => Some(bits),
            PlatformSupport::Legacy(_) => None,
        }
    }

    fn read(r: &mut Reader<'_>, caps: Capabilities) -> Result<Self> {
        if caps.legacy_layout && r.peek_u8()? != LEGACY_BITSET_SENTINEL {
            return Ok(PlatformSupport::Legacy(r.read_u8()?));
        }
        r.read_string().map(PlatformSupport::Bitset)
    }

    fn write(&self, w: &mut Writer, caps: Capabilities) -> Result<()> {
        match self {
            PlatformSupport::Bitset(bits) => {
                // A legacy reader only takes the string branch when the first
                // length byte is the sentinel
                if caps.legacy_layout && bits.len() % 256 != usize::from(LEGACY_BITSET_SENTINEL) {
                    return Err(MaterialError::IncompatibleValue {
                        field: "pass platform support",
                        revision: caps.revision,
                        reason: "legacy bitsets must be 15 characters long",
                    });
                }
                w.write_string("pass platform support", bits)
            }
            PlatformSupport::Legacy(marker) => {
                if !caps.legacy_layout {
                    return Err(MaterialError::IncompatibleValue {
                        field: "pass platform support",
                        revision: caps.revision,
                        reason: "legacy marker has no bitset string",
                    });
                }
                if *marker == LEGACY_BITSET_SENTINEL {
                    return Err(MaterialError::IncompatibleValue {
                        field: "pass platform support",
                        revision: caps.revision,
                        reason: "legacy marker collides with the bitset sentinel",
                    });
                }
                w.write_u8(*marker);
                Ok(())
            }
        }
    }
}

impl Pass {
    pub(crate) fn read(r: &mut Reader<'_>, caps: Capabilities) -> Result<Self> {
        let platform_support = PlatformSupport::read(r, caps)?;
        let fallback = r.read_string()?;
        let default_blend_mode = r.read_optional(|r| BlendMode::from_u16(r.read_u16()?))?;

        let flag_count = usize::from(r.read_u16()?);
        let default_flag_values = r.read_list(flag_count, StringPair::read)?;

        let output_binding_signature = if caps.output_binding_signature {
            Some(r.read_u32()?)
        } else {
            None
        };

        let variant_count = usize::from(r.read_u16()?);
        let variants = r.read_list(variant_count, Variant::read)?;

        Ok(Self {
            platform_support,
            fallback,
            default_blend_mode,
            default_flag_values,
            output_binding_signature,
            variants,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer, caps: Capabilities) -> Result<()> {
        self.platform_support.write(w, caps)?;
        w.write_string("pass fallback", &self.fallback)?;
        w.write_optional(self.default_blend_mode.as_ref(), |w, mode| {
            w.write_u16(*mode as u16);
            Ok(())
        })?;

        w.write_count_u16("pass default flag values", self.default_flag_values.len())?;
        for pair in &self.default_flag_values {
            pair.write(w)?;
        }

        if caps.output_binding_signature {
            w.write_u32(self.output_binding_signature.unwrap_or(0));
        }

        w.write_count_u16("pass variants", self.variants.len())?;
        for variant in &self.variants {
            variant.write(w)?;
        }
        Ok(())
    }

    /// Shader code entries across all variants.
    pub fn shader_codes(&self) -> impl Iterator<Item = &PlatformShaderCode> {
        self.variants.iter().flat_map(|v| v.shader_codes.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlendMode {
    None = 0,
    Replace = 1,
    AlphaBlend = 2,
    ColorBlendAlphaAdd = 3,
    PreMultiplied = 4,
    InvertColor = 5,
    Additive = 6,
    AdditiveAlpha = 7,
    Multiply = 8,
    MultiplyBoth = 9,
    InverseSrcAlpha = 10,
    SrcAlpha = 11,
}

impl BlendMode {
    pub const ALL: [BlendMode; 12] = [
        BlendMode::None,
        BlendMode::Replace,
        BlendMode::AlphaBlend,
        BlendMode::ColorBlendAlphaAdd,
        BlendMode::PreMultiplied,
        BlendMode::InvertColor,
        BlendMode::Additive,
        BlendMode::AdditiveAlpha,
        BlendMode::Multiply,
        BlendMode::MultiplyBoth,
        BlendMode::InverseSrcAlpha,
        BlendMode::SrcAlpha,
    ];

    pub(crate) fn from_u16(v: u16) -> Result<Self> {
        Self::ALL
            .get(usize::from(v))
            .copied()
            .ok_or(MaterialError::invalid_enum("blend mode", v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(platform_support: PlatformSupport) -> Pass {
        Pass {
            platform_support,
            fallback: String::new(),
            default_blend_mode: Some(BlendMode::AlphaBlend),
            default_flag_values: vec![StringPair::new("Instancing", "Off")],
            output_binding_signature: None,
            variants: Vec::new(),
        }
    }

    fn encode(p: &Pass, revision: u64) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        p.write(&mut w, Capabilities::for_revision(revision))?;
        Ok(w.into_bytes())
    }

    fn decode(bytes: &[u8], revision: u64) -> Result<Pass> {
        let mut r = Reader::new(bytes);
        let p = Pass::read(&mut r, Capabilities::for_revision(revision))?;
        assert_eq!(r.remaining(), 0);
        Ok(p)
    }

    #[test]
    fn test_blend_mode_values() {
        for (i, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(BlendMode::from_u16(i as u16).unwrap(), *mode);
            assert_eq!(*mode as u16, i as u16);
        }
        assert_eq!(
            BlendMode::from_u16(12).unwrap_err(),
            MaterialError::invalid_enum("blend mode", 12u16)
        );
    }

    #[test]
    fn test_modern_bitset_roundtrip() {
        let p = pass(PlatformSupport::Bitset("0110".to_string()));
        let bytes = encode(&p, 22).unwrap();
        assert_eq!(&bytes[..8], &[4, 0, 0, 0, b'0', b'1', b'1', b'0']);
        assert_eq!(decode(&bytes, 22).unwrap(), p);
    }

    #[test]
    fn test_legacy_sentinel_bitset() {
        let p = pass(PlatformSupport::Bitset("111111111111111".to_string()));
        let bytes = encode(&p, 18).unwrap();
        assert_eq!(bytes[0], LEGACY_BITSET_SENTINEL);
        assert_eq!(decode(&bytes, 18).unwrap(), p);
    }

    #[test]
    fn test_legacy_marker_byte_preserved() {
        let p = pass(PlatformSupport::Legacy(0));
        let bytes = encode(&p, 17).unwrap();
        assert_eq!(bytes[0], 0);
        // Marker, then the fallback string prefix
        assert_eq!(&bytes[1..5], &[0, 0, 0, 0]);
        assert_eq!(decode(&bytes, 17).unwrap(), p);
    }

    #[test]
    fn test_platform_support_incompatible_targets() {
        let legacy = pass(PlatformSupport::Legacy(3));
        assert!(matches!(
            encode(&legacy, 19).unwrap_err(),
            MaterialError::IncompatibleValue { revision: 19, .. }
        ));

        let short_bitset = pass(PlatformSupport::Bitset("01".to_string()));
        assert!(matches!(
            encode(&short_bitset, 18).unwrap_err(),
            MaterialError::IncompatibleValue { .. }
        ));

        let sentinel_marker = pass(PlatformSupport::Legacy(LEGACY_BITSET_SENTINEL));
        assert!(encode(&sentinel_marker, 18).is_err());
    }

    #[test]
    fn test_output_binding_signature_gate() {
        let mut p = pass(PlatformSupport::Bitset("1".to_string()));
        p.output_binding_signature = Some(0xDEAD_BEEF);

        let with = encode(&p, 23).unwrap();
        let without = encode(&p, 22).unwrap();
        assert_eq!(with.len(), without.len() + 4);
        assert_eq!(decode(&with, 23).unwrap(), p);
        assert_eq!(decode(&without, 22).unwrap().output_binding_signature, None);

        // Absent signature is written as zero and reads back as Some(0)
        p.output_binding_signature = None;
        let bytes = encode(&p, 24).unwrap();
        assert_eq!(decode(&bytes, 24).unwrap().output_binding_signature, Some(0));
    }

    #[test]
    fn test_invalid_blend_mode() {
        let p = pass(PlatformSupport::Bitset(String::new()));
        let mut bytes = encode(&p, 22).unwrap();
        // bitset(4) fallback(4) flag(1) -> blend mode u16
        bytes[9] = 42;
        let err = decode(&bytes, 22).unwrap_err();
        assert_eq!(err, MaterialError::invalid_enum("blend mode", 42u16));
    }
}
