//! Sampler definition codec
//!
//! # Layout
//! ```text
//! register_slot     u8 (legacy) | u16
//! access            u8
//! precision         u8
//! allow_unordered   u8
//! sampler_type      u8   (ordinals >= 5 shifted down by one before rev 21)
//! texture_format    string
//! size              u32
//! binding_slot      u8   (omitted in legacy layout, derived from register_slot)
//! sampler_state     optional u8        (rev >= 21 only)
//! default_texture   optional string
//! texture_uri       optional string    (rev >= 20 only)
//! custom_type_info  optional { string name, u32 stride }
//! ```

use std::cmp::Ordering;

use crate::error::{MaterialError, Result};
use crate::io::{Reader, Writer};
use crate::version::Capabilities;

/// A texture or buffer binding descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerDefinition {
    pub register_slot: u16,
    pub binding_slot: u8,
    pub size: u32,
    pub access: SamplerAccess,
    pub precision: PrecisionConstraint,
    pub allow_unordered_access: u8,
    pub sampler_type: SamplerType,
    pub texture_format: String,
    pub sampler_state: Option<SamplerState>,
    pub default_texture: Option<String>,
    pub texture_uri: Option<String>,
    pub custom_type_info: Option<CustomTypeInfo>,
}

/// Structured-buffer element description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTypeInfo {
    pub name: String,
    pub stride: u32,
}

impl SamplerDefinition {
    pub(crate) fn read(r: &mut Reader<'_>, caps: Capabilities) -> Result<Self> {
        let (register_slot, legacy_slot) = if caps.legacy_layout {
            let slot = r.read_u8()?;
            (u16::from(slot), Some(slot))
        } else {
            (r.read_u16()?, None)
        };

        let access = SamplerAccess::from_u8(r.read_u8()?)?;
        let precision = PrecisionConstraint::from_u8(r.read_u8()?)?;
        let allow_unordered_access = r.read_u8()?;
        let sampler_type = sampler_type_from_wire(r.read_u8()?, caps)?;
        let texture_format = r.read_string()?;
        let size = r.read_u32()?;

        let binding_slot = match legacy_slot {
            Some(slot) => slot,
            None => r.read_u8()?,
        };

        let sampler_state = if caps.sampler_state {
            r.read_optional(|r| SamplerState::from_u8(r.read_u8()?))?
        } else {
            None
        };

        let default_texture = r.read_optional(Reader::read_string)?;

        let texture_uri = if caps.texture_uri {
            r.read_optional(Reader::read_string)?
        } else {
            None
        };

        let custom_type_info = r.read_optional(|r| {
            Ok(CustomTypeInfo {
                name: r.read_string()?,
                stride: r.read_u32()?,
            })
        })?;

        Ok(Self {
            register_slot,
            binding_slot,
            size,
            access,
            precision,
            allow_unordered_access,
            sampler_type,
            texture_format,
            sampler_state,
            default_texture,
            texture_uri,
            custom_type_info,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer, caps: Capabilities) -> Result<()> {
        if caps.legacy_layout {
            w.write_count_u8("sampler register slot", self.register_slot.into())?;
        } else {
            w.write_u16(self.register_slot);
        }

        w.write_u8(self.access as u8);
        w.write_u8(self.precision as u8);
        w.write_u8(self.allow_unordered_access);
        w.write_u8(sampler_type_to_wire(self.sampler_type, caps)?);
        w.write_string("sampler texture format", &self.texture_format)?;
        w.write_u32(self.size);

        if !caps.legacy_layout {
            w.write_u8(self.binding_slot);
        }

        if caps.sampler_state {
            w.write_optional(self.sampler_state.as_ref(), |w, state| {
                w.write_u8(*state as u8);
                Ok(())
            })?;
        }

        w.write_optional(self.default_texture.as_ref(), |w, name| {
            w.write_string("sampler default texture", name)
        })?;

        if caps.texture_uri {
            w.write_optional(self.texture_uri.as_ref(), |w, uri| {
                w.write_string("sampler texture uri", uri)
            })?;
        }

        w.write_optional(self.custom_type_info.as_ref(), |w, info| {
            w.write_string("sampler custom type", &info.name)?;
            w.write_u32(info.stride);
            Ok(())
        })
    }
}

/// Sampler / resource kind, numbered as in revisions with sampler-state
/// support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SamplerType {
    Texture2D = 0,
    Texture2DArray = 1,
    Texture2DExternal = 2,
    Texture3D = 3,
    TextureCube = 4,
    TextureCubeArray = 5,
    StructuredBuffer = 6,
    RawBuffer = 7,
    AccelerationStructure = 8,
    Texture2DShadow = 9,
    Texture2DArrayShadow = 10,
}

impl SamplerType {
    pub const ALL: [SamplerType; 11] = [
        SamplerType::Texture2D,
        SamplerType::Texture2DArray,
        SamplerType::Texture2DExternal,
        SamplerType::Texture3D,
        SamplerType::TextureCube,
        SamplerType::TextureCubeArray,
        SamplerType::StructuredBuffer,
        SamplerType::RawBuffer,
        SamplerType::AccelerationStructure,
        SamplerType::Texture2DShadow,
        SamplerType::Texture2DArrayShadow,
    ];

    fn from_ordinal(ordinal: u16) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

/// Before sampler-state support the cube-array member did not exist, so every
/// later member sat one ordinal lower on the wire.
const SHIFTED_FROM: u8 = SamplerType::TextureCubeArray as u8;

/// Wire byte -> sampler type. Exact inverse of [`sampler_type_to_wire`].
pub(crate) fn sampler_type_from_wire(raw: u8, caps: Capabilities) -> Result<SamplerType> {
    let ordinal = if !caps.sampler_state && raw >= SHIFTED_FROM {
        u16::from(raw) + 1
    } else {
        u16::from(raw)
    };
    SamplerType::from_ordinal(ordinal).ok_or(MaterialError::invalid_enum("sampler type", raw))
}

/// Sampler type -> wire byte. Exact inverse of [`sampler_type_from_wire`].
pub(crate) fn sampler_type_to_wire(ty: SamplerType, caps: Capabilities) -> Result<u8> {
    let ordinal = ty as u8;
    if caps.sampler_state {
        return Ok(ordinal);
    }
    match ordinal.cmp(&SHIFTED_FROM) {
        Ordering::Less => Ok(ordinal),
        Ordering::Equal => Err(MaterialError::IncompatibleValue {
            field: "sampler type",
            revision: caps.revision,
            reason: "cube-array samplers need sampler-state support",
        }),
        Ordering::Greater => Ok(ordinal - 1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SamplerAccess {
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl SamplerAccess {
    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(SamplerAccess::None),
            1 => Ok(SamplerAccess::Read),
            2 => Ok(SamplerAccess::Write),
            3 => Ok(SamplerAccess::ReadWrite),
            _ => Err(MaterialError::invalid_enum("sampler access", v)),
        }
    }
}

/// Shader precision qualifier (samplers and shader inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrecisionConstraint {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl PrecisionConstraint {
    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(PrecisionConstraint::Low),
            1 => Ok(PrecisionConstraint::Medium),
            2 => Ok(PrecisionConstraint::High),
            _ => Err(MaterialError::invalid_enum("precision constraint", v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SamplerState {
    ClampPoint = 0,
    ClampLinear = 1,
    WrapPoint = 2,
    WrapLinear = 3,
}

impl SamplerState {
    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(SamplerState::ClampPoint),
            1 => Ok(SamplerState::ClampLinear),
            2 => Ok(SamplerState::WrapPoint),
            3 => Ok(SamplerState::WrapLinear),
            _ => Err(MaterialError::invalid_enum("sampler state", v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> SamplerDefinition {
        SamplerDefinition {
            register_slot: 3,
            binding_slot: 3,
            size: 0,
            access: SamplerAccess::Read,
            precision: PrecisionConstraint::High,
            allow_unordered_access: 0,
            sampler_type: SamplerType::Texture2D,
            texture_format: "rgba8".to_string(),
            sampler_state: None,
            default_texture: Some("white".to_string()),
            texture_uri: None,
            custom_type_info: None,
        }
    }

    fn roundtrip(s: &SamplerDefinition, revision: u64) -> (Vec<u8>, SamplerDefinition) {
        let caps = Capabilities::for_revision(revision);
        let mut w = Writer::new();
        s.write(&mut w, caps).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = SamplerDefinition::read(&mut r, caps).unwrap();
        assert_eq!(r.remaining(), 0);
        (bytes, decoded)
    }

    #[test]
    fn test_access_values() {
        for v in 0..=3 {
            assert_eq!(SamplerAccess::from_u8(v).unwrap() as u8, v);
        }
        assert_eq!(
            SamplerAccess::from_u8(4).unwrap_err(),
            MaterialError::invalid_enum("sampler access", 4u8)
        );
    }

    #[test]
    fn test_legacy_layout_register_width() {
        let (bytes, decoded) = roundtrip(&sampler(), 18);
        // u8 register, then access
        assert_eq!(&bytes[..2], &[3, SamplerAccess::Read as u8]);
        assert_eq!(decoded.binding_slot, 3);

        let (bytes, _) = roundtrip(&sampler(), 19);
        // u16 register, then access
        assert_eq!(&bytes[..3], &[3, 0, SamplerAccess::Read as u8]);
    }

    #[test]
    fn test_legacy_binding_slot_derived_from_register() {
        let mut s = sampler();
        s.register_slot = 9;
        s.binding_slot = 1;
        let (_, decoded) = roundtrip(&s, 16);
        assert_eq!(decoded.binding_slot, 9);
    }

    #[test]
    fn test_legacy_register_overflow() {
        let mut s = sampler();
        s.register_slot = 300;
        let mut w = Writer::new();
        let err = s.write(&mut w, Capabilities::for_revision(18)).unwrap_err();
        assert!(matches!(err, MaterialError::WidthOverflow { len: 300, .. }));
    }

    #[test]
    fn test_sampler_type_remap_is_symmetric() {
        for revision in [18, 20, 21, 24] {
            let caps = Capabilities::for_revision(revision);
            for ty in SamplerType::ALL {
                match sampler_type_to_wire(ty, caps) {
                    Ok(raw) => assert_eq!(sampler_type_from_wire(raw, caps).unwrap(), ty),
                    Err(_) => {
                        assert_eq!(ty, SamplerType::TextureCubeArray);
                        assert!(!caps.sampler_state);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sampler_type_shift_before_sampler_state() {
        let old = Capabilities::for_revision(20);
        let new = Capabilities::for_revision(21);
        assert_eq!(
            sampler_type_from_wire(5, old).unwrap(),
            SamplerType::StructuredBuffer
        );
        assert_eq!(
            sampler_type_from_wire(5, new).unwrap(),
            SamplerType::TextureCubeArray
        );
        assert_eq!(
            sampler_type_from_wire(9, old).unwrap(),
            SamplerType::Texture2DArrayShadow
        );
        assert!(sampler_type_from_wire(10, old).is_err());
        assert!(sampler_type_from_wire(11, new).is_err());
        assert!(sampler_type_from_wire(255, old).is_err());
        assert_eq!(sampler_type_to_wire(SamplerType::RawBuffer, old).unwrap(), 6);
        assert_eq!(sampler_type_to_wire(SamplerType::TextureCube, old).unwrap(), 4);
    }

    #[test]
    fn test_gated_optionals() {
        let mut s = sampler();
        s.sampler_state = Some(SamplerState::WrapLinear);
        s.texture_uri = Some("textures/noise".to_string());
        s.custom_type_info = Some(CustomTypeInfo {
            name: "LightData".to_string(),
            stride: 48,
        });

        let (_, decoded) = roundtrip(&s, 23);
        assert_eq!(decoded, s);

        // Texture URI exists, sampler state does not
        let (_, decoded) = roundtrip(&s, 20);
        assert_eq!(decoded.sampler_state, None);
        assert_eq!(decoded.texture_uri, s.texture_uri);

        // Neither exists
        let (_, decoded) = roundtrip(&s, 19);
        assert_eq!(decoded.sampler_state, None);
        assert_eq!(decoded.texture_uri, None);
        assert_eq!(decoded.custom_type_info, s.custom_type_info);
    }

    #[test]
    fn test_invalid_sampler_state_rejected() {
        let mut s = sampler();
        s.sampler_state = Some(SamplerState::ClampPoint);
        let caps = Capabilities::for_revision(21);
        let mut w = Writer::new();
        s.write(&mut w, caps).unwrap();
        let mut bytes = w.into_bytes();
        // register(2) access precision unordered type fmt_len(4) "rgba8"(5) size(4) binding(1) flag(1)
        let state_offset = 2 + 1 + 1 + 1 + 1 + 4 + 5 + 4 + 1 + 1;
        bytes[state_offset] = 4;
        let err = SamplerDefinition::read(&mut Reader::new(&bytes), caps).unwrap_err();
        assert_eq!(err, MaterialError::invalid_enum("sampler state", 4u8));
    }
}
