//! Pass variants and per-platform shader stages

use std::fmt;

use super::shader_code::ShaderCode;
use crate::error::{MaterialError, Result};
use crate::io::{Reader, Writer};
use crate::material::StringPair;

/// One flag combination of a pass and the shaders compiled for it.
///
/// Wire order is `bool supported, u16 flag count, u16 code count`, then the
/// flags, then the codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub is_supported: bool,
    pub flags: Vec<StringPair>,
    pub shader_codes: Vec<PlatformShaderCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformShaderCode {
    pub stage: PlatformShaderStage,
    pub code: ShaderCode,
}

impl Variant {
    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        let is_supported = r.read_bool()?;
        let flag_count = usize::from(r.read_u16()?);
        let code_count = usize::from(r.read_u16()?);

        let flags = r.read_list(flag_count, StringPair::read)?;
        let shader_codes = r.read_list(code_count, |r| {
            Ok(PlatformShaderCode {
                stage: PlatformShaderStage::read(r)?,
                code: ShaderCode::read(r)?,
            })
        })?;

        Ok(Self {
            is_supported,
            flags,
            shader_codes,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_bool(self.is_supported);
        w.write_count_u16("variant flags", self.flags.len())?;
        w.write_count_u16("variant shader codes", self.shader_codes.len())?;
        for pair in &self.flags {
            pair.write(w)?;
        }
        for entry in &self.shader_codes {
            entry.stage.write(w)?;
            entry.code.write(w)?;
        }
        Ok(())
    }
}

/// Identifies which stage and platform a [`ShaderCode`] was compiled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformShaderStage {
    pub stage_name: String,
    /// Written back exactly as decoded.
    pub platform_name: String,
    pub stage: ShaderStage,
    pub platform: ShaderCodePlatform,
}

impl PlatformShaderStage {
    /// Build a stage whose names are the canonical ones for `stage` and
    /// `platform`.
    pub fn new(stage: ShaderStage, platform: ShaderCodePlatform) -> Self {
        Self {
            stage_name: stage.name().to_string(),
            platform_name: platform.name().to_string(),
            stage,
            platform,
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let stage_name = r.read_string()?;
        let platform_name = r.read_string()?;
        let stage = ShaderStage::from_u8(r.read_u8()?)?;
        let platform = ShaderCodePlatform::from_u8(r.read_u8()?)?;
        Ok(Self {
            stage_name,
            platform_name,
            stage,
            platform,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_string("shader stage name", &self.stage_name)?;
        w.write_string("shader platform name", &self.platform_name)?;
        w.write_u8(self.stage as u8);
        w.write_u8(self.platform as u8);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShaderStage {
    Vertex = 0,
    Fragment = 1,
    Compute = 2,
    Unknown = 3,
}

impl ShaderStage {
    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(ShaderStage::Vertex),
            1 => Ok(ShaderStage::Fragment),
            2 => Ok(ShaderStage::Compute),
            3 => Ok(ShaderStage::Unknown),
            _ => Err(MaterialError::invalid_enum("shader stage", v)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::Fragment => "Fragment",
            ShaderStage::Compute => "Compute",
            ShaderStage::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target graphics API / shader model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ShaderCodePlatform {
    Direct3DSm40 = 0,
    Direct3DSm50 = 1,
    Direct3DSm60 = 2,
    Direct3DSm65 = 3,
    Direct3DXb1 = 4,
    Direct3DXbx = 5,
    Glsl120 = 6,
    Glsl430 = 7,
    Essl100 = 8,
    Essl300 = 9,
    Essl310 = 10,
    Metal = 11,
    Vulkan = 12,
    Nvn = 13,
    Pssl = 14,
}

impl ShaderCodePlatform {
    pub const ALL: [ShaderCodePlatform; 15] = [
        ShaderCodePlatform::Direct3DSm40,
        ShaderCodePlatform::Direct3DSm50,
        ShaderCodePlatform::Direct3DSm60,
        ShaderCodePlatform::Direct3DSm65,
        ShaderCodePlatform::Direct3DXb1,
        ShaderCodePlatform::Direct3DXbx,
        ShaderCodePlatform::Glsl120,
        ShaderCodePlatform::Glsl430,
        ShaderCodePlatform::Essl100,
        ShaderCodePlatform::Essl300,
        ShaderCodePlatform::Essl310,
        ShaderCodePlatform::Metal,
        ShaderCodePlatform::Vulkan,
        ShaderCodePlatform::Nvn,
        ShaderCodePlatform::Pssl,
    ];

    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(v))
            .copied()
            .ok_or(MaterialError::invalid_enum("shader code platform", v))
    }

    /// The engine's canonical platform string.
    pub fn name(self) -> &'static str {
        match self {
            ShaderCodePlatform::Direct3DSm40 => "Direct3D_SM40",
            ShaderCodePlatform::Direct3DSm50 => "Direct3D_SM50",
            ShaderCodePlatform::Direct3DSm60 => "Direct3D_SM60",
            ShaderCodePlatform::Direct3DSm65 => "Direct3D_SM65",
            ShaderCodePlatform::Direct3DXb1 => "Direct3D_XB1",
            ShaderCodePlatform::Direct3DXbx => "Direct3D_XBX",
            ShaderCodePlatform::Glsl120 => "GLSL_120",
            ShaderCodePlatform::Glsl430 => "GLSL_430",
            ShaderCodePlatform::Essl100 => "ESSL_100",
            ShaderCodePlatform::Essl300 => "ESSL_300",
            ShaderCodePlatform::Essl310 => "ESSL_310",
            ShaderCodePlatform::Metal => "Metal",
            ShaderCodePlatform::Vulkan => "Vulkan",
            ShaderCodePlatform::Nvn => "Nvn",
            ShaderCodePlatform::Pssl => "PSSL",
        }
    }
}

impl fmt::Display for ShaderCodePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
