//! Compiled shader code and its vertex-input descriptors

use std::sync::LazyLock;

use hashbrown::HashMap;

use crate::bgfx::BgfxShader;
use crate::error::{MaterialError, Result};
use crate::io::{Reader, Writer};
use crate::material::Named;
use crate::sampler::PrecisionConstraint;

pub type NamedShaderInput = Named<ShaderInput>;

/// One compiled shader: its inputs, a source hash, and the opaque binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCode {
    pub inputs: Vec<NamedShaderInput>,
    pub source_hash: u64,
    /// Usually a BGFX shader container, see [`ShaderCode::bgfx_shader`].
    pub bgfx_shader_data: Vec<u8>,
}

impl ShaderCode {
    /// Decode the payload as a BGFX shader container.
    pub fn bgfx_shader(&self) -> Result<BgfxShader> {
        BgfxShader::parse(&self.bgfx_shader_data)
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        let input_count = usize::from(r.read_u16()?);
        let inputs = r.read_list(input_count, |r| Named::read_with(r, ShaderInput::read))?;
        let source_hash = r.read_u64()?;
        let bgfx_shader_data = r.read_blob()?;
        Ok(Self {
            inputs,
            source_hash,
            bgfx_shader_data,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_count_u16("shader inputs", self.inputs.len())?;
        for input in &self.inputs {
            input.write_with(w, "shader input name", ShaderInput::write)?;
        }
        w.write_u64(self.source_hash);
        w.write_blob("shader code", &self.bgfx_shader_data)
    }
}

/// A vertex-stage input binding.
///
/// # Layout
/// ```text
/// u8 input type, u8 attribute index, u8 attribute sub-index,
/// bool per-instance, optional u8 precision, optional u8 interpolation
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInput {
    pub input_type: ShaderInputType,
    pub attribute: Attribute,
    pub is_per_instance: bool,
    pub precision_constraint: Option<PrecisionConstraint>,
    pub interpolation_constraint: Option<InterpolationConstraint>,
}

impl ShaderInput {
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let input_type = ShaderInputType::from_u8(r.read_u8()?)?;
        let index = r.read_u8()?;
        let sub_index = r.read_u8()?;
        let attribute = Attribute::from_tuple(index, sub_index)?;
        let is_per_instance = r.read_bool()?;
        let precision_constraint =
            r.read_optional(|r| PrecisionConstraint::from_u8(r.read_u8()?))?;
        let interpolation_constraint =
            r.read_optional(|r| InterpolationConstraint::from_u8(r.read_u8()?))?;
        Ok(Self {
            input_type,
            attribute,
            is_per_instance,
            precision_constraint,
            interpolation_constraint,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(self.input_type as u8);
        let (index, sub_index) = self.attribute.tuple();
        w.write_u8(index);
        w.write_u8(sub_index);
        w.write_bool(self.is_per_instance);
        w.write_optional(self.precision_constraint.as_ref(), |w, p| {
            w.write_u8(*p as u8);
            Ok(())
        })?;
        w.write_optional(self.interpolation_constraint.as_ref(), |w, i| {
            w.write_u8(*i as u8);
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShaderInputType {
    Float = 0,
    Vec2 = 1,
    Vec3 = 2,
    Vec4 = 3,
    Int = 4,
    Int2 = 5,
    Int3 = 6,
    Int4 = 7,
    UInt = 8,
    UInt2 = 9,
    UInt3 = 10,
    UInt4 = 11,
    Mat4 = 12,
}

impl ShaderInputType {
    pub const ALL: [ShaderInputType; 13] = [
        ShaderInputType::Float,
        ShaderInputType::Vec2,
        ShaderInputType::Vec3,
        ShaderInputType::Vec4,
        ShaderInputType::Int,
        ShaderInputType::Int2,
        ShaderInputType::Int3,
        ShaderInputType::Int4,
        ShaderInputType::UInt,
        ShaderInputType::UInt2,
        ShaderInputType::UInt3,
        ShaderInputType::UInt4,
        ShaderInputType::Mat4,
    ];

    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(v))
            .copied()
            .ok_or(MaterialError::invalid_enum("shader input type", v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InterpolationConstraint {
    Flat = 0,
    Smooth = 1,
    NoPerspective = 2,
    Centroid = 3,
}

impl InterpolationConstraint {
    pub(crate) fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(InterpolationConstraint::Flat),
            1 => Ok(InterpolationConstraint::Smooth),
            2 => Ok(InterpolationConstraint::NoPerspective),
            3 => Ok(InterpolationConstraint::Centroid),
            _ => Err(MaterialError::invalid_enum("interpolation constraint", v)),
        }
    }
}

/// Named vertex attribute, stored on the wire as an (index, sub-index) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    Tangent,
    Bitangent,
    Color0,
    Color1,
    Color2,
    Color3,
    Indices,
    Weights,
    TexCoord0,
    TexCoord1,
    TexCoord2,
    TexCoord3,
    TexCoord4,
    TexCoord5,
    TexCoord6,
    TexCoord7,
    TexCoord8,
    FrontFacing,
}

/// Reverse of [`Attribute::tuple`], built from [`Attribute::ALL`].
static ATTRIBUTE_BY_TUPLE: LazyLock<HashMap<(u8, u8), Attribute>> =
    LazyLock::new(|| Attribute::ALL.iter().map(|a| (a.tuple(), *a)).collect());

impl Attribute {
    pub const ALL: [Attribute; 20] = [
        Attribute::Position,
        Attribute::Normal,
        Attribute::Tangent,
        Attribute::Bitangent,
        Attribute::Color0,
        Attribute::Color1,
        Attribute::Color2,
        Attribute::Color3,
        Attribute::Indices,
        Attribute::Weights,
        Attribute::TexCoord0,
        Attribute::TexCoord1,
        Attribute::TexCoord2,
        Attribute::TexCoord3,
        Attribute::TexCoord4,
        Attribute::TexCoord5,
        Attribute::TexCoord6,
        Attribute::TexCoord7,
        Attribute::TexCoord8,
        Attribute::FrontFacing,
    ];

    /// Wire (index, sub-index) pair.
    pub fn tuple(self) -> (u8, u8) {
        match self {
            Attribute::Position => (0, 0),
            Attribute::Normal => (1, 0),
            Attribute::Tangent => (2, 0),
            Attribute::Bitangent => (3, 0),
            Attribute::Color0 => (4, 0),
            Attribute::Color1 => (4, 1),
            Attribute::Color2 => (4, 2),
            Attribute::Color3 => (4, 3),
            Attribute::Indices => (5, 0),
            Attribute::Weights => (6, 0),
            Attribute::TexCoord0 => (7, 0),
            Attribute::TexCoord1 => (7, 1),
            Attribute::TexCoord2 => (7, 2),
            Attribute::TexCoord3 => (7, 3),
            Attribute::TexCoord4 => (7, 4),
            Attribute::TexCoord5 => (7, 5),
            Attribute::TexCoord6 => (7, 6),
            Attribute::TexCoord7 => (7, 7),
            Attribute::TexCoord8 => (7, 8),
            Attribute::FrontFacing => (9, 0),
        }
    }

    pub fn from_tuple(index: u8, sub_index: u8) -> Result<Self> {
        ATTRIBUTE_BY_TUPLE
            .get(&(index, sub_index))
            .copied()
            .ok_or(MaterialError::InvalidAttribute { index, sub_index })
    }
}
