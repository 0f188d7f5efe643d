//! In-process material documents for command tests

use nether_materialbin::{
    BgfxShader, BlendMode, CompiledMaterialDefinition, Named, Pass, PlatformShaderCode,
    PlatformShaderStage, PlatformSupport, PropertyField, ShaderCode, ShaderCodePlatform,
    ShaderStage, StringPair, Uniform, Variant, VertexAttributes,
};

fn bgfx_payload() -> Vec<u8> {
    BgfxShader {
        magic: u32::from_le_bytes(*b"FSH\x0b"),
        hash: 0xCAFE_F00D,
        uniforms: vec![
            Uniform {
                name: "u_fogColor".to_string(),
                ty: 2,
                num: 1,
                reg_index: 0,
                reg_count: 1,
            },
            Uniform {
                name: "s_MatTexture".to_string(),
                ty: 0x10,
                num: 1,
                reg_index: 0,
                reg_count: 1,
            },
        ],
        code: vec![0xAB; 48],
        attributes: VertexAttributes::Absent,
    }
    .to_bytes()
    .unwrap()
}

fn shader(stage: ShaderStage, platform: ShaderCodePlatform, data: Vec<u8>) -> PlatformShaderCode {
    PlatformShaderCode {
        stage: PlatformShaderStage::new(stage, platform),
        code: ShaderCode {
            inputs: Vec::new(),
            source_hash: 0x0123_4567_89AB_CDEF,
            bgfx_shader_data: data,
        },
    }
}

/// One pass, one variant, a decodable fragment shader and an opaque vertex
/// shader.
pub fn sample_material(revision: u64) -> CompiledMaterialDefinition {
    let mut material = CompiledMaterialDefinition::new("Sky", revision);
    material.parent_name = Some("SkyBase".to_string());
    material.property_fields = vec![Named::new(
        "SkyColor",
        PropertyField::Vec4 {
            count: 1,
            value: Some([0; 16]),
        },
    )];
    material.passes = vec![Named::new(
        "Opaque",
        Pass {
            platform_support: PlatformSupport::Bitset("111111111111111".to_string()),
            fallback: String::new(),
            default_blend_mode: Some(BlendMode::None),
            default_flag_values: vec![StringPair::new("Fog", "On")],
            output_binding_signature: None,
            variants: vec![Variant {
                is_supported: true,
                flags: vec![StringPair::new("Fog", "On")],
                shader_codes: vec![
                    shader(ShaderStage::Vertex, ShaderCodePlatform::Essl310, vec![1, 2, 3]),
                    shader(
                        ShaderStage::Fragment,
                        ShaderCodePlatform::Essl310,
                        bgfx_payload(),
                    ),
                ],
            }],
        },
    )];
    material
}

pub fn sample_bytes(revision: u64) -> Vec<u8> {
    nether_materialbin::marshal(&sample_material(revision), revision).unwrap()
}
