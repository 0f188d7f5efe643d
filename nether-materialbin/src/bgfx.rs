//! BGFX shader binary container
//!
//! The payload stored in a [`ShaderCode`](crate::ShaderCode) blob for most
//! platforms. It is decoded independently of the material revision.
//!
//! # Layout
//! ```text
//! magic       u32
//! hash        u32
//! uniforms    u16 count, then per uniform:
//!               u8 name length + name, u8 type, u8 num,
//!               u16 register index, u16 register count
//! code        u32 length + bytes
//! reserved    u8 (written as 0)
//! trailer     present only if bytes remain:
//!               u8 attribute count; if non-zero, count x u16 ids, u16 size
//! ```

use crate::error::Result;
use crate::io::{Reader, Writer};

/// A decoded BGFX shader binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgfxShader {
    pub magic: u32,
    pub hash: u32,
    pub uniforms: Vec<Uniform>,
    pub code: Vec<u8>,
    pub attributes: VertexAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    pub name: String,
    pub ty: u8,
    pub num: u8,
    pub reg_index: u16,
    pub reg_count: u16,
}

/// Vertex-attribute trailer following the reserved byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VertexAttributes {
    /// Input ended right after the reserved byte.
    #[default]
    Absent,
    /// A zero attribute count was present.
    Empty,
    Present { ids: Vec<u16>, size: u16 },
}

impl VertexAttributes {
    /// Attribute ids, empty unless [`VertexAttributes::Present`].
    pub fn ids(&self) -> &[u16] {
        match self {
            VertexAttributes::Present { ids, .. } => ids,
            _ => &[],
        }
    }

    pub fn size(&self) -> Option<u16> {
        match self {
            VertexAttributes::Present { size, .. } => Some(*size),
            _ => None,
        }
    }
}

impl BgfxShader {
    /// Decode a standalone BGFX shader binary. Trailing bytes after the
    /// attribute trailer are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Reader::new(bytes))
    }

    /// Encode back to the container format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write(&mut w)?;
        Ok(w.into_bytes())
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let magic = r.read_u32()?;
        let hash = r.read_u32()?;

        let uniform_count = usize::from(r.read_u16()?);
        let uniforms = r.read_list(uniform_count, Uniform::read)?;

        let code = r.read_blob()?;
        let _reserved = r.read_u8()?;

        let attributes = if r.remaining() == 0 {
            VertexAttributes::Absent
        } else {
            match usize::from(r.read_u8()?) {
                0 => VertexAttributes::Empty,
                count => {
                    let ids = r.read_list(count, Reader::read_u16)?;
                    let size = r.read_u16()?;
                    VertexAttributes::Present { ids, size }
                }
            }
        };

        Ok(Self {
            magic,
            hash,
            uniforms,
            code,
            attributes,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.magic);
        w.write_u32(self.hash);

        w.write_count_u16("bgfx uniforms", self.uniforms.len())?;
        for uniform in &self.uniforms {
            uniform.write(w)?;
        }

        w.write_blob("bgfx code", &self.code)?;
        w.write_u8(0);

        match &self.attributes {
            VertexAttributes::Absent => {}
            VertexAttributes::Empty => w.write_u8(0),
            VertexAttributes::Present { ids, size } => {
                w.write_count_u8("bgfx attributes", ids.len())?;
                for id in ids {
                    w.write_u16(*id);
                }
                w.write_u16(*size);
            }
        }
        Ok(())
    }
}

impl Uniform {
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let name_len = usize::from(r.read_u8()?);
        Ok(Self {
            name: r.read_utf8(name_len)?,
            ty: r.read_u8()?,
            num: r.read_u8()?,
            reg_index: r.read_u16()?,
            reg_count: r.read_u16()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_count_u8("bgfx uniform name", self.name.len())?;
        w.write_bytes(self.name.as_bytes());
        w.write_u8(self.ty);
        w.write_u8(self.num);
        w.write_u16(self.reg_index);
        w.write_u16(self.reg_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaterialError;

    // "FSH\x0b"
    const FSH_MAGIC: u32 = u32::from_le_bytes([b'F', b'S', b'H', 0x0B]);

    fn shader(attributes: VertexAttributes) -> BgfxShader {
        BgfxShader {
            magic: FSH_MAGIC,
            hash: 0xCAFE_F00D,
            uniforms: vec![
                Uniform {
                    name: "u_viewRect".to_string(),
                    ty: 2,
                    num: 1,
                    reg_index: 0,
                    reg_count: 1,
                },
                Uniform {
                    name: "u_model".to_string(),
                    ty: 4,
                    num: 32,
                    reg_index: 1,
                    reg_count: 128,
                },
            ],
            code: b"void main() {}".to_vec(),
            attributes,
        }
    }

    #[test]
    fn test_trailer_variants_roundtrip() {
        for attributes in [
            VertexAttributes::Absent,
            VertexAttributes::Empty,
            VertexAttributes::Present {
                ids: vec![0x0001, 0x0010, 0x0102],
                size: 36,
            },
        ] {
            let original = shader(attributes);
            let bytes = original.to_bytes().unwrap();
            assert_eq!(BgfxShader::parse(&bytes).unwrap(), original);
        }
    }

    #[test]
    fn test_trailer_byte_counts() {
        let absent = shader(VertexAttributes::Absent).to_bytes().unwrap();
        let empty = shader(VertexAttributes::Empty).to_bytes().unwrap();
        let present = shader(VertexAttributes::Present {
            ids: vec![7, 8],
            size: 12,
        })
        .to_bytes()
        .unwrap();

        assert_eq!(*absent.last().unwrap(), 0);
        assert_eq!(empty.len(), absent.len() + 1);
        assert_eq!(present.len(), absent.len() + 1 + 2 * 2 + 2);
        assert_eq!(&present[absent.len()..], &[2, 7, 0, 8, 0, 12, 0]);
    }

    #[test]
    fn test_header_layout() {
        let bytes = shader(VertexAttributes::Absent).to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"FSH\x0b");
        assert_eq!(&bytes[4..8], &0xCAFE_F00Du32.to_le_bytes());
        assert_eq!(&bytes[8..10], &[2, 0]);
        // First uniform: u8 name length
        assert_eq!(bytes[10], 10);
        assert_eq!(&bytes[11..21], b"u_viewRect");
    }

    #[test]
    fn test_truncated_trailer() {
        let mut bytes = shader(VertexAttributes::Absent).to_bytes().unwrap();
        // Count of 2, but only one id and no size
        bytes.extend_from_slice(&[2, 1, 0]);
        let err = BgfxShader::parse(&bytes).unwrap_err();
        assert!(matches!(err, MaterialError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_missing_reserved_byte() {
        let mut bytes = shader(VertexAttributes::Absent).to_bytes().unwrap();
        bytes.pop();
        assert!(BgfxShader::parse(&bytes).is_err());
    }

    #[test]
    fn test_uniform_name_too_long() {
        let mut s = shader(VertexAttributes::Absent);
        s.uniforms[0].name = "x".repeat(256);
        let err = s.to_bytes().unwrap_err();
        assert!(matches!(
            err,
            MaterialError::WidthOverflow {
                field: "bgfx uniform name",
                ..
            }
        ));
    }
}
