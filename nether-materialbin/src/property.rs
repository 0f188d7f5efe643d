//! Property field codec
//!
//! A property is a `u16` type tag, a `u32` element count and a presence
//! flag. Inline types follow a set flag with a fixed-size payload. External
//! properties never carry payload bytes, whatever the flag says.

use crate::error::{MaterialError, Result};
use crate::io::{Reader, Writer};

/// Wire tags for [`PropertyField`].
pub mod tag {
    pub const VEC4: u16 = 2;
    pub const MAT3: u16 = 3;
    pub const MAT4: u16 = 4;
    pub const EXTERNAL: u16 = 5;
}

pub const VEC4_SIZE: usize = 16;
pub const MAT3_SIZE: usize = 36;
pub const MAT4_SIZE: usize = 64;

/// A named constant slot in a material's uniform data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyField {
    Vec4 {
        count: u32,
        value: Option<[u8; VEC4_SIZE]>,
    },
    Mat3 {
        count: u32,
        value: Option<[u8; MAT3_SIZE]>,
    },
    Mat4 {
        count: u32,
        value: Option<[u8; MAT4_SIZE]>,
    },
    /// Bound from outside the material. The count and flag are kept as
    /// decoded so the field re-encodes unchanged.
    External { count: u32, has_data: bool },
}

impl PropertyField {
    pub fn type_tag(&self) -> u16 {
        match self {
            PropertyField::Vec4 { .. } => tag::VEC4,
            PropertyField::Mat3 { .. } => tag::MAT3,
            PropertyField::Mat4 { .. } => tag::MAT4,
            PropertyField::External { .. } => tag::EXTERNAL,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            PropertyField::Vec4 { count, .. }
            | PropertyField::Mat3 { count, .. }
            | PropertyField::Mat4 { count, .. }
            | PropertyField::External { count, .. } => *count,
        }
    }

    /// Inline default payload, if any.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            PropertyField::Vec4 { value, .. } => value.as_ref().map(|v| v.as_slice()),
            PropertyField::Mat3 { value, .. } => value.as_ref().map(|v| v.as_slice()),
            PropertyField::Mat4 { value, .. } => value.as_ref().map(|v| v.as_slice()),
            PropertyField::External { .. } => None,
        }
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        let ty = r.read_u16()?;
        if !matches!(ty, tag::VEC4 | tag::MAT3 | tag::MAT4 | tag::EXTERNAL) {
            return Err(MaterialError::invalid_enum("property type", ty));
        }
        let count = r.read_u32()?;

        Ok(match ty {
            tag::VEC4 => PropertyField::Vec4 {
                count,
                value: r.read_optional(|r| r.read_array())?,
            },
            tag::MAT3 => PropertyField::Mat3 {
                count,
                value: r.read_optional(|r| r.read_array())?,
            },
            tag::MAT4 => PropertyField::Mat4 {
                count,
                value: r.read_optional(|r| r.read_array())?,
            },
            _ => PropertyField::External {
                count,
                has_data: r.read_bool()?,
            },
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u16(self.type_tag());
        w.write_u32(self.count());
        match self {
            PropertyField::External { has_data, .. } => w.write_bool(*has_data),
            _ => w.write_optional(self.data(), |w, data| {
                w.write_bytes(data);
                Ok(())
            })?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(field: &PropertyField) -> Vec<u8> {
        let mut w = Writer::new();
        field.write(&mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn test_vec4_with_payload() {
        let mut value = [0u8; VEC4_SIZE];
        value[..4].copy_from_slice(&1.0f32.to_le_bytes());
        let field = PropertyField::Vec4 {
            count: 1,
            value: Some(value),
        };
        let bytes = encode(&field);
        assert_eq!(bytes.len(), 2 + 4 + 1 + VEC4_SIZE);
        assert_eq!(&bytes[..7], &[2, 0, 1, 0, 0, 0, 1]);

        let mut r = Reader::new(&bytes);
        assert_eq!(PropertyField::read(&mut r).unwrap(), field);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_payload_sizes() {
        let cases = [
            (
                PropertyField::Mat3 {
                    count: 2,
                    value: Some([7; MAT3_SIZE]),
                },
                MAT3_SIZE,
            ),
            (
                PropertyField::Mat4 {
                    count: 1,
                    value: Some([9; MAT4_SIZE]),
                },
                MAT4_SIZE,
            ),
        ];
        for (field, size) in cases {
            let bytes = encode(&field);
            assert_eq!(bytes.len(), 7 + size);
            assert_eq!(PropertyField::read(&mut Reader::new(&bytes)).unwrap(), field);
        }
    }

    #[test]
    fn test_without_payload() {
        let field = PropertyField::Mat4 {
            count: 4,
            value: None,
        };
        let bytes = encode(&field);
        assert_eq!(bytes, [4, 0, 4, 0, 0, 0, 0]);
        assert_eq!(PropertyField::read(&mut Reader::new(&bytes)).unwrap(), field);
    }

    #[test]
    fn test_external_reads_count_and_flag() {
        // tag 5, count 1, flag clear, then the next property's name length
        let data = [0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x04];
        let mut r = Reader::new(&data);
        let field = PropertyField::read(&mut r).unwrap();
        assert_eq!(
            field,
            PropertyField::External {
                count: 1,
                has_data: false
            }
        );
        assert_eq!(field.data(), None);
        assert_eq!(r.remaining(), 1);
        assert_eq!(encode(&field), data[..7]);
    }

    #[test]
    fn test_external_flag_has_no_payload() {
        let data = [0x05, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01];
        let mut r = Reader::new(&data);
        let field = PropertyField::read(&mut r).unwrap();
        assert_eq!(
            field,
            PropertyField::External {
                count: 3,
                has_data: true
            }
        );
        assert_eq!(r.remaining(), 0);
        assert_eq!(encode(&field), data);
    }

    #[test]
    fn test_unknown_type_tag() {
        for ty in [0u16, 1, 6, 0xFFFF] {
            let bytes = ty.to_le_bytes();
            let err = PropertyField::read(&mut Reader::new(&bytes)).unwrap_err();
            assert_eq!(err, MaterialError::invalid_enum("property type", ty));
        }
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = [2, 0, 1, 0, 0, 0, 1, 0, 0];
        let err = PropertyField::read(&mut Reader::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            MaterialError::UnexpectedEof {
                offset: 7,
                needed: VEC4_SIZE,
                ..
            }
        ));
    }
}
