//! Material codec error types

use thiserror::Error;

use crate::material::EncryptionVariant;

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, MaterialError>;

/// Where a magic number was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicLocation {
    Header,
    Footer,
}

impl std::fmt::Display for MagicLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MagicLocation::Header => write!(f, "header"),
            MagicLocation::Footer => write!(f, "footer"),
        }
    }
}

/// Material codec errors.
///
/// Every error is fatal to the current `parse`/`marshal` call. Nested codecs
/// hand these back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    /// A read would run past the end of the buffer
    #[error("unexpected end of input at offset {offset:#x}: need {needed} bytes, short by {shortfall}")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        shortfall: usize,
    },

    /// Header or footer magic did not match
    #[error("invalid {location} magic: expected {expected:#X}, found {found:#X}", expected = crate::MATERIAL_MAGIC)]
    InvalidMagic { location: MagicLocation, found: u64 },

    /// Header class name was not `RenderDragon.CompiledMaterialDefinition`
    #[error("invalid definition class name {0:?}")]
    InvalidClassName(String),

    /// String bytes were not valid UTF-8
    #[error("string at offset {offset:#x} is not valid UTF-8")]
    InvalidString { offset: usize },

    /// Caller expected a different revision than the header declares
    #[error("material revision mismatch: file={file} expected={expected}")]
    RevisionMismatch { file: u64, expected: u64 },

    /// Encryption tag is not one of the three known values
    #[error("unknown encryption variant {0:#X}")]
    UnknownEncryption(u32),

    /// Encryption tag is known but not `none`
    #[error("encrypted materials are not supported ({0})")]
    UnsupportedEncryption(EncryptionVariant),

    /// An enum tag outside its known range
    #[error("invalid {kind}: {value}")]
    InvalidEnum { kind: &'static str, value: u64 },

    /// A vertex attribute tuple with no table entry
    #[error("invalid attribute tuple ({index},{sub_index})")]
    InvalidAttribute { index: u8, sub_index: u8 },

    /// A count or length does not fit its wire width
    #[error("{field} length {len} exceeds maximum {max}")]
    WidthOverflow {
        field: &'static str,
        len: usize,
        max: u64,
    },

    /// Neither the caller nor the document supplied a revision
    #[error("material revision is required for marshalling")]
    MissingRevision,

    /// A value that has no encoding at the target revision
    #[error("{field} cannot be encoded at revision {revision}: {reason}")]
    IncompatibleValue {
        field: &'static str,
        revision: u64,
        reason: &'static str,
    },
}

impl MaterialError {
    pub(crate) fn invalid_enum(kind: &'static str, value: impl Into<u64>) -> Self {
        MaterialError::InvalidEnum {
            kind,
            value: value.into(),
        }
    }
}
