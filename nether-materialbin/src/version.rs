//! Format revision feature gates
//!
//! The header's revision is an ever-increasing integer. Every
//! revision-dependent field in the codec consults the predicates here (through
//! a [`Capabilities`] token built once per document); nothing else compares
//! revision numbers.
//!
//! Known thresholds:
//! - `<= 18`: legacy layout (8-bit sampler register slot, derived binding slot,
//!   sentinel-framed pass platform support)
//! - `>= 20`: sampler texture URI
//! - `>= 21`: sampler state (and no sampler-type ordinal shift)
//! - `>= 22`: uniform overrides
//! - `>= 23`: pass output binding signature

/// Material format revision as stored in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatRevision(pub u64);

impl FormatRevision {
    /// Last revision using the legacy layout.
    pub const LAST_LEGACY: Self = Self(18);
    pub const TEXTURE_URI: Self = Self(20);
    pub const SAMPLER_STATE: Self = Self(21);
    pub const UNIFORM_OVERRIDES: Self = Self(22);
    pub const OUTPUT_BINDING_SIGNATURE: Self = Self(23);

    pub fn is_legacy_layout(self) -> bool {
        self <= Self::LAST_LEGACY
    }

    pub fn supports_texture_uri(self) -> bool {
        self >= Self::TEXTURE_URI
    }

    pub fn supports_sampler_state(self) -> bool {
        self >= Self::SAMPLER_STATE
    }

    pub fn supports_uniform_overrides(self) -> bool {
        self >= Self::UNIFORM_OVERRIDES
    }

    pub fn supports_output_binding_signature(self) -> bool {
        self >= Self::OUTPUT_BINDING_SIGNATURE
    }

    /// Resolve the capability token for this revision.
    pub fn capabilities(self) -> Capabilities {
        Capabilities {
            revision: self.0,
            legacy_layout: self.is_legacy_layout(),
            texture_uri: self.supports_texture_uri(),
            sampler_state: self.supports_sampler_state(),
            uniform_overrides: self.supports_uniform_overrides(),
            output_binding_signature: self.supports_output_binding_signature(),
        }
    }
}

impl From<u64> for FormatRevision {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for FormatRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability flags for one revision, threaded by value through every nested
/// codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The revision the flags were derived from (for error reporting).
    pub revision: u64,
    pub legacy_layout: bool,
    pub texture_uri: bool,
    pub sampler_state: bool,
    pub uniform_overrides: bool,
    pub output_binding_signature: bool,
}

impl Capabilities {
    pub fn for_revision(revision: u64) -> Self {
        FormatRevision(revision).capabilities()
    }
}
