//! Capability kind discriminant.
//!
//! The six kinds this build understands are closed enum variants. Codes that
//! arrive from a newer driver or from the binding layer and do not match one
//! of them are kept as [`CapabilityKind::Unrecognized`] so a host can still
//! file them and the dispatcher can report them explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional hardware feature a camera may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Read-only sensor geometry and identification.
    DetInfo,
    /// Frame buffer allocation.
    Buffer,
    /// Exposure, latency and trigger configuration.
    Sync,
    /// Hardware binning factors.
    Bin,
    /// Region of interest.
    Roi,
    /// Horizontal/vertical mirroring.
    Flip,
    /// Kind code not known to this build.
    Unrecognized(u16),
}

impl CapabilityKind {
    /// The kinds this build can dispatch, in canonical order.
    pub const KNOWN: [CapabilityKind; 6] = [
        CapabilityKind::DetInfo,
        CapabilityKind::Buffer,
        CapabilityKind::Sync,
        CapabilityKind::Bin,
        CapabilityKind::Roi,
        CapabilityKind::Flip,
    ];

    /// Stable numeric code used across the binding boundary.
    pub fn code(&self) -> u16 {
        match self {
            CapabilityKind::DetInfo => 0,
            CapabilityKind::Buffer => 1,
            CapabilityKind::Sync => 2,
            CapabilityKind::Bin => 3,
            CapabilityKind::Roi => 4,
            CapabilityKind::Flip => 5,
            CapabilityKind::Unrecognized(code) => *code,
        }
    }

    /// Inverse of [`code`](Self::code). Unknown codes become `Unrecognized`.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => CapabilityKind::DetInfo,
            1 => CapabilityKind::Buffer,
            2 => CapabilityKind::Sync,
            3 => CapabilityKind::Bin,
            4 => CapabilityKind::Roi,
            5 => CapabilityKind::Flip,
            other => CapabilityKind::Unrecognized(other),
        }
    }

    /// Configuration/display name; `None` for unrecognized kinds.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            CapabilityKind::DetInfo => Some("det_info"),
            CapabilityKind::Buffer => Some("buffer"),
            CapabilityKind::Sync => Some("sync"),
            CapabilityKind::Bin => Some("bin"),
            CapabilityKind::Roi => Some("roi"),
            CapabilityKind::Flip => Some("flip"),
            CapabilityKind::Unrecognized(_) => None,
        }
    }

    /// Parse a configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.as_str() == Some(name))
    }

    /// False only for `Unrecognized`.
    pub fn is_known(&self) -> bool {
        !matches!(self, CapabilityKind::Unrecognized(_))
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => f.write_str(name),
            None => write!(f, "unrecognized({})", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_known_kinds() {
        for kind in CapabilityKind::KNOWN {
            assert_eq!(CapabilityKind::from_code(kind.code()), kind);
            assert!(kind.is_known());
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        let kind = CapabilityKind::from_code(42);
        assert_eq!(kind, CapabilityKind::Unrecognized(42));
        assert_eq!(kind.code(), 42);
        assert!(!kind.is_known());
        assert_eq!(kind.to_string(), "unrecognized(42)");
    }

    #[test]
    fn names_parse() {
        assert_eq!(CapabilityKind::from_name("roi"), Some(CapabilityKind::Roi));
        assert_eq!(CapabilityKind::from_name("det_info"), Some(CapabilityKind::DetInfo));
        assert_eq!(CapabilityKind::from_name("shutter"), None);
    }
}
