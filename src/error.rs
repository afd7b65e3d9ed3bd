//! Error types for capability negotiation and control-object operations.
//!
//! `CapsError` is the single error type returned by the library. It groups
//! into three families:
//!
//! - **Construction**: `InvalidGeometry` and the sizing errors raised by
//!   [`crate::limits`]. A value that fails these checks is never built.
//! - **Lookup**: `NotSupported`, `UnknownCapability` and `TypeMismatch`,
//!   returned by the host and the dispatcher. `TypeMismatch` means a driver
//!   registered an object under the wrong kind.
//! - **Operational**: `OutOfRange`, `InvalidRegion`, `BusyState` and
//!   `InvalidTriggerMode`, raised by individual control objects.
//!
//! None of these are retried by the library.

use thiserror::Error;

use crate::hardware::capabilities::{Roi, TrigMode};
use crate::hardware::kind::CapabilityKind;

/// Convenience alias for results using the library error type.
pub type CapsResult<T> = std::result::Result<T, CapsError>;

#[derive(Error, Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum CapsError {
    #[error("Invalid frame geometry {width}x{height}: width and height must be > 0")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("Frame dimensions {width}x{height} exceed maximum {max_dimension}")]
    FrameDimensionsTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
    },

    #[error("Frame size {bytes} bytes exceeds maximum {max_bytes} bytes")]
    FrameTooLarge { bytes: usize, max_bytes: usize },

    #[error("Size overflow while computing {context}")]
    SizeOverflow { context: &'static str },

    #[error("Capability '{0}' is not supported by this camera")]
    NotSupported(CapabilityKind),

    #[error("Capability '{0}' is not recognized by this dispatcher")]
    UnknownCapability(CapabilityKind),

    #[error("Control object registered as '{kind}' is a {found}, expected {expected}")]
    TypeMismatch {
        kind: CapabilityKind,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Region {roi} lies outside detector bounds {bounds}")]
    InvalidRegion { roi: Roi, bounds: Roi },

    #[error("Cannot {0} while acquisition is active")]
    BusyState(&'static str),

    #[error("Trigger mode {0:?} is not supported by this camera")]
    InvalidTriggerMode(TrigMode),
}

impl CapsError {
    /// True for the lookup failures raised by the host and the dispatcher.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            CapsError::NotSupported(_)
                | CapsError::UnknownCapability(_)
                | CapsError::TypeMismatch { .. }
        )
    }
}
