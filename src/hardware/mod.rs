//! Hardware capability layer.
//!
//! - [`kind`]: the capability discriminant
//! - [`capabilities`]: control-object traits and their value types
//! - [`interface`]: the per-camera capability host
//! - [`dispatch`]: checked recovery of typed control objects
//! - [`acquisition`]: shared acquisition-active flag for busy policies
//! - [`mock`]: simulated control objects and camera

pub mod acquisition;
pub mod capabilities;
pub mod dispatch;
pub mod interface;
pub mod kind;
pub mod mock;

pub use acquisition::AcquisitionFlag;
pub use capabilities::{
    Bin, BinCtrl, BufferAllocation, BufferCtrl, DetInfoCtrl, Flip, FlipCtrl, Roi, RoiCtrl,
    SyncCtrl, TrigMode, ValidRanges,
};
pub use dispatch::{resolve, resolve_all, resolve_kind, CapabilityHandle, CapabilityInterface};
pub use interface::{CapabilityRecord, ControlObject, HardwareInterface};
pub use kind::CapabilityKind;
