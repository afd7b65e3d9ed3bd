//! Capability negotiation and dispatch for camera/detector control.
//!
//! A generic acquisition framework drives many detectors whose feature sets
//! differ. Each camera exposes a [`HardwareInterface`] holding one control
//! object per optional feature ("capability"); generic code lists the
//! capabilities and recovers typed control objects through the dispatcher,
//! never knowing the concrete camera type.
//!
//! ```no_run
//! use detector_caps::prelude::*;
//!
//! # fn main() -> CapsResult<()> {
//! let camera = MockCamera::new(&CameraConfig::default())?;
//! let hw = camera.interface();
//! for kind in hw.list_capabilities() {
//!     println!("{kind}: {}", resolve_kind(hw, kind)?.describe());
//! }
//! let roi = resolve::<dyn RoiCtrl>(hw)?;
//! let applied = roi.set_roi(Roi::new(1900, 1900, 512, 512))?;
//! println!("applied {applied}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod hardware;
pub mod limits;

pub use error::{CapsError, CapsResult};
pub use frame::{FrameDim, PixelType};
pub use hardware::{CapabilityKind, HardwareInterface};

/// Common imports for capability users and driver authors.
pub mod prelude {
    pub use crate::config::CameraConfig;
    pub use crate::error::{CapsError, CapsResult};
    pub use crate::frame::{FrameDim, PixelType};
    pub use crate::hardware::mock::MockCamera;
    pub use crate::hardware::{
        resolve, resolve_all, resolve_kind, AcquisitionFlag, Bin, BinCtrl, BufferAllocation,
        BufferCtrl, CapabilityHandle, CapabilityInterface, CapabilityKind, ControlObject,
        DetInfoCtrl, Flip, FlipCtrl, HardwareInterface, Roi, RoiCtrl, SyncCtrl, TrigMode,
        ValidRanges,
    };
}
