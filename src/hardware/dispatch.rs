//! Capability dispatcher.
//!
//! Turns a (host, kind) pair into a typed control-object handle. Two entry
//! points share one recovery path:
//!
//! - [`resolve`] is generic over the interface type. It is the open path: a
//!   new capability only needs a control trait and a [`CapabilityInterface`]
//!   impl for its `dyn` type.
//! - [`resolve_kind`] is the closed switch used by the binding layer, which
//!   only has a runtime [`CapabilityKind`]. Kinds this build does not know
//!   fall through to `UnknownCapability`.
//!
//! Both are stateless and take the host by shared reference.

use std::sync::Arc;

use tracing::{error, warn};

use crate::error::{CapsError, CapsResult};
use crate::hardware::capabilities::{BinCtrl, BufferCtrl, DetInfoCtrl, FlipCtrl, RoiCtrl, SyncCtrl};
use crate::hardware::interface::HardwareInterface;
use crate::hardware::kind::CapabilityKind;

/// Binds a control trait object type to the kind it is filed under.
pub trait CapabilityInterface: Send + Sync + 'static {
    /// Kind this interface is registered as.
    const KIND: CapabilityKind;
    /// Interface name used in diagnostics.
    const NAME: &'static str;
}

impl CapabilityInterface for dyn DetInfoCtrl {
    const KIND: CapabilityKind = CapabilityKind::DetInfo;
    const NAME: &'static str = "DetInfoCtrl";
}

impl CapabilityInterface for dyn BufferCtrl {
    const KIND: CapabilityKind = CapabilityKind::Buffer;
    const NAME: &'static str = "BufferCtrl";
}

impl CapabilityInterface for dyn SyncCtrl {
    const KIND: CapabilityKind = CapabilityKind::Sync;
    const NAME: &'static str = "SyncCtrl";
}

impl CapabilityInterface for dyn BinCtrl {
    const KIND: CapabilityKind = CapabilityKind::Bin;
    const NAME: &'static str = "BinCtrl";
}

impl CapabilityInterface for dyn RoiCtrl {
    const KIND: CapabilityKind = CapabilityKind::Roi;
    const NAME: &'static str = "RoiCtrl";
}

impl CapabilityInterface for dyn FlipCtrl {
    const KIND: CapabilityKind = CapabilityKind::Flip;
    const NAME: &'static str = "FlipCtrl";
}

/// Resolve the control object for interface `C`.
///
/// # Errors
/// - `NotSupported` if the camera has no record for `C::KIND`
/// - `TypeMismatch` if the record's object is not a `C` (logged at error level)
pub fn resolve<C>(hw: &HardwareInterface) -> CapsResult<Arc<C>>
where
    C: CapabilityInterface + ?Sized,
{
    let kind = C::KIND;
    let object = hw.get_control_object(kind)?;
    object.downcast::<C>().ok_or_else(|| {
        error!(
            target: "detector_caps::dispatch",
            camera = hw.name(),
            %kind,
            expected = C::NAME,
            found = object.type_name(),
            "Capability registered with wrong control object type"
        );
        CapsError::TypeMismatch {
            kind,
            expected: C::NAME,
            found: object.type_name(),
        }
    })
}

/// Typed handle for one of the kinds this build knows.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum CapabilityHandle {
    DetInfo(Arc<dyn DetInfoCtrl>),
    Buffer(Arc<dyn BufferCtrl>),
    Sync(Arc<dyn SyncCtrl>),
    Bin(Arc<dyn BinCtrl>),
    Roi(Arc<dyn RoiCtrl>),
    Flip(Arc<dyn FlipCtrl>),
}

impl CapabilityHandle {
    /// Kind of the wrapped control object.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityHandle::DetInfo(_) => CapabilityKind::DetInfo,
            CapabilityHandle::Buffer(_) => CapabilityKind::Buffer,
            CapabilityHandle::Sync(_) => CapabilityKind::Sync,
            CapabilityHandle::Bin(_) => CapabilityKind::Bin,
            CapabilityHandle::Roi(_) => CapabilityKind::Roi,
            CapabilityHandle::Flip(_) => CapabilityKind::Flip,
        }
    }

    /// Detector-info control, if this is one.
    pub fn as_det_info(&self) -> Option<Arc<dyn DetInfoCtrl>> {
        match self {
            CapabilityHandle::DetInfo(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// Buffer control, if this is one.
    pub fn as_buffer(&self) -> Option<Arc<dyn BufferCtrl>> {
        match self {
            CapabilityHandle::Buffer(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// Sync control, if this is one.
    pub fn as_sync(&self) -> Option<Arc<dyn SyncCtrl>> {
        match self {
            CapabilityHandle::Sync(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// Binning control, if this is one.
    pub fn as_bin(&self) -> Option<Arc<dyn BinCtrl>> {
        match self {
            CapabilityHandle::Bin(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// ROI control, if this is one.
    pub fn as_roi(&self) -> Option<Arc<dyn RoiCtrl>> {
        match self {
            CapabilityHandle::Roi(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// Flip control, if this is one.
    pub fn as_flip(&self) -> Option<Arc<dyn FlipCtrl>> {
        match self {
            CapabilityHandle::Flip(ctrl) => Some(ctrl.clone()),
            _ => None,
        }
    }

    /// One-line summary of the control object's current state.
    pub fn describe(&self) -> String {
        match self {
            CapabilityHandle::DetInfo(ctrl) => format!(
                "{} {} max {}",
                ctrl.detector_type(),
                ctrl.detector_model(),
                ctrl.max_image_size()
            ),
            CapabilityHandle::Buffer(ctrl) => match ctrl.allocation() {
                Some(alloc) => format!(
                    "{} x {} ({} bytes)",
                    alloc.nb_buffers, alloc.frame_dim, alloc.total_bytes
                ),
                None => "no buffers allocated".to_string(),
            },
            CapabilityHandle::Sync(ctrl) => format!(
                "trigger {:?}, exposure {} s, latency {} s, {} frames",
                ctrl.trigger_mode(),
                ctrl.exposure_time(),
                ctrl.latency_time(),
                ctrl.nb_frames()
            ),
            CapabilityHandle::Bin(ctrl) => format!("bin {} (max {})", ctrl.bin(), ctrl.max_bin()),
            CapabilityHandle::Roi(ctrl) => format!("roi {} in {}", ctrl.roi(), ctrl.bounds()),
            CapabilityHandle::Flip(ctrl) => {
                let flip = ctrl.flip();
                format!("flip x={} y={}", flip.x, flip.y)
            }
        }
    }
}

impl std::fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CapabilityHandle").field(&self.kind()).finish()
    }
}

/// Resolve the control object for a runtime `kind`.
///
/// # Errors
/// - `UnknownCapability` for kinds this build cannot dispatch (logged at warn level)
/// - otherwise as [`resolve`]
pub fn resolve_kind(hw: &HardwareInterface, kind: CapabilityKind) -> CapsResult<CapabilityHandle> {
    match kind {
        CapabilityKind::DetInfo => resolve::<dyn DetInfoCtrl>(hw).map(CapabilityHandle::DetInfo),
        CapabilityKind::Buffer => resolve::<dyn BufferCtrl>(hw).map(CapabilityHandle::Buffer),
        CapabilityKind::Sync => resolve::<dyn SyncCtrl>(hw).map(CapabilityHandle::Sync),
        CapabilityKind::Bin => resolve::<dyn BinCtrl>(hw).map(CapabilityHandle::Bin),
        CapabilityKind::Roi => resolve::<dyn RoiCtrl>(hw).map(CapabilityHandle::Roi),
        CapabilityKind::Flip => resolve::<dyn FlipCtrl>(hw).map(CapabilityHandle::Flip),
        CapabilityKind::Unrecognized(_) => {
            warn!(
                target: "detector_caps::dispatch",
                camera = hw.name(),
                %kind,
                "Capability kind not recognized by this dispatcher"
            );
            Err(CapsError::UnknownCapability(kind))
        }
    }
}

/// Resolve every capability the host lists, in listing order.
pub fn resolve_all(hw: &HardwareInterface) -> Vec<(CapabilityKind, CapsResult<CapabilityHandle>)> {
    hw.list_capabilities()
        .into_iter()
        .map(|kind| (kind, resolve_kind(hw, kind)))
        .collect()
}
