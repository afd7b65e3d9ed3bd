//! Per-camera capability host.
//!
//! [`HardwareInterface`] files at most one [`ControlObject`] per
//! [`CapabilityKind`] and answers presence and lookup queries. It stores
//! objects type-erased and knows nothing about the individual control traits;
//! recovering a typed handle is the dispatcher's job.
//!
//! # Setup then freeze
//!
//! Registration takes `&mut self`, lookups take `&self`. Once the host is
//! shared between threads (typically behind an `Arc`), no further
//! registration is possible without explicit locking added by the caller.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CapsError, CapsResult};
use crate::hardware::dispatch::CapabilityInterface;
use crate::hardware::kind::CapabilityKind;

/// Type-erased, shared reference to a control object.
///
/// The wrapped value is the handle itself (`Arc<T>`, where `T` is usually a
/// `dyn` control trait), so recovery is a checked downcast back to exactly
/// that handle type.
#[derive(Clone)]
pub struct ControlObject {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ControlObject {
    /// Erase `object`.
    ///
    /// Erase as the control trait, not the concrete driver type:
    /// `ControlObject::new::<dyn RoiCtrl>(roi)`. An object erased as its
    /// concrete type will not be recovered as the trait.
    pub fn new<T>(object: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(object),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the type this object was erased as.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Checked recovery of the handle erased by [`new`](Self::new).
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for ControlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlObject")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A (kind, control object) pair as filed on a host.
#[derive(Debug, Clone)]
pub struct CapabilityRecord {
    kind: CapabilityKind,
    object: ControlObject,
}

impl CapabilityRecord {
    /// Pair `object` with `kind`.
    pub fn new(kind: CapabilityKind, object: ControlObject) -> Self {
        Self { kind, object }
    }

    /// Kind the object is filed under.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// The erased control object.
    pub fn control_object(&self) -> &ControlObject {
        &self.object
    }
}

/// Capability host for one camera.
#[derive(Debug, Default)]
pub struct HardwareInterface {
    name: String,
    records: Vec<CapabilityRecord>,
    index: HashMap<CapabilityKind, usize>,
}

impl HardwareInterface {
    /// Empty host for the camera called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Camera name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered kinds, in first-registration order.
    pub fn list_capabilities(&self) -> Vec<CapabilityKind> {
        self.records.iter().map(CapabilityRecord::kind).collect()
    }

    /// True if a record exists for `kind`.
    pub fn has_capability(&self, kind: CapabilityKind) -> bool {
        self.index.contains_key(&kind)
    }

    /// Control object filed under `kind`.
    ///
    /// # Errors
    /// `NotSupported` if nothing is registered for `kind`.
    pub fn get_control_object(&self, kind: CapabilityKind) -> CapsResult<&ControlObject> {
        self.index
            .get(&kind)
            .map(|&slot| &self.records[slot].object)
            .ok_or(CapsError::NotSupported(kind))
    }

    /// File `object` under `kind`, replacing any previous record.
    ///
    /// A replaced record keeps its position in [`list_capabilities`](Self::list_capabilities).
    /// Returns the replaced object.
    pub fn register_capability(
        &mut self,
        kind: CapabilityKind,
        object: ControlObject,
    ) -> Option<ControlObject> {
        match self.index.get(&kind) {
            Some(&slot) => {
                let previous = std::mem::replace(&mut self.records[slot].object, object);
                debug!(
                    target: "detector_caps::host",
                    camera = %self.name,
                    %kind,
                    previous = previous.type_name(),
                    current = self.records[slot].object.type_name(),
                    "Replaced capability"
                );
                Some(previous)
            }
            None => {
                debug!(
                    target: "detector_caps::host",
                    camera = %self.name,
                    %kind,
                    object = object.type_name(),
                    "Registered capability"
                );
                self.index.insert(kind, self.records.len());
                self.records.push(CapabilityRecord::new(kind, object));
                None
            }
        }
    }

    /// Register `object` under its interface's own kind.
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use detector_caps::hardware::mock::MockFlip;
    /// use detector_caps::prelude::*;
    ///
    /// let mut hw = HardwareInterface::new("cam");
    /// hw.register::<dyn FlipCtrl>(Arc::new(MockFlip::new()));
    /// ```
    pub fn register<C>(&mut self, object: Arc<C>) -> Option<ControlObject>
    where
        C: CapabilityInterface + ?Sized,
    {
        self.register_capability(C::KIND, ControlObject::new(object))
    }

    /// Remove the record for `kind`.
    pub fn unregister_capability(&mut self, kind: CapabilityKind) -> Option<CapabilityRecord> {
        let slot = self.index.remove(&kind)?;
        let record = self.records.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        debug!(
            target: "detector_caps::host",
            camera = %self.name,
            %kind,
            "Unregistered capability"
        );
        Some(record)
    }

    /// Records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &CapabilityRecord> {
        self.records.iter()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
