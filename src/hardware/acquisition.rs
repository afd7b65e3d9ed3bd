//! Shared acquisition-active flag.
//!
//! A camera hands one clone of its flag to every control object that has a
//! busy policy. The acquisition engine (outside this crate) flips it; the
//! control objects only read it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CapsError, CapsResult};

/// Cloneable handle to a single acquisition-active bit.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionFlag {
    active: Arc<AtomicBool>,
}

impl AcquisitionFlag {
    /// New flag, initially idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set by the acquisition engine on start and stop.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// True while an acquisition is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fail with `BusyState` if an acquisition is running.
    ///
    /// `action` names the refused operation in the error message.
    pub fn ensure_idle(&self, action: &'static str) -> CapsResult<()> {
        if self.is_active() {
            return Err(CapsError::BusyState(action));
        }
        Ok(())
    }
}
