//! Common test utilities for detector-caps integration tests
//!
//! This module provides reusable helpers for:
//! - Building cameras with a chosen capability subset
//! - Stand-in control objects for registration edge cases

#![allow(dead_code)] // Utilities may not all be used by every test binary

use std::sync::Arc;

use detector_caps::prelude::*;

/// Mock camera registering exactly `kinds`, in that order.
pub fn camera_with(kinds: &[CapabilityKind]) -> MockCamera {
    let config = CameraConfig {
        capabilities: kinds.to_vec(),
        ..CameraConfig::default()
    };
    MockCamera::new(&config).expect("mock camera config is valid")
}

/// Flip control that records a fixed identifier, to tell objects apart.
pub struct TaggedFlip {
    pub tag: u32,
    flip: parking_lot::RwLock<Flip>,
}

impl TaggedFlip {
    pub fn new(tag: u32) -> Arc<Self> {
        Arc::new(Self {
            tag,
            flip: parking_lot::RwLock::new(Flip::NONE),
        })
    }
}

impl FlipCtrl for TaggedFlip {
    fn set_flip(&self, flip: Flip) -> CapsResult<()> {
        *self.flip.write() = flip;
        Ok(())
    }

    fn flip(&self) -> Flip {
        *self.flip.read()
    }
}
