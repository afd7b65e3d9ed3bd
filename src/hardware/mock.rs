//! Mock Hardware Implementations
//!
//! Simulated control objects for every capability kind, plus [`MockCamera`]
//! which wires a configured subset of them into a [`HardwareInterface`].
//! They apply the shared policies from [`capabilities`](super::capabilities)
//! and serve as the reference for driver authors.
//!
//! # Available Mocks
//!
//! - `MockDetInfo` - fixed sensor description
//! - `MockBuffer` - bookkeeping-only buffer allocation with a memory budget
//! - `MockSync` - timing/trigger state validated against [`ValidRanges`]
//! - `MockBin` - binning with a per-axis maximum
//! - `MockRoi` - clipped region of interest
//! - `MockFlip` - mirror flags
//!
//! Busy-guarded mocks share the camera's [`AcquisitionFlag`].

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::CameraConfig;
use crate::error::{CapsError, CapsResult};
use crate::frame::FrameDim;
use crate::hardware::acquisition::AcquisitionFlag;
use crate::hardware::capabilities::{
    Bin, BinCtrl, BufferAllocation, BufferCtrl, DetInfoCtrl, Flip, FlipCtrl, Roi, RoiCtrl,
    SyncCtrl, TrigMode, ValidRanges,
};
use crate::hardware::interface::HardwareInterface;
use crate::hardware::kind::CapabilityKind;
use crate::limits::buffer_bytes;

// =============================================================================
// MockDetInfo
// =============================================================================

/// Fixed sensor description.
pub struct MockDetInfo {
    max_frame: FrameDim,
    detector_type: String,
    model: String,
    pixel_size: (f64, f64),
}

impl MockDetInfo {
    /// # Arguments
    /// * `pixel_size` - Pixel pitch (x, y) in metres
    pub fn new(
        max_frame: FrameDim,
        detector_type: impl Into<String>,
        model: impl Into<String>,
        pixel_size: (f64, f64),
    ) -> Self {
        Self {
            max_frame,
            detector_type: detector_type.into(),
            model: model.into(),
            pixel_size,
        }
    }
}

impl DetInfoCtrl for MockDetInfo {
    fn max_image_size(&self) -> FrameDim {
        self.max_frame
    }

    fn detector_type(&self) -> String {
        self.detector_type.clone()
    }

    fn detector_model(&self) -> String {
        self.model.clone()
    }

    fn pixel_size(&self) -> (f64, f64) {
        self.pixel_size
    }
}

// =============================================================================
// MockBuffer
// =============================================================================

/// Buffer bookkeeping against a fixed memory budget. No memory is reserved.
pub struct MockBuffer {
    max_bytes: usize,
    allocation: RwLock<Option<BufferAllocation>>,
    acquisition: AcquisitionFlag,
}

impl MockBuffer {
    /// Budget of `max_bytes` across all buffers.
    pub fn new(max_bytes: usize, acquisition: AcquisitionFlag) -> Self {
        Self {
            max_bytes,
            allocation: RwLock::new(None),
            acquisition,
        }
    }
}

impl BufferCtrl for MockBuffer {
    fn allocate(&self, frame_dim: FrameDim, nb_buffers: usize) -> CapsResult<BufferAllocation> {
        self.acquisition.ensure_idle("allocate buffers")?;

        let max = self.max_nb_buffers(&frame_dim)?;
        if nb_buffers == 0 || nb_buffers > max {
            return Err(CapsError::OutOfRange {
                parameter: "nb_buffers",
                value: nb_buffers as f64,
                min: 1.0,
                max: max as f64,
            });
        }

        let allocation = BufferAllocation {
            frame_dim,
            nb_buffers,
            total_bytes: buffer_bytes(frame_dim.mem_size()?, nb_buffers)?,
        };
        debug!(
            target: "detector_caps::mock",
            %frame_dim,
            nb_buffers,
            total_bytes = allocation.total_bytes,
            "Allocated frame buffers"
        );
        *self.allocation.write() = Some(allocation);
        Ok(allocation)
    }

    fn release(&self) -> CapsResult<()> {
        self.acquisition.ensure_idle("release buffers")?;
        if self.allocation.write().take().is_some() {
            debug!(target: "detector_caps::mock", "Released frame buffers");
        }
        Ok(())
    }

    fn allocation(&self) -> Option<BufferAllocation> {
        *self.allocation.read()
    }

    fn max_nb_buffers(&self, frame_dim: &FrameDim) -> CapsResult<usize> {
        Ok(self.max_bytes / frame_dim.mem_size()?)
    }
}

// =============================================================================
// MockSync
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct SyncState {
    trigger_mode: TrigMode,
    exposure: f64,
    latency: f64,
    nb_frames: u32,
}

/// Timing and trigger state.
pub struct MockSync {
    ranges: ValidRanges,
    trigger_modes: Vec<TrigMode>,
    state: RwLock<SyncState>,
    acquisition: AcquisitionFlag,
}

impl MockSync {
    /// Starts in the first offered trigger mode, with the exposure clamped
    /// to 0.1 s and the minimum latency.
    ///
    /// # Errors
    /// `OutOfRange` if `ranges` is not finite, negative or inverted.
    pub fn new(
        ranges: ValidRanges,
        trigger_modes: Vec<TrigMode>,
        acquisition: AcquisitionFlag,
    ) -> CapsResult<Self> {
        ranges.validate()?;
        let state = SyncState {
            trigger_mode: trigger_modes.first().copied().unwrap_or(TrigMode::Internal),
            exposure: 0.1_f64.clamp(ranges.min_exposure, ranges.max_exposure),
            latency: ranges.min_latency,
            nb_frames: 1,
        };
        Ok(Self {
            ranges,
            trigger_modes,
            state: RwLock::new(state),
            acquisition,
        })
    }
}

impl SyncCtrl for MockSync {
    fn trigger_modes(&self) -> Vec<TrigMode> {
        self.trigger_modes.clone()
    }

    fn set_trigger_mode(&self, mode: TrigMode) -> CapsResult<()> {
        self.acquisition.ensure_idle("change trigger mode")?;
        if !self.supports_trigger_mode(mode) {
            return Err(CapsError::InvalidTriggerMode(mode));
        }
        self.state.write().trigger_mode = mode;
        trace!(target: "detector_caps::mock", ?mode, "Trigger mode set");
        Ok(())
    }

    fn trigger_mode(&self) -> TrigMode {
        self.state.read().trigger_mode
    }

    fn set_exposure_time(&self, seconds: f64) -> CapsResult<()> {
        self.ranges.check_exposure(seconds)?;
        self.state.write().exposure = seconds;
        trace!(target: "detector_caps::mock", seconds, "Exposure set");
        Ok(())
    }

    fn exposure_time(&self) -> f64 {
        self.state.read().exposure
    }

    fn set_latency_time(&self, seconds: f64) -> CapsResult<()> {
        self.ranges.check_latency(seconds)?;
        self.state.write().latency = seconds;
        trace!(target: "detector_caps::mock", seconds, "Latency set");
        Ok(())
    }

    fn latency_time(&self) -> f64 {
        self.state.read().latency
    }

    fn set_nb_frames(&self, nb_frames: u32) -> CapsResult<()> {
        self.acquisition.ensure_idle("change frame count")?;
        self.state.write().nb_frames = nb_frames;
        Ok(())
    }

    fn nb_frames(&self) -> u32 {
        self.state.read().nb_frames
    }

    fn valid_ranges(&self) -> ValidRanges {
        self.ranges
    }
}

// =============================================================================
// MockBin
// =============================================================================

/// Binning with a per-axis maximum.
pub struct MockBin {
    max: Bin,
    current: RwLock<Bin>,
    acquisition: AcquisitionFlag,
}

impl MockBin {
    /// Starts unbinned.
    pub fn new(max: Bin, acquisition: AcquisitionFlag) -> Self {
        Self {
            max,
            current: RwLock::new(Bin::ONE),
            acquisition,
        }
    }
}

impl BinCtrl for MockBin {
    fn set_bin(&self, bin: Bin) -> CapsResult<()> {
        self.acquisition.ensure_idle("change binning")?;
        bin.check_within(self.max)?;
        *self.current.write() = bin;
        debug!(target: "detector_caps::mock", %bin, "Binning set");
        Ok(())
    }

    fn bin(&self) -> Bin {
        *self.current.read()
    }

    fn max_bin(&self) -> Bin {
        self.max
    }
}

// =============================================================================
// MockRoi
// =============================================================================

/// Region of interest, initially the full sensor.
pub struct MockRoi {
    bounds: FrameDim,
    current: RwLock<Roi>,
}

impl MockRoi {
    /// Region control over `bounds`.
    pub fn new(bounds: FrameDim) -> Self {
        Self {
            bounds,
            current: RwLock::new(Roi::full(&bounds)),
        }
    }
}

impl RoiCtrl for MockRoi {
    fn set_roi(&self, roi: Roi) -> CapsResult<Roi> {
        let applied = self.check_roi(roi)?;
        if applied != roi {
            debug!(target: "detector_caps::mock", requested = %roi, %applied, "ROI clipped");
        }
        *self.current.write() = applied;
        Ok(applied)
    }

    fn roi(&self) -> Roi {
        *self.current.read()
    }

    fn bounds(&self) -> FrameDim {
        self.bounds
    }
}

// =============================================================================
// MockFlip
// =============================================================================

/// Mirror flags, initially off.
#[derive(Default)]
pub struct MockFlip {
    current: RwLock<Flip>,
}

impl MockFlip {
    /// Flags start cleared.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlipCtrl for MockFlip {
    fn set_flip(&self, flip: Flip) -> CapsResult<()> {
        *self.current.write() = flip;
        Ok(())
    }

    fn flip(&self) -> Flip {
        *self.current.read()
    }
}

// =============================================================================
// MockCamera
// =============================================================================

/// Simulated camera owning its control objects and capability host.
///
/// # Example
///
/// ```no_run
/// use detector_caps::prelude::*;
///
/// # fn main() -> CapsResult<()> {
/// let camera = MockCamera::new(&CameraConfig::default())?;
/// let bin = resolve::<dyn BinCtrl>(camera.interface())?;
/// bin.set_bin(Bin::new(2, 2)?)?;
/// # Ok(())
/// # }
/// ```
pub struct MockCamera {
    acquisition: AcquisitionFlag,
    interface: HardwareInterface,
}

impl MockCamera {
    /// Build the control objects listed in `config.capabilities` and register
    /// them in that order.
    ///
    /// # Errors
    /// `InvalidGeometry` for a zero sensor size, `OutOfRange` for inconsistent
    /// timing or binning limits, `UnknownCapability` for a kind the simulator
    /// cannot provide.
    pub fn new(config: &CameraConfig) -> CapsResult<Self> {
        let sensor = config.sensor_frame()?;
        let acquisition = AcquisitionFlag::new();
        let mut interface = HardwareInterface::new(config.name.as_str());

        for kind in &config.capabilities {
            match kind {
                CapabilityKind::DetInfo => {
                    let [px, py] = config.sensor.pixel_size_um;
                    interface.register::<dyn DetInfoCtrl>(Arc::new(MockDetInfo::new(
                        sensor,
                        config.detector_type.as_str(),
                        config.model.as_str(),
                        (px * 1e-6, py * 1e-6),
                    )));
                }
                CapabilityKind::Buffer => {
                    interface.register::<dyn BufferCtrl>(Arc::new(MockBuffer::new(
                        config.max_buffer_bytes(),
                        acquisition.clone(),
                    )));
                }
                CapabilityKind::Sync => {
                    interface.register::<dyn SyncCtrl>(Arc::new(MockSync::new(
                        config.valid_ranges(),
                        config.sync.trigger_modes.clone(),
                        acquisition.clone(),
                    )?));
                }
                CapabilityKind::Bin => {
                    let max = Bin::new(config.binning.max_x, config.binning.max_y)?;
                    interface
                        .register::<dyn BinCtrl>(Arc::new(MockBin::new(max, acquisition.clone())));
                }
                CapabilityKind::Roi => {
                    interface.register::<dyn RoiCtrl>(Arc::new(MockRoi::new(sensor)));
                }
                CapabilityKind::Flip => {
                    interface.register::<dyn FlipCtrl>(Arc::new(MockFlip::new()));
                }
                CapabilityKind::Unrecognized(_) => {
                    return Err(CapsError::UnknownCapability(*kind));
                }
            }
        }

        debug!(
            target: "detector_caps::mock",
            camera = %config.name,
            capabilities = interface.len(),
            "Mock camera ready"
        );
        Ok(Self {
            acquisition,
            interface,
        })
    }

    /// Capability host, frozen for shared use.
    pub fn interface(&self) -> &HardwareInterface {
        &self.interface
    }

    /// Mutable host access, for adding or replacing capabilities during setup.
    pub fn interface_mut(&mut self) -> &mut HardwareInterface {
        &mut self.interface
    }

    /// Mark acquisition active; busy-guarded setters now fail.
    pub fn start_acquisition(&self) {
        self.acquisition.set_active(true);
        debug!(target: "detector_caps::mock", camera = self.interface.name(), "Acquisition started");
    }

    /// Mark acquisition idle.
    pub fn stop_acquisition(&self) {
        self.acquisition.set_active(false);
        debug!(target: "detector_caps::mock", camera = self.interface.name(), "Acquisition stopped");
    }

    /// True between `start_acquisition` and `stop_acquisition`.
    pub fn is_acquiring(&self) -> bool {
        self.acquisition.is_active()
    }
}
