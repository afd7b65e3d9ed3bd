//! Control-object interfaces, one per capability kind.
//!
//! A camera implements only the traits for features it actually has and
//! registers each object on its [`HardwareInterface`](super::HardwareInterface).
//! Generic code never sees the concrete types; it recovers these traits
//! through the dispatcher.
//!
//! # Design Philosophy
//!
//! Each control-object trait:
//! - Is synchronous and non-blocking from the caller's point of view
//! - Is thread-safe (requires Send + Sync, takes `&self`)
//! - Uses [`CapsResult`] for errors
//! - Owns its own state through interior mutability
//!
//! Shared policies (ROI clipping, binning clamping, timing range checks) are
//! provided as default methods or on the value types so every driver applies
//! them the same way.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CapsError, CapsResult};
use crate::frame::FrameDim;

// =============================================================================
// Value types
// =============================================================================

/// Hardware binning factors.
///
/// Both factors are always positive; deserialization goes through [`Bin::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BinFactors")]
pub struct Bin {
    x: u32,
    y: u32,
}

#[derive(Deserialize)]
struct BinFactors {
    x: u32,
    y: u32,
}

impl TryFrom<BinFactors> for Bin {
    type Error = CapsError;

    fn try_from(factors: BinFactors) -> CapsResult<Self> {
        Bin::new(factors.x, factors.y)
    }
}

impl Bin {
    /// No binning.
    pub const ONE: Bin = Bin { x: 1, y: 1 };

    /// # Errors
    /// `OutOfRange` if either factor is zero.
    pub fn new(x: u32, y: u32) -> CapsResult<Self> {
        check_factor("bin_x", x, u32::MAX)?;
        check_factor("bin_y", y, u32::MAX)?;
        Ok(Self { x, y })
    }

    /// Horizontal factor.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Vertical factor.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Check both factors against a per-axis maximum.
    ///
    /// # Errors
    /// `OutOfRange` naming `bin_x` or `bin_y` if a factor is zero or above `max`.
    pub fn check_within(&self, max: Bin) -> CapsResult<()> {
        check_factor("bin_x", self.x, max.x)?;
        check_factor("bin_y", self.y, max.y)
    }
}

fn check_factor(parameter: &'static str, value: u32, max: u32) -> CapsResult<()> {
    if value == 0 || value > max {
        return Err(CapsError::OutOfRange {
            parameter,
            value: f64::from(value),
            min: 1.0,
            max: f64::from(max),
        });
    }
    Ok(())
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Region of interest in sensor pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roi {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Roi {
    /// Region with origin (`x`, `y`) and the given extent. Not validated.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole-sensor region for `frame`.
    pub fn full(frame: &FrameDim) -> Self {
        frame.bounds()
    }

    /// Left edge.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Top edge.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True if either extent is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip this region to `frame`.
    ///
    /// A region that overlaps the frame is shrunk to the overlapping part.
    ///
    /// # Errors
    /// `InvalidRegion` if the region is empty or has no overlap with the frame.
    pub fn clip_to(&self, frame: &FrameDim) -> CapsResult<Roi> {
        if self.is_empty() || self.x >= frame.width() || self.y >= frame.height() {
            return Err(CapsError::InvalidRegion {
                roi: *self,
                bounds: frame.bounds(),
            });
        }
        Ok(Roi {
            x: self.x,
            y: self.y,
            width: self.width.min(frame.width() - self.x),
            height: self.height.min(frame.height() - self.y),
        })
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Mirror flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flip {
    /// Mirror along the horizontal axis (left/right).
    pub x: bool,
    /// Mirror along the vertical axis (top/bottom).
    pub y: bool,
}

impl Flip {
    /// No mirroring.
    pub const NONE: Flip = Flip { x: false, y: false };

    /// Flags for each axis.
    pub fn new(x: bool, y: bool) -> Self {
        Self { x, y }
    }
}

/// Trigger mode for frame acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrigMode {
    /// Internal trigger, one start for the whole sequence
    Internal,
    /// Internal trigger, one software start per frame
    InternalMulti,
    /// One external trigger starts the whole sequence
    ExternalSingle,
    /// One external trigger per frame
    ExternalMulti,
    /// External gate defines each exposure
    ExternalGate,
    /// External start/stop pulses define each exposure
    ExternalStartStop,
}

/// Timing limits reported by a Sync control object, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRanges {
    /// Shortest exposure.
    pub min_exposure: f64,
    /// Longest exposure.
    pub max_exposure: f64,
    /// Shortest latency between frames.
    pub min_latency: f64,
    /// Longest latency between frames.
    pub max_latency: f64,
}

impl ValidRanges {
    /// Check that both ranges are finite, non-negative and ordered.
    ///
    /// # Errors
    /// `OutOfRange` naming `exposure_time` or `latency_time`, carrying the
    /// offending lower bound.
    pub fn validate(&self) -> CapsResult<()> {
        check_bounds("exposure_time", self.min_exposure, self.max_exposure)?;
        check_bounds("latency_time", self.min_latency, self.max_latency)
    }

    /// # Errors
    /// `OutOfRange` if `seconds` is not finite or lies outside the exposure range.
    pub fn check_exposure(&self, seconds: f64) -> CapsResult<()> {
        check_range("exposure_time", seconds, self.min_exposure, self.max_exposure)
    }

    /// # Errors
    /// `OutOfRange` if `seconds` is not finite or lies outside the latency range.
    pub fn check_latency(&self, seconds: f64) -> CapsResult<()> {
        check_range("latency_time", seconds, self.min_latency, self.max_latency)
    }
}

fn check_bounds(parameter: &'static str, min: f64, max: f64) -> CapsResult<()> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(CapsError::OutOfRange {
            parameter,
            value: min,
            min: 0.0,
            max,
        });
    }
    Ok(())
}

fn check_range(parameter: &'static str, value: f64, min: f64, max: f64) -> CapsResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(CapsError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Current frame-buffer allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferAllocation {
    /// Shape of each buffer.
    pub frame_dim: FrameDim,
    /// Number of frame buffers.
    pub nb_buffers: usize,
    /// Total bytes held.
    pub total_bytes: usize,
}

// =============================================================================
// Control-object traits
// =============================================================================

/// Capability: Detector Information
///
/// Read-only sensor description.
pub trait DetInfoCtrl: Send + Sync {
    /// Full-sensor frame at the native pixel type.
    fn max_image_size(&self) -> FrameDim;

    /// Detector family (e.g. "Simulator", "sCMOS").
    fn detector_type(&self) -> String;

    /// Detector model string.
    fn detector_model(&self) -> String;

    /// Physical pixel pitch (x, y) in metres.
    fn pixel_size(&self) -> (f64, f64);
}

/// Capability: Frame Buffer Management
///
/// # Contract
/// - Buffers are sized from a [`FrameDim`]
/// - At most one allocation is live; `allocate` replaces it
/// - Allocating or releasing while acquiring fails with `BusyState`
pub trait BufferCtrl: Send + Sync {
    /// Allocate `nb_buffers` frames of shape `frame_dim`.
    ///
    /// # Errors
    /// - `OutOfRange` if `nb_buffers` is 0 or exceeds [`max_nb_buffers`](Self::max_nb_buffers)
    /// - `BusyState` while acquiring
    /// - sizing errors from the frame limits
    fn allocate(&self, frame_dim: FrameDim, nb_buffers: usize) -> CapsResult<BufferAllocation>;

    /// Release the current allocation, if any.
    fn release(&self) -> CapsResult<()>;

    /// Current allocation.
    fn allocation(&self) -> Option<BufferAllocation>;

    /// How many frames of shape `frame_dim` fit in the buffer memory.
    fn max_nb_buffers(&self, frame_dim: &FrameDim) -> CapsResult<usize>;
}

/// Capability: Synchronization / Timing
///
/// # Contract
/// - Times are in seconds
/// - Exposure and latency are validated against [`valid_ranges`](Self::valid_ranges)
///   and may change during acquisition
/// - Trigger mode and frame count fail with `BusyState` while acquiring
pub trait SyncCtrl: Send + Sync {
    /// Trigger modes this hardware offers.
    fn trigger_modes(&self) -> Vec<TrigMode>;

    /// # Errors
    /// `BusyState` while acquiring, `InvalidTriggerMode` if not offered.
    fn set_trigger_mode(&self, mode: TrigMode) -> CapsResult<()>;

    /// Current trigger mode.
    fn trigger_mode(&self) -> TrigMode;

    /// # Errors
    /// `OutOfRange` outside the exposure range.
    fn set_exposure_time(&self, seconds: f64) -> CapsResult<()>;

    /// Current exposure, in seconds.
    fn exposure_time(&self) -> f64;

    /// # Errors
    /// `OutOfRange` outside the latency range.
    fn set_latency_time(&self, seconds: f64) -> CapsResult<()>;

    /// Current latency, in seconds.
    fn latency_time(&self) -> f64;

    /// Frames per acquisition; 0 means free-running.
    fn set_nb_frames(&self, nb_frames: u32) -> CapsResult<()>;

    /// Current frame count.
    fn nb_frames(&self) -> u32;

    /// Timing limits for exposure and latency.
    fn valid_ranges(&self) -> ValidRanges;

    /// True if `mode` is in [`trigger_modes`](Self::trigger_modes).
    fn supports_trigger_mode(&self, mode: TrigMode) -> bool {
        self.trigger_modes().contains(&mode)
    }
}

/// Capability: Hardware Binning
///
/// # Contract
/// - Factors are positive and at most [`max_bin`](Self::max_bin) per axis
/// - `set_bin` fails with `BusyState` while acquiring
/// - A successful `set_bin` is visible to the next `bin`
pub trait BinCtrl: Send + Sync {
    /// # Errors
    /// `BusyState` while acquiring, `OutOfRange` above [`max_bin`](Self::max_bin).
    fn set_bin(&self, bin: Bin) -> CapsResult<()>;

    /// Current factors.
    fn bin(&self) -> Bin;

    /// Largest factors per axis.
    fn max_bin(&self) -> Bin;

    /// Nearest binning the hardware supports.
    ///
    /// # Default Implementation
    /// Clamps each factor to [`max_bin`](Self::max_bin).
    fn check_bin(&self, bin: Bin) -> Bin {
        let max = self.max_bin();
        Bin {
            x: bin.x.min(max.x),
            y: bin.y.min(max.y),
        }
    }
}

/// Capability: Region of Interest
///
/// # Contract
/// - Requests are clipped to [`bounds`](Self::bounds), never blocked by an
///   active acquisition
/// - A request with no overlap fails with `InvalidRegion`
pub trait RoiCtrl: Send + Sync {
    /// Apply `roi` (clipped) and return the region actually set.
    fn set_roi(&self, roi: Roi) -> CapsResult<Roi>;

    /// Region currently applied.
    fn roi(&self) -> Roi;

    /// Sensor frame the region is expressed in.
    fn bounds(&self) -> FrameDim;

    /// Region that [`set_roi`](Self::set_roi) would apply.
    ///
    /// # Default Implementation
    /// [`Roi::clip_to`] against [`bounds`](Self::bounds).
    fn check_roi(&self, roi: Roi) -> CapsResult<Roi> {
        roi.clip_to(&self.bounds())
    }
}

/// Capability: Image Flip
pub trait FlipCtrl: Send + Sync {
    /// Apply mirror flags.
    fn set_flip(&self, flip: Flip) -> CapsResult<()>;

    /// Current mirror flags.
    fn flip(&self) -> Flip;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelType;

    fn sensor() -> FrameDim {
        FrameDim::new(100, 80, PixelType::Mono16).unwrap()
    }

    #[test]
    fn roi_inside_bounds_is_unchanged() {
        let roi = Roi::new(10, 10, 20, 30);
        assert_eq!(roi.clip_to(&sensor()).unwrap(), roi);
    }

    #[test]
    fn roi_partially_outside_is_clipped() {
        let clipped = Roi::new(90, 70, 50, 50).clip_to(&sensor()).unwrap();
        assert_eq!(clipped, Roi::new(90, 70, 10, 10));
        assert!(sensor().contains(&clipped));
    }

    #[test]
    fn roi_with_huge_extent_is_clipped_without_overflow() {
        let clipped = Roi::new(5, 5, u32::MAX, u32::MAX).clip_to(&sensor()).unwrap();
        assert_eq!(clipped, Roi::new(5, 5, 95, 75));
    }

    #[test]
    fn roi_entirely_outside_is_rejected() {
        let err = Roi::new(100, 0, 10, 10).clip_to(&sensor()).unwrap_err();
        assert!(matches!(err, CapsError::InvalidRegion { .. }));
        assert!(Roi::new(0, 500, 10, 10).clip_to(&sensor()).is_err());
    }

    #[test]
    fn empty_roi_is_rejected() {
        assert!(matches!(
            Roi::new(0, 0, 0, 10).clip_to(&sensor()),
            Err(CapsError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn bin_rejects_zero_factor() {
        assert!(matches!(
            Bin::new(0, 2),
            Err(CapsError::OutOfRange {
                parameter: "bin_x",
                ..
            })
        ));
        assert!(Bin::new(2, 0).is_err());
        assert_eq!(Bin::new(2, 4).unwrap().to_string(), "2x4");
    }

    #[test]
    fn bin_deserialization_rejects_zero_factor() {
        assert!(serde_json::from_str::<Bin>(r#"{"x":0,"y":1}"#).is_err());
        assert!(serde_json::from_str::<Bin>(r#"{"x":3,"y":0}"#).is_err());
        let bin: Bin = serde_json::from_str(r#"{"x":2,"y":4}"#).unwrap();
        assert_eq!(bin, Bin::new(2, 4).unwrap());
    }

    #[test]
    fn bin_check_within_maximum() {
        let max = Bin::new(4, 2).unwrap();
        assert!(Bin::new(4, 2).unwrap().check_within(max).is_ok());
        assert!(matches!(
            Bin::new(1, 3).unwrap().check_within(max),
            Err(CapsError::OutOfRange {
                parameter: "bin_y",
                ..
            })
        ));
    }

    #[test]
    fn inconsistent_timing_limits_are_rejected() {
        let good = ValidRanges {
            min_exposure: 1e-3,
            max_exposure: 1.0,
            min_latency: 0.0,
            max_latency: 0.5,
        };
        assert!(good.validate().is_ok());

        let inverted = ValidRanges {
            min_exposure: 2.0,
            max_exposure: 1.0,
            ..good
        };
        assert!(matches!(
            inverted.validate(),
            Err(CapsError::OutOfRange {
                parameter: "exposure_time",
                ..
            })
        ));

        let nan_latency = ValidRanges {
            max_latency: f64::NAN,
            ..good
        };
        assert!(matches!(
            nan_latency.validate(),
            Err(CapsError::OutOfRange {
                parameter: "latency_time",
                ..
            })
        ));
    }

    #[test]
    fn exposure_range_checks() {
        let ranges = ValidRanges {
            min_exposure: 1e-3,
            max_exposure: 1.0,
            min_latency: 0.0,
            max_latency: 0.5,
        };
        assert!(ranges.check_exposure(0.5).is_ok());
        assert!(ranges.check_exposure(1e-4).is_err());
        assert!(ranges.check_exposure(f64::NAN).is_err());
        assert!(ranges.check_latency(0.0).is_ok());
        assert!(ranges.check_latency(0.6).is_err());
    }
}
