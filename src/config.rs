//! Camera configuration using Figment
//!
//! Describes a simulated camera: its sensor, timing limits and the set of
//! capabilities it registers. Configuration is loaded from:
//! 1. Built-in defaults
//! 2. A TOML file
//! 3. Environment variables (prefixed with `DETCAPS_`, `__` between levels)
//!
//! # Environment Variable Overrides
//!
//! ```text
//! DETCAPS_NAME=bench-cam
//! DETCAPS_SENSOR__WIDTH=1024
//! DETCAPS_BINNING__MAX_X=8
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::frame::{FrameDim, PixelType};
use crate::hardware::capabilities::{Bin, TrigMode, ValidRanges};
use crate::hardware::kind::CapabilityKind;

/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "DETCAPS_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Top-level camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera name, used as the host name in logs
    pub name: String,
    /// Detector model string
    pub model: String,
    /// Detector family
    pub detector_type: String,
    /// Capabilities the camera registers, in registration order
    pub capabilities: Vec<CapabilityKind>,
    /// Sensor geometry
    #[serde(default)]
    pub sensor: SensorConfig,
    /// Timing limits and trigger modes
    #[serde(default)]
    pub sync: SyncConfig,
    /// Binning limits
    #[serde(default)]
    pub binning: BinningConfig,
    /// Buffer memory budget
    #[serde(default)]
    pub buffer: BufferConfig,
}

/// Sensor geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sensor width in pixels
    #[serde(default = "default_sensor_size")]
    pub width: u32,
    /// Sensor height in pixels
    #[serde(default = "default_sensor_size")]
    pub height: u32,
    /// Native pixel encoding
    #[serde(default = "default_pixel_type")]
    pub pixel_type: PixelType,
    /// Pixel pitch (x, y) in micrometres
    #[serde(default = "default_pixel_size_um")]
    pub pixel_size_um: [f64; 2],
}

/// Timing limits, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Shortest exposure
    #[serde(default = "default_min_exposure")]
    pub min_exposure_s: f64,
    /// Longest exposure
    #[serde(default = "default_max_exposure")]
    pub max_exposure_s: f64,
    /// Shortest latency
    #[serde(default)]
    pub min_latency_s: f64,
    /// Longest latency
    #[serde(default = "default_max_latency")]
    pub max_latency_s: f64,
    /// Offered trigger modes; the first is the initial mode
    #[serde(default = "default_trigger_modes")]
    pub trigger_modes: Vec<TrigMode>,
}

/// Binning limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Largest horizontal factor
    #[serde(default = "default_max_bin")]
    pub max_x: u32,
    /// Largest vertical factor
    #[serde(default = "default_max_bin")]
    pub max_y: u32,
}

/// Frame buffer memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Memory shared by all frame buffers, in MiB
    #[serde(default = "default_max_memory_mb")]
    pub max_memory_mb: usize,
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_sensor_size() -> u32 {
    2048
}

fn default_pixel_type() -> PixelType {
    PixelType::Mono16
}

fn default_pixel_size_um() -> [f64; 2] {
    [6.5, 6.5]
}

fn default_min_exposure() -> f64 {
    1e-5
}

fn default_max_exposure() -> f64 {
    10.0
}

fn default_max_latency() -> f64 {
    1.0
}

fn default_trigger_modes() -> Vec<TrigMode> {
    vec![TrigMode::Internal, TrigMode::ExternalSingle]
}

fn default_max_bin() -> u32 {
    4
}

fn default_max_memory_mb() -> usize {
    512
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: "sim0".to_string(),
            model: "SimCam 2048".to_string(),
            detector_type: "Simulator".to_string(),
            capabilities: CapabilityKind::KNOWN.to_vec(),
            sensor: SensorConfig::default(),
            sync: SyncConfig::default(),
            binning: BinningConfig::default(),
            buffer: BufferConfig::default(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            width: default_sensor_size(),
            height: default_sensor_size(),
            pixel_type: default_pixel_type(),
            pixel_size_um: default_pixel_size_um(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_exposure_s: default_min_exposure(),
            max_exposure_s: default_max_exposure(),
            min_latency_s: 0.0,
            max_latency_s: default_max_latency(),
            trigger_modes: default_trigger_modes(),
        }
    }
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            max_x: default_max_bin(),
            max_y: default_max_bin(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: default_max_memory_mb(),
        }
    }
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl CameraConfig {
    /// Load configuration from a TOML file and environment variables
    ///
    /// Precedence (highest to lowest): environment, file, defaults. A
    /// missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if the sources cannot be parsed or validation fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::extract(Figment::new().merge(Toml::file(path.as_ref())))
    }

    /// Load configuration from defaults and environment variables only
    pub fn load_env() -> Result<Self, ConfigError> {
        Self::extract(Figment::new())
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::new().merge(Toml::string(toml)))
    }

    fn extract(sources: Figment) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(sources)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| ConfigError::LoadError(Box::new(err)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - Sensor size is non-zero
    /// - Exposure and latency ranges are finite, non-negative and ordered
    /// - At least one trigger mode is offered
    /// - Binning maxima are non-zero
    /// - Capabilities are known and listed once
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sensor_frame()
            .map_err(|err| ConfigError::ValidationError(format!("sensor: {err}")))?;

        let sync = &self.sync;
        for (label, min, max) in [
            ("exposure", sync.min_exposure_s, sync.max_exposure_s),
            ("latency", sync.min_latency_s, sync.max_latency_s),
        ] {
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                return Err(ConfigError::ValidationError(format!(
                    "invalid {label} range [{min}, {max}]"
                )));
            }
        }

        if sync.trigger_modes.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one trigger mode is required".to_string(),
            ));
        }

        Bin::new(self.binning.max_x, self.binning.max_y).map_err(|err| {
            ConfigError::ValidationError(format!("binning: {err}"))
        })?;

        let mut seen = HashSet::new();
        for kind in &self.capabilities {
            if !kind.is_known() {
                return Err(ConfigError::ValidationError(format!(
                    "capability {kind} is not supported by the simulator"
                )));
            }
            if !seen.insert(*kind) {
                return Err(ConfigError::ValidationError(format!(
                    "capability {kind} listed twice"
                )));
            }
        }

        Ok(())
    }

    /// Full-sensor frame descriptor.
    pub fn sensor_frame(&self) -> crate::error::CapsResult<FrameDim> {
        FrameDim::new(self.sensor.width, self.sensor.height, self.sensor.pixel_type)
    }

    /// Timing limits as reported by the Sync capability.
    pub fn valid_ranges(&self) -> ValidRanges {
        ValidRanges {
            min_exposure: self.sync.min_exposure_s,
            max_exposure: self.sync.max_exposure_s,
            min_latency: self.sync.min_latency_s,
            max_latency: self.sync.max_latency_s,
        }
    }

    /// Buffer memory budget in bytes.
    pub fn max_buffer_bytes(&self) -> usize {
        self.buffer.max_memory_mb.saturating_mul(1024 * 1024)
    }
}
