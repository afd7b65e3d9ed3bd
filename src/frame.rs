//! Frame geometry and pixel encoding.
//!
//! [`FrameDim`] is the shape descriptor shared by the detector-info and
//! buffer capabilities. Its byte depth is never stored: every call to
//! [`FrameDim::depth`] computes it from the pixel type through the fixed
//! bits-per-pixel table on [`PixelType`], so type and depth cannot drift
//! apart.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CapsError, CapsResult};
use crate::hardware::capabilities::{Bin, Roi};
use crate::limits::{validate_frame_size, FrameSize};

/// Pixel encoding enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    /// 8-bit monochrome
    Mono8,
    /// 10-bit monochrome (unpacked)
    Mono10,
    /// 12-bit monochrome (unpacked)
    Mono12,
    /// 14-bit monochrome (unpacked)
    Mono14,
    /// 16-bit monochrome
    Mono16,
    /// 32-bit monochrome (integer)
    Mono32,
    /// 32-bit floating point
    Float32,
    /// Bayer RGB (8-bit)
    Bayer8,
    /// Bayer RGB (16-bit)
    Bayer16,
    /// Packed RGB, 8 bits per channel
    Rgb24,
    /// Packed RGBA, 8 bits per channel
    Rgba32,
}

impl PixelType {
    /// Every pixel type, in table order.
    pub const ALL: [PixelType; 11] = [
        PixelType::Mono8,
        PixelType::Mono10,
        PixelType::Mono12,
        PixelType::Mono14,
        PixelType::Mono16,
        PixelType::Mono32,
        PixelType::Float32,
        PixelType::Bayer8,
        PixelType::Bayer16,
        PixelType::Rgb24,
        PixelType::Rgba32,
    ];

    /// Significant bits per pixel.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelType::Mono8 | PixelType::Bayer8 => 8,
            PixelType::Mono10 => 10,
            PixelType::Mono12 => 12,
            PixelType::Mono14 => 14,
            PixelType::Mono16 | PixelType::Bayer16 => 16,
            PixelType::Rgb24 => 24,
            PixelType::Mono32 | PixelType::Float32 | PixelType::Rgba32 => 32,
        }
    }

    /// Storage bytes per pixel (bits rounded up to whole bytes).
    pub const fn bytes_per_pixel(self) -> u32 {
        self.bits_per_pixel().div_ceil(8)
    }

    /// Short name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelType::Mono8 => "Mono8",
            PixelType::Mono10 => "Mono10",
            PixelType::Mono12 => "Mono12",
            PixelType::Mono14 => "Mono14",
            PixelType::Mono16 => "Mono16",
            PixelType::Mono32 => "Mono32",
            PixelType::Float32 => "Float32",
            PixelType::Bayer8 => "Bayer8",
            PixelType::Bayer16 => "Bayer16",
            PixelType::Rgb24 => "Rgb24",
            PixelType::Rgba32 => "Rgba32",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable frame geometry: width, height and pixel encoding.
///
/// There is no `Default`; a `FrameDim` always describes a fully specified,
/// non-empty frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameDim {
    width: u32,
    height: u32,
    pixel_type: PixelType,
}

impl FrameDim {
    /// Build a frame descriptor.
    ///
    /// # Errors
    /// `InvalidGeometry` if `width` or `height` is zero.
    pub fn new(width: u32, height: u32, pixel_type: PixelType) -> CapsResult<Self> {
        if width == 0 || height == 0 {
            return Err(CapsError::InvalidGeometry { width, height });
        }
        Ok(Self {
            width,
            height,
            pixel_type,
        })
    }

    /// Bits per pixel for `pixel_type`, without an instance.
    pub const fn bits_per_pixel_of(pixel_type: PixelType) -> u32 {
        pixel_type.bits_per_pixel()
    }

    /// Bytes per pixel for `pixel_type`, without an instance.
    pub const fn bytes_per_pixel_of(pixel_type: PixelType) -> u32 {
        pixel_type.bytes_per_pixel()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel encoding.
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Bytes per pixel, derived from the pixel type.
    pub fn depth(&self) -> u32 {
        Self::bytes_per_pixel_of(self.pixel_type)
    }

    /// Significant bits per pixel.
    pub fn bits_per_pixel(&self) -> u32 {
        Self::bits_per_pixel_of(self.pixel_type)
    }

    /// Pixel and byte counts for one frame, checked against the hard limits.
    pub fn frame_size(&self) -> CapsResult<FrameSize> {
        validate_frame_size(self.width, self.height, self.depth() as usize)
    }

    /// Pixels in one frame.
    pub fn pixel_count(&self) -> CapsResult<usize> {
        Ok(self.frame_size()?.pixels)
    }

    /// Bytes needed to store one frame.
    pub fn mem_size(&self) -> CapsResult<usize> {
        Ok(self.frame_size()?.bytes)
    }

    /// Same pixel type, different geometry.
    pub fn with_size(&self, width: u32, height: u32) -> CapsResult<Self> {
        Self::new(width, height, self.pixel_type)
    }

    /// Geometry after hardware binning.
    ///
    /// # Errors
    /// `InvalidGeometry` if a binning factor exceeds the matching dimension.
    pub fn binned(&self, bin: Bin) -> CapsResult<Self> {
        self.with_size(self.width / bin.x(), self.height / bin.y())
    }

    /// Full-frame rectangle anchored at the origin.
    pub fn bounds(&self) -> Roi {
        Roi::new(0, 0, self.width, self.height)
    }

    /// True if `roi` lies fully inside this frame.
    pub fn contains(&self, roi: &Roi) -> bool {
        roi.x()
            .checked_add(roi.width())
            .is_some_and(|right| right <= self.width)
            && roi
                .y()
                .checked_add(roi.height())
                .is_some_and(|bottom| bottom <= self.height)
    }
}

impl fmt::Display for FrameDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono16_frame() {
        let dim = FrameDim::new(1024, 768, PixelType::Mono16).unwrap();
        assert_eq!(dim.width(), 1024);
        assert_eq!(dim.height(), 768);
        assert_eq!(dim.depth(), 2);
        assert_eq!(dim.bits_per_pixel(), 16);
        assert_eq!(dim.pixel_count().unwrap(), 1024 * 768);
        assert_eq!(dim.mem_size().unwrap(), 1024 * 768 * 2);
        assert_eq!(dim.to_string(), "1024x768 Mono16");
    }

    #[test]
    fn zero_width_or_height_is_rejected() {
        assert_eq!(
            FrameDim::new(0, 768, PixelType::Mono16),
            Err(CapsError::InvalidGeometry {
                width: 0,
                height: 768
            })
        );
        assert!(matches!(
            FrameDim::new(1024, 0, PixelType::Mono8),
            Err(CapsError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn depth_follows_bit_table_for_every_type() {
        for pixel_type in PixelType::ALL {
            let dim = FrameDim::new(3, 5, pixel_type).unwrap();
            let expected = pixel_type.bits_per_pixel().div_ceil(8);
            assert_eq!(dim.depth(), expected, "{pixel_type}");
            assert_eq!(FrameDim::bytes_per_pixel_of(pixel_type), expected);
        }
    }

    #[test]
    fn partial_byte_types_round_up() {
        assert_eq!(PixelType::Mono12.bytes_per_pixel(), 2);
        assert_eq!(PixelType::Mono10.bytes_per_pixel(), 2);
        assert_eq!(PixelType::Rgb24.bytes_per_pixel(), 3);
        assert_eq!(PixelType::Mono8.bytes_per_pixel(), 1);
    }

    #[test]
    fn binned_frame_divides_geometry() {
        let dim = FrameDim::new(2048, 1024, PixelType::Mono16).unwrap();
        let binned = dim.binned(Bin::new(2, 4).unwrap()).unwrap();
        assert_eq!((binned.width(), binned.height()), (1024, 256));
        assert_eq!(binned.pixel_type(), PixelType::Mono16);

        let tiny = FrameDim::new(2, 2, PixelType::Mono8).unwrap();
        assert!(matches!(
            tiny.binned(Bin::new(4, 1).unwrap()),
            Err(CapsError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn contains_checks_both_axes() {
        let dim = FrameDim::new(100, 50, PixelType::Mono8).unwrap();
        assert!(dim.contains(&Roi::new(0, 0, 100, 50)));
        assert!(dim.contains(&Roi::new(10, 10, 20, 20)));
        assert!(!dim.contains(&Roi::new(90, 0, 20, 10)));
        assert!(!dim.contains(&Roi::new(0, 45, 10, 10)));
        assert!(!dim.contains(&Roi::new(u32::MAX, 0, 2, 1)));
    }

    #[test]
    fn frame_dims_compare_by_value() {
        let a = FrameDim::new(640, 480, PixelType::Mono8).unwrap();
        let b = FrameDim::new(640, 480, PixelType::Mono8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, a.with_size(640, 481).unwrap());
    }
}
