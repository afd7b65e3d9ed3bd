//! Hard limits on frame geometry and buffer sizing.

use crate::error::CapsError;

/// Maximum allowed single-frame payload in bytes (default: 1GB).
pub const MAX_FRAME_BYTES: usize = 1024 * 1024 * 1024;
/// Maximum supported width/height for frames.
pub const MAX_FRAME_DIMENSION: u32 = 65_536;

/// Validated frame sizing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    /// Number of pixels in one frame.
    pub pixels: usize,
    /// Number of bytes in one frame.
    pub bytes: usize,
}

/// Validate frame dimensions and calculate pixel/byte sizes safely.
pub fn validate_frame_size(
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Result<FrameSize, CapsError> {
    if width > MAX_FRAME_DIMENSION || height > MAX_FRAME_DIMENSION {
        return Err(CapsError::FrameDimensionsTooLarge {
            width,
            height,
            max_dimension: MAX_FRAME_DIMENSION,
        });
    }

    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or(CapsError::SizeOverflow {
            context: "frame pixel count",
        })?;

    let bytes = pixels
        .checked_mul(bytes_per_pixel)
        .ok_or(CapsError::SizeOverflow {
            context: "frame byte size",
        })?;

    if bytes > MAX_FRAME_BYTES {
        return Err(CapsError::FrameTooLarge {
            bytes,
            max_bytes: MAX_FRAME_BYTES,
        });
    }

    Ok(FrameSize { pixels, bytes })
}

/// Total bytes for `nb_buffers` frames of `frame_bytes` each.
pub fn buffer_bytes(frame_bytes: usize, nb_buffers: usize) -> Result<usize, CapsError> {
    frame_bytes
        .checked_mul(nb_buffers)
        .ok_or(CapsError::SizeOverflow {
            context: "buffer pool size",
        })
}
