//! Frame decoding and code detection
//!
//! The camera hands back encoded image bytes. [`decode_frame`] turns them into
//! a luma buffer and a [`CodeDetector`] looks for a code in it. Both steps are
//! CPU bound and are run off the async runtime by the capture loop.

pub mod qr;

use image::GrayImage;

use crate::error::Result;

pub use qr::QrDetector;

/// A corner of a detected code, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A recognized code and its four corners
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Decoded payload
    pub code: String,
    /// Corners in detector order
    pub corners: [Point; 4],
}

impl Detection {
    pub fn new(code: impl Into<String>, corners: [Point; 4]) -> Self {
        Self {
            code: code.into(),
            corners,
        }
    }
}

/// Recognizes a code in a decoded frame
///
/// Returns `Ok(None)` when the frame holds no recognizable code. An `Err` is
/// reserved for failures of the detector itself.
pub trait CodeDetector: Send + Sync + 'static {
    fn detect(&self, frame: &GrayImage) -> Result<Option<Detection>>;
}

/// Decode raw image bytes (JPEG, PNG) into a luma buffer
pub fn decode_frame(bytes: &[u8]) -> Result<GrayImage> {
    Ok(image::load_from_memory(bytes)?.to_luma8())
}
