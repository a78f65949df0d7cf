//! QR code detector backed by `rqrr`

use image::GrayImage;

use super::{CodeDetector, Detection, Point};
use crate::error::Result;

/// Finds the first decodable QR grid in a frame
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDetector;

impl QrDetector {
    pub fn new() -> Self {
        Self
    }
}

impl CodeDetector for QrDetector {
    fn detect(&self, frame: &GrayImage) -> Result<Option<Detection>> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width() as usize,
            frame.height() as usize,
            |x, y| frame.get_pixel(x as u32, y as u32)[0],
        );

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => {
                    let corners = grid
                        .bounds
                        .map(|p| Point::new(f64::from(p.x), f64::from(p.y)));
                    return Ok(Some(Detection::new(content, corners)));
                }
                Err(e) => {
                    tracing::debug!(error = ?e, "Grid found but not decodable");
                }
            }
        }

        Ok(None)
    }
}
