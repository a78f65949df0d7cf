//! Camera events and their wire format
//!
//! One event is produced per captured frame and rendered as a single line:
//!
//! ```text
//! qr <timestamp> <code|?> <width> <height> <x0> <y0> <x1> <y1> <x2> <y2> <x3> <y3>
//! ```
//!
//! Without a code, the code field is `?` and the eight coordinates are plain
//! `0`. With a code, coordinates carry exactly one decimal place, rounded half
//! away from zero (`0.25` prints as `0.3`).

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::detect::{Detection, Point};

/// Result of one capture and detection pass
#[derive(Debug, Clone, PartialEq)]
pub struct CameraEvent {
    timestamp: u64,
    code: String,
    width: u32,
    height: u32,
    corners: Option<[Point; 4]>,
}

impl CameraEvent {
    /// Build an event; corners are kept only when a non-empty code was found
    pub fn new(timestamp: u64, width: u32, height: u32, detection: Option<Detection>) -> Self {
        match detection {
            Some(d) if !d.code.is_empty() => Self {
                timestamp,
                code: d.code,
                width,
                height,
                corners: Some(d.corners),
            },
            _ => Self {
                timestamp,
                code: String::new(),
                width,
                height,
                corners: None,
            },
        }
    }

    /// Milliseconds since the Unix epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Decoded code, empty if none was recognized
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Corners of the code, present iff `code` is non-empty
    pub fn corners(&self) -> Option<&[Point; 4]> {
        self.corners.as_ref()
    }

    pub fn has_code(&self) -> bool {
        self.corners.is_some()
    }

    /// Render the protocol line (without trailing newline)
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CameraEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.corners {
            Some(corners) => {
                write!(
                    f,
                    "qr {} {} {} {}",
                    self.timestamp,
                    wire_code(&self.code),
                    self.width,
                    self.height
                )?;
                for p in corners {
                    write!(f, " {:.1} {:.1}", one_decimal(p.x), one_decimal(p.y))?;
                }
                Ok(())
            }
            None => write!(
                f,
                "qr {} ? {} {} 0 0 0 0 0 0 0 0",
                self.timestamp, self.width, self.height
            ),
        }
    }
}

/// Round half away from zero to one decimal; `{:.1}` alone rounds ties to even
fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Whitespace inside a payload would break field splitting and line framing
fn wire_code(code: &str) -> std::borrow::Cow<'_, str> {
    if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
        code.chars()
            .map(|c| {
                if c.is_whitespace() || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect::<String>()
            .into()
    } else {
        code.into()
    }
}

/// Current wall clock time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
