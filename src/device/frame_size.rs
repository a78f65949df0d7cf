//! Camera frame size options
//!
//! Each option maps to the numeric value the camera expects for its
//! `framesize` control variable. Configuration may name an option, give its
//! dimensions or give the raw control value.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Frame size supported by the camera firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum FrameSize {
    /// 96x96
    S96x96,
    /// 160x120
    Qqvga,
    /// 176x144
    Qcif,
    /// 240x176
    Hqvga,
    /// 240x240
    S240x240,
    /// 320x240
    Qvga,
    /// 400x296
    Cif,
    /// 480x320
    Hvga,
    /// 640x480
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    /// 1280x720
    Hd,
    /// 1280x1024
    Sxga,
    /// 1600x1200
    Uxga,
}

impl FrameSize {
    /// All options in control value order
    pub const ALL: [FrameSize; 14] = [
        FrameSize::S96x96,
        FrameSize::Qqvga,
        FrameSize::Qcif,
        FrameSize::Hqvga,
        FrameSize::S240x240,
        FrameSize::Qvga,
        FrameSize::Cif,
        FrameSize::Hvga,
        FrameSize::Vga,
        FrameSize::Svga,
        FrameSize::Xga,
        FrameSize::Hd,
        FrameSize::Sxga,
        FrameSize::Uxga,
    ];

    /// Value sent as `val` for the `framesize` control variable
    pub fn value(self) -> i64 {
        match self {
            FrameSize::S96x96 => 0,
            FrameSize::Qqvga => 1,
            FrameSize::Qcif => 2,
            FrameSize::Hqvga => 3,
            FrameSize::S240x240 => 4,
            FrameSize::Qvga => 5,
            FrameSize::Cif => 6,
            FrameSize::Hvga => 7,
            FrameSize::Vga => 8,
            FrameSize::Svga => 9,
            FrameSize::Xga => 10,
            FrameSize::Hd => 11,
            FrameSize::Sxga => 12,
            FrameSize::Uxga => 13,
        }
    }

    /// Option for a reported `framesize` value
    pub fn from_value(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.value() == value)
    }

    /// Width and height in pixels
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            FrameSize::S96x96 => (96, 96),
            FrameSize::Qqvga => (160, 120),
            FrameSize::Qcif => (176, 144),
            FrameSize::Hqvga => (240, 176),
            FrameSize::S240x240 => (240, 240),
            FrameSize::Qvga => (320, 240),
            FrameSize::Cif => (400, 296),
            FrameSize::Hvga => (480, 320),
            FrameSize::Vga => (640, 480),
            FrameSize::Svga => (800, 600),
            FrameSize::Xga => (1024, 768),
            FrameSize::Hd => (1280, 720),
            FrameSize::Sxga => (1280, 1024),
            FrameSize::Uxga => (1600, 1200),
        }
    }

    /// Firmware name of the option
    pub fn name(self) -> &'static str {
        match self {
            FrameSize::S96x96 => "96X96",
            FrameSize::Qqvga => "QQVGA",
            FrameSize::Qcif => "QCIF",
            FrameSize::Hqvga => "HQVGA",
            FrameSize::S240x240 => "240X240",
            FrameSize::Qvga => "QVGA",
            FrameSize::Cif => "CIF",
            FrameSize::Hvga => "HVGA",
            FrameSize::Vga => "VGA",
            FrameSize::Svga => "SVGA",
            FrameSize::Xga => "XGA",
            FrameSize::Hd => "HD",
            FrameSize::Sxga => "SXGA",
            FrameSize::Uxga => "UXGA",
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        FrameSize::Qvga
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameSize {
    type Err = Error;

    /// Accepts a firmware name (`QVGA`) or dimensions (`320x240`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(f) = Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
        {
            return Ok(f);
        }

        let dims = s
            .split_once(['x', 'X'])
            .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)));
        dims.and_then(|d| Self::ALL.into_iter().find(|f| f.dimensions() == d))
            .ok_or_else(|| Error::Config(format!("unknown frame size: {s}")))
    }
}

impl<'de> Deserialize<'de> for FrameSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FrameSizeVisitor)
    }
}

struct FrameSizeVisitor;

impl<'de> Visitor<'de> for FrameSizeVisitor {
    type Value = FrameSize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a frame size name, WxH dimensions or a framesize control value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FrameSize, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FrameSize, E> {
        FrameSize::from_value(v).ok_or_else(|| E::custom(format!("unknown framesize value: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FrameSize, E> {
        i64::try_from(v)
            .ok()
            .and_then(FrameSize::from_value)
            .ok_or_else(|| E::custom(format!("unknown framesize value: {v}")))
    }
}

impl From<FrameSize> for String {
    fn from(value: FrameSize) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_values_are_distinct() {
        let values: HashSet<i64> = FrameSize::ALL.iter().map(|f| f.value()).collect();
        assert_eq!(values.len(), FrameSize::ALL.len());
    }

    #[test]
    fn test_cif_and_qvga_differ() {
        assert_eq!(FrameSize::Qvga.value(), 5);
        assert_eq!(FrameSize::Cif.value(), 6);
        assert_eq!(FrameSize::Cif.dimensions(), (400, 296));
    }

    #[test]
    fn test_default_is_qvga() {
        assert_eq!(FrameSize::default(), FrameSize::Qvga);
        assert_eq!(FrameSize::default().dimensions(), (320, 240));
    }

    #[test]
    fn test_parse_name_case_insensitive() {
        assert_eq!("vga".parse::<FrameSize>().unwrap(), FrameSize::Vga);
        assert_eq!("240X240".parse::<FrameSize>().unwrap(), FrameSize::S240x240);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!("320x240".parse::<FrameSize>().unwrap(), FrameSize::Qvga);
        assert_eq!("1280X720".parse::<FrameSize>().unwrap(), FrameSize::Hd);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("123x456".parse::<FrameSize>().is_err());
        assert!("huge".parse::<FrameSize>().is_err());
    }

    #[test]
    fn test_deserialize_name_or_value() {
        assert_eq!(serde_json::from_str::<FrameSize>("\"QVGA\"").unwrap(), FrameSize::Qvga);
        assert_eq!(serde_json::from_str::<FrameSize>("\"800x600\"").unwrap(), FrameSize::Svga);
        assert_eq!(serde_json::from_str::<FrameSize>("6").unwrap(), FrameSize::Cif);
        assert!(serde_json::from_str::<FrameSize>("14").is_err());
        assert!(serde_json::from_str::<FrameSize>("-1").is_err());
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(serde_json::to_string(&FrameSize::Hd).unwrap(), "\"HD\"");
    }

    #[test]
    fn test_from_value_roundtrip() {
        for f in FrameSize::ALL {
            assert_eq!(FrameSize::from_value(f.value()), Some(f));
        }
        assert_eq!(FrameSize::from_value(99), None);
    }
}
