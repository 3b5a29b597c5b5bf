use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 24-bit colour, written `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u32);

#[derive(Debug, Error, PartialEq)]
#[error("invalid colour `{0}` (expected #rrggbb)")]
pub struct ColorParseError(String);

impl Rgb {
    pub fn parse(text: &str) -> Result<Self, ColorParseError> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 {
            return Err(ColorParseError(text.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb)
            .map_err(|_| ColorParseError(text.to_string()))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xff_ffff)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// d3 category10.
pub const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f77b4),
    Rgb(0xff7f0e),
    Rgb(0x2ca02c),
    Rgb(0xd62728),
    Rgb(0x9467bd),
    Rgb(0x8c564b),
    Rgb(0xe377c2),
    Rgb(0x7f7f7f),
    Rgb(0xbcbd22),
    Rgb(0x17becf),
];

/// Colour coding of nodes by section tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionStyle {
    /// Tags whose name starts with this (ignoring case) name a section.
    pub prefix: String,
    pub palette: Vec<Rgb>,
    /// Fill for nodes without a section.
    pub neutral: Rgb,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            prefix: "Section".to_string(),
            palette: CATEGORY10.to_vec(),
            neutral: Rgb(0x3a3f4b),
        }
    }
}

impl SectionStyle {
    /// Palette slot for a section name: sum of its char codes modulo the
    /// palette length.
    pub fn slot(&self, section: &str) -> Option<usize> {
        if self.palette.is_empty() {
            return None;
        }
        let sum: u64 = section.chars().map(|c| u64::from(u32::from(c))).sum();
        Some((sum % self.palette.len() as u64) as usize)
    }

    pub fn color(&self, section: Option<&str>) -> Rgb {
        section
            .and_then(|s| self.slot(s))
            .map_or(self.neutral, |i| self.palette[i])
    }
}
