//! Note color palette

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Background color of a note card.
///
/// Serialized as the hex value stored in the backend `color` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NoteColor {
    #[default]
    White,
    Rose,
    Pink,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Sky,
    Lavender,
}

impl NoteColor {
    /// Palette in color-picker order.
    pub const ALL: [Self; 10] = [
        Self::White,
        Self::Rose,
        Self::Pink,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Teal,
        Self::Blue,
        Self::Sky,
        Self::Lavender,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Rose => "Rose",
            Self::Pink => "Pink",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Teal => "Teal",
            Self::Blue => "Blue",
            Self::Sky => "Sky",
            Self::Lavender => "Lavender",
        }
    }

    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::White => "#ffffff",
            Self::Rose => "#ffe4e6",
            Self::Pink => "#fce7f3",
            Self::Orange => "#fed7aa",
            Self::Yellow => "#fef3c7",
            Self::Green => "#d1fae5",
            Self::Teal => "#ccfbf1",
            Self::Blue => "#dbeafe",
            Self::Sky => "#e0f2fe",
            Self::Lavender => "#e0e7ff",
        }
    }

    /// RGB components of the hex value, for terminal rendering.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).unwrap_or(u8::MAX)
        };
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// Look up a palette entry by hex value, case-insensitive.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(value))
    }

    /// Look up a palette entry by name, case-insensitive.
    #[must_use]
    pub fn from_name(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoteColor {
    type Err = Error;

    /// Accepts either a palette name (`"Rose"`) or its hex value (`"#ffe4e6"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
            .or_else(|| Self::from_name(s))
            .ok_or_else(|| Error::Validation(format!("unknown color '{}'", s.trim())))
    }
}

impl Serialize for NoteColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

impl<'de> Deserialize<'de> for NoteColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse() {
            Ok(color) => Ok(color),
            Err(_) => {
                tracing::debug!("Unknown note color {raw:?}, falling back to white");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_ten_distinct_colors() {
        let mut hexes = NoteColor::ALL.map(NoteColor::hex).to_vec();
        hexes.sort_unstable();
        hexes.dedup();
        assert_eq!(hexes.len(), 10);
    }

    #[test]
    fn default_is_white() {
        assert_eq!(NoteColor::default(), NoteColor::White);
        assert_eq!(NoteColor::default().hex(), "#ffffff");
    }

    #[test]
    fn parses_hex_and_name_case_insensitively() {
        assert_eq!("#FFE4E6".parse::<NoteColor>().unwrap(), NoteColor::Rose);
        assert_eq!("lavender".parse::<NoteColor>().unwrap(), NoteColor::Lavender);
        assert!(matches!(
            "#123456".parse::<NoteColor>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn serializes_as_hex() {
        let json = serde_json::to_string(&NoteColor::Teal).unwrap();
        assert_eq!(json, "\"#ccfbf1\"");
        let parsed: NoteColor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, NoteColor::Teal);
    }

    #[test]
    fn unknown_backend_color_falls_back_to_white() {
        let parsed: NoteColor = serde_json::from_str("\"#010203\"").unwrap();
        assert_eq!(parsed, NoteColor::White);
    }

    #[test]
    fn rgb_decodes_hex_channels() {
        assert_eq!(NoteColor::White.rgb(), (255, 255, 255));
        assert_eq!(NoteColor::Orange.rgb(), (0xfe, 0xd7, 0xaa));
    }
}
