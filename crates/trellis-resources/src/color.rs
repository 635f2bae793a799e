//! CSS color parsing and normalization.

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Named colors recognized on input and used for naming on output.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("lime", [0, 255, 0]),
    ("navy", [0, 0, 128]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("orange", [255, 165, 0]),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// Parse a computed CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
    /// `rgba()`, `transparent` or a named color.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_ascii_lowercase();
        if let Some(hex) = input.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        if input.starts_with("rgb") {
            return parse_rgb(&input);
        }
        match input.as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "grey" => Some(Self::rgb(128, 128, 128)),
            "aqua" => Some(Self::rgb(0, 255, 255)),
            "fuchsia" => Some(Self::rgb(255, 0, 255)),
            name => NAMED_COLORS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, [r, g, b])| Self::rgb(*r, *g, *b)),
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| d as u8 * 17));
                Some(Self::rgb(digits.next()??, digits.next()??, digits.next()??))
            }
            6 => Some(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            8 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Platform hex form: `#RRGGBB` when opaque, else `#AARRGGBB`.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }

    /// Resource name: the named color on an exact match, else `color_<hex>`.
    pub fn resource_name(&self) -> String {
        if *self == Self::TRANSPARENT {
            return "transparent".to_string();
        }
        let named = self
            .is_opaque()
            .then(|| NAMED_COLORS.iter().find(|(_, rgb)| *rgb == [self.r, self.g, self.b]))
            .flatten();
        match named {
            Some((name, _)) => (*name).to_string(),
            None => format!("color_{}", self.to_hex().trim_start_matches('#').to_ascii_lowercase()),
        }
    }
}

/// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)` with alpha in `0..=1`.
fn parse_rgb(input: &str) -> Option<Color> {
    let inner = input
        .strip_prefix("rgba(")
        .or_else(|| input.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8);
    let (r, g, b) = (
        channel(parts.first().copied()?)?,
        channel(parts.get(1).copied()?)?,
        channel(parts.get(2).copied()?)?,
    );
    let a = match parts.get(3) {
        Some(alpha) => (alpha.parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    (parts.len() <= 4).then_some(Color { r, g, b, a })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#336699"), Some(Color::rgb(0x33, 0x66, 0x99)));
        assert_eq!(Color::parse("rgb(51, 102, 153)"), Some(Color::rgb(0x33, 0x66, 0x99)));
        assert_eq!(Color::parse("rgba(0, 0, 0, 0.5)").map(|c| c.a), Some(128));
        assert_eq!(Color::parse("Grey"), Some(Color::rgb(128, 128, 128)));
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse("currentcolor"), None);
        assert_eq!(Color::parse("#12345"), None);
    }

    #[test]
    fn test_hex_and_names() {
        assert_eq!(Color::rgb(255, 0, 0).to_hex(), "#FF0000");
        assert_eq!(Color::rgb(255, 0, 0).resource_name(), "red");
        let translucent = Color { r: 0, g: 0, b: 0, a: 128 };
        assert_eq!(translucent.to_hex(), "#80000000");
        assert_eq!(translucent.resource_name(), "color_80000000");
        assert_eq!(Color::rgb(0x12, 0xab, 0x34).resource_name(), "color_12ab34");
    }
}
