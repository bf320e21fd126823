use anyhow::{bail, Result};
use palette::Srgb;

/// An sRGB color resolved from a theme file token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse a hex color like `#ff8800`, `0xFF8800`, `ff8800` or `#f80`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex
            .strip_prefix('#')
            .or_else(|| hex.strip_prefix("0x"))
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        if !hex.is_ascii() {
            bail!("invalid hex color: non-ascii input");
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)?;
                let g = u8::from_str_radix(&hex[2..4], 16)?;
                let b = u8::from_str_radix(&hex[4..6], 16)?;
                Ok(Self { r, g, b })
            }
            3 => {
                // #rgb expands each digit: #f80 == #ff8800
                let r = u8::from_str_radix(&hex[0..1], 16)? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16)? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16)? * 17;
                Ok(Self { r, g, b })
            }
            n => bail!("invalid hex color: expected 3 or 6 hex digits, got {n}"),
        }
    }

    /// Resolve a theme token: hex first, then a CSS/X11 color name.
    ///
    /// Returns `None` for anything unrecognized; callers fall back to the
    /// terminal's default color.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(color) = Self::from_hex(token) {
            return Some(color);
        }
        palette::named::from_str(&token.to_ascii_lowercase()).map(Self::from_srgb_u8)
    }

    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self {
            r: srgb.red,
            g: srgb.green,
            b: srgb.blue,
        }
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}
