use anyhow::{Context, Result};
use serde::Deserialize;

/// File extension recognized as an Alacritty theme.
pub const THEME_EXTENSION: &str = "toml";

/// The `[colors]` section of an Alacritty theme file.
///
/// Every field defaults to an empty token, so a theme missing some colors
/// still parses and renders those swatches with the terminal default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub colors: Colors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub primary: Primary,
    pub normal: AnsiColors,
    pub bright: AnsiColors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Primary {
    pub background: String,
    pub foreground: String,
}

/// The eight ANSI colors of one intensity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnsiColors {
    pub black: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
}

impl AnsiColors {
    /// Color tokens paired with their display names, in ANSI order.
    pub fn named(&self) -> [(&str, &'static str); 8] {
        [
            (self.black.as_str(), "Black"),
            (self.red.as_str(), "Red"),
            (self.green.as_str(), "Green"),
            (self.yellow.as_str(), "Yellow"),
            (self.blue.as_str(), "Blue"),
            (self.magenta.as_str(), "Magenta"),
            (self.cyan.as_str(), "Cyan"),
            (self.white.as_str(), "White"),
        ]
    }
}

impl ColorScheme {
    /// Parse the content of a theme file.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid theme file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
[colors.primary]
background = "#1d1f21"
foreground = "#c5c8c6"

[colors.normal]
black = "#282a2e"
red = "#a54242"
green = "#8c9440"
yellow = "#de935f"
blue = "#5f819d"
magenta = "#85678f"
cyan = "#5e8d87"
white = "#707880"

[colors.bright]
black = "#373b41"
red = "#cc6666"
green = "#b5bd68"
yellow = "#f0c674"
blue = "#81a2be"
magenta = "#b294bb"
cyan = "#8abeb7"
white = "#c5c8c6"
"##;

    #[test]
    fn parses_all_fields() {
        let scheme = ColorScheme::parse(FULL).unwrap();
        assert_eq!(scheme.colors.primary.background, "#1d1f21");
        assert_eq!(scheme.colors.primary.foreground, "#c5c8c6");
        assert_eq!(scheme.colors.normal.magenta, "#85678f");
        assert_eq!(scheme.colors.bright.white, "#c5c8c6");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let scheme = ColorScheme::parse("[colors.normal]\nred = \"#ff0000\"\n").unwrap();
        assert_eq!(scheme.colors.normal.red, "#ff0000");
        assert_eq!(scheme.colors.normal.blue, "");
        assert_eq!(scheme.colors.primary, Primary::default());
    }

    #[test]
    fn unrelated_sections_are_ignored() {
        let scheme =
            ColorScheme::parse("[font]\nsize = 12\n[colors.cursor]\ntext = \"#000000\"\n").unwrap();
        assert_eq!(scheme, ColorScheme::default());
    }

    #[test]
    fn malformed_content_is_an_error() {
        assert!(ColorScheme::parse("[colors.primary\nbackground = ").is_err());
    }

    #[test]
    fn named_is_in_ansi_order() {
        let scheme = ColorScheme::parse(FULL).unwrap();
        let names: Vec<&str> = scheme.colors.normal.named().iter().map(|(_, n)| *n).collect();
        assert_eq!(
            names,
            ["Black", "Red", "Green", "Yellow", "Blue", "Magenta", "Cyan", "White"]
        );
        assert_eq!(scheme.colors.normal.named()[1].0, "#a54242");
    }
}
