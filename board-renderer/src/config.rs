use std::path::PathBuf;
use std::time::Duration;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::CANVAS_SIZE;

pub const DEFAULT_SIZE: u32 = 480;
pub const DEFAULT_LIGHT: &str = "rgb(237, 238, 209)";
pub const DEFAULT_DARK: &str = "rgb(119, 153, 82)";
pub const DEFAULT_STYLE: &str = "neo";
pub const DEFAULT_ASSET_ROOT: &str = "resources";
pub const DEFAULT_AVATAR_TIMEOUT: Duration = Duration::from_secs(10);

/// What to draw when an avatar cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarFallback {
    /// Abandon the render with the load error.
    #[default]
    Fail,
    /// Draw a neutral filled circle instead.
    Placeholder,
}

/// Construction options for a [`crate::BoardRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoardOptions {
    /// Edge length of the board area in pixels.
    pub size: u32,
    /// Light square color, used when no board skin is selected.
    pub light: String,
    /// Dark square color, used when no board skin is selected.
    pub dark: String,
    /// Piece sprite skin (`pieces/<style>/`).
    pub style: String,
    /// Board background skin (`boards/<board_style>.png`). Plain checkerboard when unset.
    pub board_style: Option<String>,
    pub asset_root: PathBuf,
    pub avatar_timeout: Duration,
    pub avatar_fallback: AvatarFallback,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            light: DEFAULT_LIGHT.to_string(),
            dark: DEFAULT_DARK.to_string(),
            style: DEFAULT_STYLE.to_string(),
            board_style: None,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            avatar_timeout: DEFAULT_AVATAR_TIMEOUT,
            avatar_fallback: AvatarFallback::Fail,
        }
    }
}

impl BoardOptions {
    /// Check the size and colors, returning the parsed `(light, dark)` pair.
    pub fn validate(&self) -> Result<(Rgba<u8>, Rgba<u8>), ConfigError> {
        if self.size == 0 || self.size > CANVAS_SIZE {
            return Err(ConfigError::InvalidSize {
                size: self.size,
                max: CANVAS_SIZE,
            });
        }
        Ok((parse_color(&self.light)?, parse_color(&self.dark)?))
    }
}

/// Parse `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rrggbb`, `#rgb`, `white` or `black`.
///
/// The alpha of `rgba()` is a 0.0..=1.0 fraction.
pub fn parse_color(input: &str) -> Result<Rgba<u8>, ConfigError> {
    let err = || ConfigError::InvalidColor(input.to_string());
    let s = input.trim().to_ascii_lowercase();

    match s.as_str() {
        "white" => return Ok(Rgba([255, 255, 255, 255])),
        "black" => return Ok(Rgba([0, 0, 0, 255])),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(err)?;
        return match digits.as_slice() {
            [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
            [r1, r0, g1, g0, b1, b0] => Ok(Rgba([
                r1 * 16 + r0,
                g1 * 16 + g0,
                b1 * 16 + b0,
                255,
            ])),
            _ => Err(err()),
        };
    }

    let (body, with_alpha) = if let Some(body) = s.strip_prefix("rgba(") {
        (body, true)
    } else if let Some(body) = s.strip_prefix("rgb(") {
        (body, false)
    } else {
        return Err(err());
    };
    let parts: Vec<&str> = body
        .strip_suffix(')')
        .ok_or_else(err)?
        .split(',')
        .map(str::trim)
        .collect();

    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(err());
    }
    let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
    let alpha = if with_alpha {
        let a: f32 = parts[3].parse().map_err(|_| err())?;
        if !(0.0..=1.0).contains(&a) {
            return Err(err());
        }
        (a * 255.0).round() as u8
    } else {
        255
    };
    Ok(Rgba([
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ]))
}

/// Renderer configuration, loadable from a TOML file.
///
/// All fields default to their standard values. CLI flags override config file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub size: u32,
    pub light: String,
    pub dark: String,
    pub style: String,
    pub board_style: Option<String>,
    pub asset_root: PathBuf,
    /// Label font (TrueType/OpenType). The bundled DejaVu Sans Bold when unset.
    pub font: Option<PathBuf>,
    pub avatar_timeout_secs: u64,
    pub avatar_fallback: AvatarFallback,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let options = BoardOptions::default();
        Self {
            size: options.size,
            light: options.light,
            dark: options.dark,
            style: options.style,
            board_style: options.board_style,
            asset_root: options.asset_root,
            font: None,
            avatar_timeout_secs: options.avatar_timeout.as_secs(),
            avatar_fallback: options.avatar_fallback,
        }
    }
}

impl RendererConfig {
    /// Load config from a TOML file.
    #[cfg(feature = "bin")]
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Convert into BoardOptions for the renderer.
    pub fn into_board_options(self) -> BoardOptions {
        BoardOptions {
            size: self.size,
            light: self.light,
            dark: self.dark,
            style: self.style,
            board_style: self.board_style,
            asset_root: self.asset_root,
            avatar_timeout: Duration::from_secs(self.avatar_timeout_secs),
            avatar_fallback: self.avatar_fallback,
        }
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Board Renderer Configuration
# Specify with --config <path>.

# Edge length of the board area in pixels (the canvas is always 900x900)
size = 480

# Square colors, used only when no board_style is set
light = "rgb(237, 238, 209)"
dark = "rgb(119, 153, 82)"

# Piece sprite set, loaded from <asset_root>/pieces/<style>/
style = "neo"

# Board background, loaded from <asset_root>/boards/<board_style>.png
# board_style = "stone"

# Directory holding boards/ and pieces/
asset_root = "resources"

# TrueType font for player names; the bundled DejaVu Sans Bold is used when unset
# font = "resources/fonts/DejaVuSans.ttf"

# Timeout for fetching remote avatars
avatar_timeout_secs = 10

# "fail" aborts the render when an avatar can't be loaded, "placeholder" draws a gray circle
avatar_fallback = "fail"
"#
        .to_string()
    }

    /// Apply CLI flag overrides.
    #[cfg(feature = "bin")]
    pub fn apply_cli_overrides(&mut self, matches: &clap::ArgMatches) -> anyhow::Result<()> {
        use anyhow::Context;
        if let Some(size) = matches.value_of("SIZE") {
            self.size = size.parse().context("invalid --size")?;
        }
        if let Some(light) = matches.value_of("LIGHT") {
            self.light = light.to_string();
        }
        if let Some(dark) = matches.value_of("DARK") {
            self.dark = dark.to_string();
        }
        if let Some(style) = matches.value_of("STYLE") {
            self.style = style.to_string();
        }
        if let Some(board_style) = matches.value_of("BOARD_STYLE") {
            self.board_style = Some(board_style.to_string());
        }
        if let Some(root) = matches.value_of("ASSETS") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(font) = matches.value_of("FONT") {
            self.font = Some(PathBuf::from(font));
        }
        if matches.is_present("PLACEHOLDER_AVATARS") {
            self.avatar_fallback = AvatarFallback::Placeholder;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_colors_parse() {
        assert_eq!(parse_color(DEFAULT_LIGHT).unwrap(), Rgba([237, 238, 209, 255]));
        assert_eq!(parse_color(DEFAULT_DARK).unwrap(), Rgba([119, 153, 82, 255]));
    }

    #[test]
    fn color_forms() {
        assert_eq!(parse_color("#ff8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_color("#FFF").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("rgba(0,0,0,0.5)").unwrap(), Rgba([0, 0, 0, 128]));
        assert_eq!(parse_color(" White ").unwrap(), Rgba([255, 255, 255, 255]));
        assert!(parse_color("rgb(256, 0, 0)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("teal").is_err());
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        let mut options = BoardOptions::default();
        assert!(options.validate().is_ok());
        options.size = 0;
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidSize { size: 0, .. })
        ));
        options.size = CANVAS_SIZE + 1;
        assert!(options.validate().is_err());
    }

    #[test]
    fn default_toml_matches_defaults() {
        let parsed: RendererConfig =
            toml::from_str(&RendererConfig::generate_default_toml()).unwrap();
        assert_eq!(
            parsed.into_board_options(),
            RendererConfig::default().into_board_options()
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let parsed: RendererConfig = toml::from_str(
            "size = 720\nstyle = \"space\"\nboard_style = \"stone\"\navatar_fallback = \"placeholder\"",
        )
        .unwrap();
        let options = parsed.into_board_options();
        assert_eq!(options.size, 720);
        assert_eq!(options.style, "space");
        assert_eq!(options.board_style.as_deref(), Some("stone"));
        assert_eq!(options.light, DEFAULT_LIGHT);
        assert_eq!(options.avatar_fallback, AvatarFallback::Placeholder);
    }
}
