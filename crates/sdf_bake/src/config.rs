//! `sdf_bake.toml` parsing.
//!
//! Every section and field is optional; a missing file section falls back to
//! the values the showcase scene was tuned with.

use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::Vec2;
use sdf_core::Color;
use sdf_font::AtlasSettings;
use sdf_text::{MissingGlyphPolicy, TextStyle};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    pub font: FontConfig,
    pub atlas: AtlasConfig,
    pub preview: PreviewConfig,
    pub render: RenderConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: PathBuf,
    pub pixel_size: u32,
    pub spread: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("resources/fonts/Roboto-Bold.ttf"),
            pixel_size: 48,
            spread: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub width: u32,
    pub height: u32,
    /// Grayscale PNG of the packed atlas; `None` skips the export.
    pub output: Option<PathBuf>,
    /// Characters whose distance field is logged as ASCII art at debug level.
    pub dump_glyphs: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            output: Some(PathBuf::from("sdf_atlas.png")),
            dump_glyphs: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
    pub output: Option<PathBuf>,
    pub background: [f32; 4],
    pub lines: Vec<LineConfig>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        let line = |text: &str, y: f32, scale: f32, color: Color| LineConfig {
            text: text.to_string(),
            origin: [25.0, y],
            scale,
            color: color.to_array(),
            ..LineConfig::default()
        };
        Self {
            width: 800,
            height: 600,
            output: Some(PathBuf::from("sdf_preview.png")),
            background: Color::SLATE.to_array(),
            lines: vec![
                line("SDF Text Rendering", 500.0, 1.0, Color::LIME),
                line("High Quality Text", 450.0, 0.8, Color::ORANGE),
                line("Scalable Fonts", 400.0, 0.6, Color::SKY),
                line("Perfect Anti-aliasing", 350.0, 0.4, Color::MAGENTA),
            ],
        }
    }
}

/// One line of preview text.
#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    pub text: String,
    #[serde(default)]
    pub origin: [f32; 2],
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
    #[serde(default = "default_true")]
    pub outline: bool,
    #[serde(default = "default_outline_width")]
    pub outline_width: f32,
    #[serde(default = "default_outline_color")]
    pub outline_color: [f32; 4],
    #[serde(default = "default_smoothness")]
    pub smoothness: f32,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: [f32; 2],
    #[serde(default = "default_shadow_blur")]
    pub shadow_blur: f32,
    #[serde(default = "default_shadow_color")]
    pub shadow_color: [f32; 4],
}

fn default_scale() -> f32 {
    1.0
}

fn default_color() -> [f32; 4] {
    Color::WHITE.to_array()
}

fn default_true() -> bool {
    true
}

fn default_outline_width() -> f32 {
    TextStyle::default().outline_width
}

fn default_outline_color() -> [f32; 4] {
    TextStyle::default().outline_color.to_array()
}

fn default_smoothness() -> f32 {
    TextStyle::default().smoothness
}

fn default_shadow_offset() -> [f32; 2] {
    TextStyle::default().shadow_offset.to_array()
}

fn default_shadow_blur() -> f32 {
    TextStyle::default().shadow_blur
}

fn default_shadow_color() -> [f32; 4] {
    TextStyle::default().shadow_color.to_array()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            origin: [0.0, 0.0],
            scale: default_scale(),
            color: default_color(),
            outline: true,
            outline_width: default_outline_width(),
            outline_color: default_outline_color(),
            smoothness: default_smoothness(),
            shadow: false,
            shadow_offset: default_shadow_offset(),
            shadow_blur: default_shadow_blur(),
            shadow_color: default_shadow_color(),
        }
    }
}

impl LineConfig {
    pub fn origin(&self) -> Vec2 {
        Vec2::from(self.origin)
    }

    pub fn color(&self) -> Color {
        Color::from(self.color)
    }

    pub fn style(&self, render: &RenderConfig) -> TextStyle {
        TextStyle {
            outline_enabled: self.outline,
            shadow_enabled: self.shadow,
            outline_width: self.outline_width,
            smoothness: self.smoothness,
            shadow_offset: Vec2::from(self.shadow_offset),
            shadow_blur: self.shadow_blur,
            outline_color: Color::from(self.outline_color),
            shadow_color: Color::from(self.shadow_color),
            letter_spacing: render.letter_spacing,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub letter_spacing: f32,
    /// Pixels to advance past characters missing from the atlas.
    pub missing_glyph_advance: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            letter_spacing: TextStyle::default().letter_spacing,
            missing_glyph_advance: None,
        }
    }
}

impl RenderConfig {
    pub fn missing_glyph_policy(&self) -> MissingGlyphPolicy {
        match self.missing_glyph_advance {
            Some(px) => MissingGlyphPolicy::Advance(px),
            None => MissingGlyphPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

impl BakeConfig {
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("invalid bake config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("in {}", path.display()))
    }

    pub fn atlas_settings(&self) -> AtlasSettings {
        AtlasSettings::default()
            .with_pixel_size(self.font.pixel_size)
            .with_spread(self.font.spread)
            .with_atlas_size(self.atlas.width, self.atlas.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = BakeConfig::from_toml("").unwrap();
        assert_eq!(cfg.font.pixel_size, 48);
        assert_eq!(cfg.font.spread, 6);
        assert_eq!((cfg.atlas.width, cfg.atlas.height), (1024, 1024));
        assert_eq!(cfg.preview.lines.len(), 4);
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.render.missing_glyph_policy(), MissingGlyphPolicy::Skip);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = BakeConfig::from_toml(
            r#"
            [font]
            path = "fonts/mono.ttf"
            spread = 4

            [render]
            missing_glyph_advance = 12.0

            [[preview.lines]]
            text = "hello"
            origin = [10.0, 20.0]
            shadow = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.font.path, PathBuf::from("fonts/mono.ttf"));
        assert_eq!(cfg.font.pixel_size, 48);
        assert_eq!(cfg.atlas_settings().spread, 4);
        assert_eq!(cfg.render.missing_glyph_policy(), MissingGlyphPolicy::Advance(12.0));

        let line = &cfg.preview.lines[0];
        assert_eq!(cfg.preview.lines.len(), 1);
        assert_eq!(line.scale, 1.0);
        let style = line.style(&cfg.render);
        assert!(style.outline_enabled && style.shadow_enabled);
        assert_eq!(style.letter_spacing, 2.0);
        assert_eq!(style.shadow_offset, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn bad_types_are_reported() {
        assert!(BakeConfig::from_toml("[font]\npixel_size = \"big\"").is_err());
    }

    #[test]
    fn sample_config_parses() {
        let cfg = BakeConfig::from_toml(include_str!("../sdf_bake.toml")).unwrap();
        assert_eq!(cfg.preview.lines.len(), 3);
        assert!(!cfg.preview.lines[2].outline);
        assert_eq!(cfg.preview.lines[1].outline_width, 0.08);
        assert_eq!(cfg.atlas.dump_glyphs, "Ag");
    }
}
