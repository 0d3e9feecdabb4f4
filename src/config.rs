use macroquad::prelude::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Yaml(err) => write!(f, "yaml error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

/// Colors keyed by wall code plus the flat scene colors. Index 0 of
/// `wall_colors` is unused (code 0 is empty space).
#[derive(Clone)]
pub struct Palette {
    pub wall_colors: Vec<Color>,
    pub fallback_wall: Color,
    pub floor: Color,
    pub ceiling: Color,
    pub side_shade: f32,
    pub target_unhit: Color,
    pub target_hit: Color,
}

impl Palette {
    pub fn wall_color(&self, wall_type: i32) -> Color {
        if wall_type <= 0 {
            return self.fallback_wall;
        }
        self.wall_colors
            .get(wall_type as usize)
            .copied()
            .unwrap_or(self.fallback_wall)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall_colors: vec![
                WHITE,                             // unused, code 0 is empty
                Color::from_rgba(220, 100, 100, 255), // standard
                Color::from_rgba(100, 220, 100, 255), // energy
                Color::from_rgba(100, 100, 220, 255), // data stream
                Color::from_rgba(220, 220, 100, 255), // neon barrier
                Color::from_rgba(180, 120, 220, 255), // hologram
            ],
            fallback_wall: Color::from_rgba(160, 160, 160, 255),
            floor: Color::from_rgba(70, 70, 50, 255),
            ceiling: Color::from_rgba(50, 50, 70, 255),
            side_shade: 0.7,
            target_unhit: Color::from_rgba(0, 255, 255, 255),
            target_hit: Color::from_rgba(120, 120, 130, 255),
        }
    }
}

#[derive(Clone)]
pub struct EffectParams {
    pub pulse_speed: f32,
    pub wall_tint: Color,
    pub wall_tint_strength: f32,
    pub vignette_color: Color,
    pub slash_colors: Vec<Color>,
    pub slash_width: f32,
    pub trail_length: f32,
    pub blur_offset: f32,
    pub blur_weight: f32,
    pub burst_particles: usize,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            pulse_speed: 9.0,
            wall_tint: Color::from_rgba(0, 200, 255, 255),
            wall_tint_strength: 0.25,
            vignette_color: Color::from_rgba(0, 255, 255, 255),
            slash_colors: vec![
                Color::from_rgba(0, 180, 255, 255),
                Color::from_rgba(120, 255, 255, 255),
                Color::from_rgba(255, 255, 255, 255),
            ],
            slash_width: 14.0,
            trail_length: 60.0,
            blur_offset: 6.0,
            blur_weight: 0.65,
            burst_particles: 48,
        }
    }
}

#[derive(Clone)]
pub struct RenderConfig {
    pub palette: Palette,
    pub effects: EffectParams,
    pub weapon: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            effects: EffectParams::default(),
            weapon: "sword".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw: RenderConfigFile = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
        Ok(config_from_file(raw))
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RenderConfigFile = serde_yaml::from_str(text)?;
        Ok(config_from_file(raw))
    }
}

fn color(rgba: [u8; 4]) -> Color {
    Color::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn config_from_file(raw: RenderConfigFile) -> RenderConfig {
    let mut cfg = RenderConfig::default();

    if let Some(walls) = raw.wall_colors {
        let mut colors = vec![WHITE];
        colors.extend(walls.into_iter().map(color));
        if colors.len() > 1 {
            cfg.palette.wall_colors = colors;
        }
    }
    if let Some(c) = raw.fallback_wall {
        cfg.palette.fallback_wall = color(c);
    }
    if let Some(c) = raw.floor {
        cfg.palette.floor = color(c);
    }
    if let Some(c) = raw.ceiling {
        cfg.palette.ceiling = color(c);
    }
    if let Some(shade) = raw.side_shade {
        cfg.palette.side_shade = shade.clamp(0.0, 1.0);
    }
    if let Some(c) = raw.target_unhit {
        cfg.palette.target_unhit = color(c);
    }
    if let Some(c) = raw.target_hit {
        cfg.palette.target_hit = color(c);
    }

    if let Some(speed) = raw.pulse_speed {
        cfg.effects.pulse_speed = speed;
    }
    if let Some(c) = raw.wall_tint {
        cfg.effects.wall_tint = color(c);
    }
    if let Some(strength) = raw.wall_tint_strength {
        cfg.effects.wall_tint_strength = strength.clamp(0.0, 1.0);
    }
    if let Some(c) = raw.vignette_color {
        cfg.effects.vignette_color = color(c);
    }
    if let Some(colors) = raw.slash_colors {
        if !colors.is_empty() {
            cfg.effects.slash_colors = colors.into_iter().map(color).collect();
        }
    }
    if let Some(width) = raw.slash_width {
        cfg.effects.slash_width = width.max(1.0);
    }
    if let Some(len) = raw.trail_length {
        cfg.effects.trail_length = len.max(0.0);
    }
    if let Some(offset) = raw.blur_offset {
        cfg.effects.blur_offset = offset;
    }
    if let Some(weight) = raw.blur_weight {
        cfg.effects.blur_weight = weight.clamp(0.0, 1.0);
    }
    if let Some(count) = raw.burst_particles {
        cfg.effects.burst_particles = count;
    }
    if let Some(weapon) = raw.weapon {
        cfg.weapon = weapon;
    }
    cfg
}

#[derive(Deserialize)]
struct RenderConfigFile {
    #[serde(default)]
    wall_colors: Option<Vec<[u8; 4]>>,
    #[serde(default)]
    fallback_wall: Option<[u8; 4]>,
    #[serde(default)]
    floor: Option<[u8; 4]>,
    #[serde(default)]
    ceiling: Option<[u8; 4]>,
    #[serde(default)]
    side_shade: Option<f32>,
    #[serde(default)]
    target_unhit: Option<[u8; 4]>,
    #[serde(default)]
    target_hit: Option<[u8; 4]>,
    #[serde(default)]
    pulse_speed: Option<f32>,
    #[serde(default)]
    wall_tint: Option<[u8; 4]>,
    #[serde(default)]
    wall_tint_strength: Option<f32>,
    #[serde(default)]
    vignette_color: Option<[u8; 4]>,
    #[serde(default)]
    slash_colors: Option<Vec<[u8; 4]>>,
    #[serde(default)]
    slash_width: Option<f32>,
    #[serde(default)]
    trail_length: Option<f32>,
    #[serde(default)]
    blur_offset: Option<f32>,
    #[serde(default)]
    blur_weight: Option<f32>,
    #[serde(default)]
    burst_particles: Option<usize>,
    #[serde(default)]
    weapon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wall_code_falls_back() {
        let palette = Palette::default();
        assert_eq!(palette.wall_color(42), palette.fallback_wall);
        assert_eq!(palette.wall_color(-1), palette.fallback_wall);
        assert_eq!(
            palette.wall_color(1),
            Color::from_rgba(220, 100, 100, 255)
        );
    }

    #[test]
    fn parse_merges_over_defaults() {
        let cfg = RenderConfig::parse(
            "side_shade: 0.5\nweapon: none\nwall_colors:\n  - [10, 20, 30, 255]\n",
        )
        .unwrap();
        assert_eq!(cfg.palette.side_shade, 0.5);
        assert_eq!(cfg.weapon, "none");
        assert_eq!(cfg.palette.wall_color(1), Color::from_rgba(10, 20, 30, 255));
        // Codes past the shortened list fall back.
        assert_eq!(cfg.palette.wall_color(2), cfg.palette.fallback_wall);
        // Untouched fields keep defaults.
        assert_eq!(cfg.effects.burst_particles, 48);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = RenderConfig::parse("{}").unwrap();
        assert_eq!(cfg.weapon, "sword");
        assert_eq!(cfg.palette.side_shade, 0.7);
    }
}
