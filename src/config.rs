use crate::color::Rgb;
use crate::error::{GrowthError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which way the trunk extends from the planting point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthDirection {
    /// Toward decreasing y (screen up)
    #[default]
    Upward,
    /// Toward increasing y (screen down)
    Downward,
}

impl GrowthDirection {
    /// Trunk angle in degrees, clockwise from the positive x-axis
    pub fn trunk_angle(self) -> f64 {
        match self {
            GrowthDirection::Upward => 270.0,
            GrowthDirection::Downward => 90.0,
        }
    }

    /// Sign applied to the trunk's y extent
    pub fn y_sign(self) -> f64 {
        match self {
            GrowthDirection::Upward => -1.0,
            GrowthDirection::Downward => 1.0,
        }
    }
}

/// Parameters for tree growth.
///
/// Fixed for the duration of a growth session; changes made through
/// [`GrowthConfig::apply`] only affect branches created afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub trunk_color: Rgb,
    pub leaf_colors: Vec<Rgb>,
    pub bg_color: Rgb,
    pub base_length: f64,
    /// Degrees each child turns away from its parent
    pub angle_variation: f64,
    /// Child length as a fraction of the parent's
    pub length_factor: f64,
    pub max_depth: u32,
    pub trunk_thickness: f64,
    pub thickness_factor: f64,
    /// Fractional jitter applied to angles and lengths (0 = deterministic)
    pub randomness: f64,
    pub direction: GrowthDirection,

    // Cosmetic, not part of growth
    pub smooth_lines: bool,
    pub show_grid: bool,
    pub auto_grow: bool,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200,
            canvas_height: 800,
            trunk_color: Rgb::new(0x7c, 0x2d, 0x12), // Dark brown
            leaf_colors: vec![
                Rgb::new(0x16, 0x65, 0x34), // Deep green
                Rgb::new(0x22, 0xc5, 0x5e), // Bright green
                Rgb::new(0xf5, 0x9e, 0x0b), // Amber tips
            ],
            bg_color: Rgb::new(0x0f, 0x17, 0x2a), // Night slate
            base_length: 180.0,
            angle_variation: 35.0,
            length_factor: 0.65,
            max_depth: 8,
            trunk_thickness: 20.0,
            thickness_factor: 0.75,
            randomness: 0.1,
            direction: GrowthDirection::Upward,
            smooth_lines: true,
            show_grid: false,
            auto_grow: false,
        }
    }
}

impl GrowthConfig {
    /// Check the configuration is usable for planting and growth.
    ///
    /// `max_depth == 0` passes here; it is only rejected when growth is
    /// attempted.
    pub fn validate(&self) -> Result<()> {
        if self.leaf_colors.is_empty() {
            return invalid("leaf color palette is empty");
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return invalid("canvas extents must be non-zero");
        }
        let numbers = [
            ("base_length", self.base_length),
            ("angle_variation", self.angle_variation),
            ("length_factor", self.length_factor),
            ("trunk_thickness", self.trunk_thickness),
            ("thickness_factor", self.thickness_factor),
            ("randomness", self.randomness),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                return invalid(&format!("{} must be finite, got {}", name, value));
            }
        }
        if self.base_length <= 0.0 {
            return invalid("base_length must be positive");
        }
        if self.trunk_thickness <= 0.0 {
            return invalid("trunk_thickness must be positive");
        }
        if self.randomness < 0.0 {
            return invalid("randomness must not be negative");
        }
        Ok(())
    }

    /// Apply a partial update, returning the merged configuration.
    ///
    /// The receiver is untouched if the merged result fails validation.
    pub fn apply(&self, update: &ConfigUpdate) -> Result<GrowthConfig> {
        let mut next = self.clone();
        if let Some(v) = update.canvas_width {
            next.canvas_width = v;
        }
        if let Some(v) = update.canvas_height {
            next.canvas_height = v;
        }
        if let Some(v) = update.trunk_color {
            next.trunk_color = v;
        }
        if let Some(ref v) = update.leaf_colors {
            next.leaf_colors = v.clone();
        }
        if let Some(v) = update.bg_color {
            next.bg_color = v;
        }
        if let Some(v) = update.base_length {
            next.base_length = v;
        }
        if let Some(v) = update.angle_variation {
            next.angle_variation = v;
        }
        if let Some(v) = update.length_factor {
            next.length_factor = v;
        }
        if let Some(v) = update.max_depth {
            next.max_depth = v;
        }
        if let Some(v) = update.trunk_thickness {
            next.trunk_thickness = v;
        }
        if let Some(v) = update.thickness_factor {
            next.thickness_factor = v;
        }
        if let Some(v) = update.randomness {
            next.randomness = v;
        }
        if let Some(v) = update.direction {
            next.direction = v;
        }
        if let Some(v) = update.smooth_lines {
            next.smooth_lines = v;
        }
        if let Some(v) = update.show_grid {
            next.show_grid = v;
        }
        if let Some(v) = update.auto_grow {
            next.auto_grow = v;
        }
        next.validate()?;
        Ok(next)
    }
}

fn invalid<T>(msg: &str) -> Result<T> {
    Err(GrowthError::InvalidConfiguration(msg.to_string()))
}

/// Parse a single `#rrggbb` color
pub fn parse_color(s: &str) -> Result<Rgb> {
    Ok(s.trim().parse::<Rgb>()?)
}

/// Parse a comma-separated palette such as `#166534,#22c55e,#f59e0b`
pub fn parse_palette(list: &str) -> Result<Vec<Rgb>> {
    let colors = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_color)
        .collect::<Result<Vec<_>>>()?;
    if colors.is_empty() {
        return invalid("leaf color palette is empty");
    }
    Ok(colors)
}

/// A partial configuration: every `Some` field overrides the current value.
///
/// Also the shape of the `[tree]` table in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    pub canvas_width: Option<u32>,
    pub canvas_height: Option<u32>,
    pub trunk_color: Option<Rgb>,
    pub leaf_colors: Option<Vec<Rgb>>,
    pub bg_color: Option<Rgb>,
    pub base_length: Option<f64>,
    pub angle_variation: Option<f64>,
    pub length_factor: Option<f64>,
    pub max_depth: Option<u32>,
    pub trunk_thickness: Option<f64>,
    pub thickness_factor: Option<f64>,
    pub randomness: Option<f64>,
    pub direction: Option<GrowthDirection>,
    pub smooth_lines: Option<bool>,
    pub show_grid: Option<bool>,
    pub auto_grow: Option<bool>,
}

impl ConfigUpdate {
    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(mut self, other: ConfigUpdate) -> ConfigUpdate {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        take!(
            canvas_width,
            canvas_height,
            trunk_color,
            leaf_colors,
            bg_color,
            base_length,
            angle_variation,
            length_factor,
            max_depth,
            trunk_thickness,
            thickness_factor,
            randomness,
            direction,
            smooth_lines,
            show_grid,
            auto_grow
        );
        self
    }
}

/// Built-in tree styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Default green-to-amber tree
    #[default]
    Classic,
    /// Large, deep tree on a wide canvas
    Grand,
    /// Blue tones
    Winter,
    /// Gold to orange-red on beige
    Autumn,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Classic,
        Preset::Grand,
        Preset::Winter,
        Preset::Autumn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Grand => "grand",
            Preset::Winter => "winter",
            Preset::Autumn => "autumn",
        }
    }

    pub fn config(self) -> GrowthConfig {
        let base = GrowthConfig::default();
        match self {
            Preset::Classic => base,
            Preset::Grand => GrowthConfig {
                canvas_width: 1400,
                canvas_height: 900,
                trunk_color: Rgb::new(0x5c, 0x40, 0x33),
                leaf_colors: vec![
                    Rgb::new(0x2e, 0x8b, 0x57),
                    Rgb::new(0x3c, 0xb3, 0x71),
                    Rgb::new(0xff, 0xa5, 0x00),
                ],
                bg_color: Rgb::new(0x1a, 0x1a, 0x2e),
                base_length: 200.0,
                angle_variation: 40.0,
                length_factor: 0.7,
                max_depth: 10,
                trunk_thickness: 25.0,
                thickness_factor: 0.8,
                randomness: 0.15,
                ..base
            },
            Preset::Winter => GrowthConfig {
                trunk_color: Rgb::new(0x4a, 0x35, 0x20),
                leaf_colors: vec![
                    Rgb::new(0x46, 0x82, 0xb4), // Steel blue
                    Rgb::new(0x87, 0xce, 0xeb),
                    Rgb::new(0xb0, 0xe0, 0xe6), // Powder blue
                ],
                bg_color: Rgb::new(0x2c, 0x3e, 0x50),
                ..base
            },
            Preset::Autumn => GrowthConfig {
                trunk_color: Rgb::new(0x8b, 0x45, 0x13),
                leaf_colors: vec![
                    Rgb::new(0xff, 0xd7, 0x00), // Gold
                    Rgb::new(0xff, 0x8c, 0x00),
                    Rgb::new(0xff, 0x45, 0x00), // Orange red
                ],
                bg_color: Rgb::new(0xf5, 0xf5, 0xdc),
                base_length: 220.0,
                angle_variation: 30.0,
                ..base
            },
        }
    }
}

impl FromStr for Preset {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "default" => Ok(Preset::Classic),
            "grand" | "large" | "custom" => Ok(Preset::Grand),
            "winter" | "blue" => Ok(Preset::Winter),
            "autumn" | "fall" => Ok(Preset::Autumn),
            _ => Err(GrowthError::InvalidConfiguration(format!(
                "unknown preset {:?} (available: classic, grand, winter, autumn)",
                s
            ))),
        }
    }
}
