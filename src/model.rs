//! Depth-driven color and thickness for branches.
//!
//! Pure functions of `(depth, config)`; identical inputs always give identical
//! output even though branch geometry is randomized.

use crate::color::Rgb;
use crate::config::GrowthConfig;

/// Color of a branch at `depth`.
///
/// The trunk uses the trunk color. Deeper branches walk the leaf palette as a
/// gradient, reaching the last entry at `max_depth`.
pub fn color_at(depth: u32, config: &GrowthConfig) -> Rgb {
    if depth == 0 {
        return config.trunk_color;
    }
    let palette = &config.leaf_colors;
    let last = match palette.last() {
        Some(&c) => c,
        None => return config.trunk_color,
    };
    if depth >= config.max_depth {
        return last;
    }

    let progress = depth as f64 / config.max_depth as f64;
    let position = progress * (palette.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(palette.len() - 1);
    let fraction = position - lower as f64;

    palette[lower].lerp(palette[upper], fraction)
}

/// Stroke width at `depth`: exponential decay from the trunk, never below 1.
pub fn thickness_at(depth: u32, config: &GrowthConfig) -> f64 {
    let decayed = config.trunk_thickness * config.thickness_factor.powi(depth as i32);
    decayed.max(1.0)
}
