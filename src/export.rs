//! Writing trees out: JSON documents and rasterized PNG images.

use crate::branch::{clip_segment, Branch, Point};
use crate::color::Rgb;
use crate::config::GrowthConfig;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const GRID_SPACING: u32 = 50;
const GRID_LINE: Rgb = Rgb::new(0x33, 0x41, 0x55);
const GRID_CENTER: Rgb = Rgb::new(0x47, 0x55, 0x69);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no tree to save, plant a trunk first")]
    EmptyTree,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Field-for-field serialization of a tree and its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub config: GrowthConfig,
    pub branches: Vec<Branch>,
}

impl TreeDocument {
    pub fn new(config: &GrowthConfig, branches: &[Branch]) -> Self {
        Self {
            config: config.clone(),
            branches: branches.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        if self.branches.is_empty() {
            return Err(ExportError::EmptyTree);
        }
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), branches = self.branches.len(), "saved tree JSON");
        Ok(())
    }
}

/// Rasterize branches onto a canvas-sized image.
///
/// Each branch is drawn as `max(1, thickness)` one-pixel lines shifted
/// horizontally around the true segment.
pub fn render_image(config: &GrowthConfig, branches: &[Branch]) -> RgbImage {
    let bg = to_pixel(config.bg_color);
    let mut img = RgbImage::from_pixel(config.canvas_width, config.canvas_height, bg);

    if config.show_grid {
        draw_grid(&mut img);
    }

    let width = config.canvas_width as f64;
    for branch in branches {
        let thickness = (branch.thickness as i64).max(1);
        let half = thickness / 2;
        // Strokes shifted wholly past either side of the canvas draw nothing
        let min_x = branch.start.x.min(branch.end.x);
        let max_x = branch.start.x.max(branch.end.x);
        let first = (-half).max((-max_x - 1.0).floor() as i64);
        let last = (thickness - 1 - half).min((width - min_x + 1.0).ceil() as i64);
        for offset in first..=last {
            let offset = offset as f64;
            let shift = |p: Point| Point::new(p.x + offset, p.y);
            let (from, to) = (shift(branch.start), shift(branch.end));
            draw_line(&mut img, from, to, branch.color);
        }
    }
    img
}

/// Render and write a PNG. An empty tree is rejected.
pub fn save_png(
    path: &Path,
    config: &GrowthConfig,
    branches: &[Branch],
) -> Result<(), ExportError> {
    if branches.is_empty() {
        return Err(ExportError::EmptyTree);
    }
    let img = render_image(config, branches);
    img.save(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "saved tree image");
    Ok(())
}

/// Timestamped default name, e.g. `fractal_tree_20240131_235959.png`
pub fn default_filename() -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("fractal_tree_{}.png", stamp)
}

fn to_pixel(c: Rgb) -> image::Rgb<u8> {
    image::Rgb([c.r, c.g, c.b])
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, to_pixel(color));
    }
}

/// Bresenham walk between rounded endpoints, after clipping the segment to
/// the image so only visible pixels are visited.
fn draw_line(img: &mut RgbImage, from: Point, to: Point, color: Rgb) {
    let min = Point::new(-0.5, -0.5);
    let max = Point::new(img.width() as f64 - 0.5, img.height() as f64 - 0.5);
    let Some((from, to)) = clip_segment(from, to, min, max) else {
        return;
    };
    let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
    let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_grid(img: &mut RgbImage) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let (right, bottom) = ((w - 1) as f64, (h - 1) as f64);
    let vertical = |x: f64| (Point::new(x, 0.0), Point::new(x, bottom));
    let horizontal = |y: f64| (Point::new(0.0, y), Point::new(right, y));

    for x in (0..w).step_by(GRID_SPACING as usize) {
        let (top, foot) = vertical(x as f64);
        draw_line(img, top, foot, GRID_LINE);
    }
    for y in (0..h).step_by(GRID_SPACING as usize) {
        let (left, end) = horizontal(y as f64);
        draw_line(img, left, end, GRID_LINE);
    }
    let (cx, cy) = ((w / 2) as f64, (h / 2) as f64);
    for d in [0.0, 1.0] {
        let (top, foot) = vertical(cx + d);
        draw_line(img, top, foot, GRID_CENTER);
        let (left, end) = horizontal(cy + d);
        draw_line(img, left, end, GRID_CENTER);
    }
}
