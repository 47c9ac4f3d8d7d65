//! Terminal host for the growth engine: interactive viewer and print mode.

use crate::branch::{clip_segment, Branch, Point};
use crate::config::{ConfigUpdate, GrowthConfig};
use crate::engine::GrowthEngine;
use crate::help::render_help_overlay;
use crate::random::UniformSource;
use crate::terminal::{rgb, Terminal};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;
use tracing::debug;

const HELP: &str = "\
FRACTAL TREE
─────────────────────
Space  Grow one level
f      Grow full tree
r      Reset
c      Randomize colors
g      Toggle grid
q/Esc  Quit
?      Close help";

const STATUS_COLOR: Color = Color::Grey;
const ERROR_COLOR: Color = Color::Yellow;
const GRID_COLOR: Color = Color::DarkGrey;
const BOLD_THICKNESS: f64 = 8.0;

/// Options for the interactive viewer
#[derive(Clone, Debug)]
pub struct ViewOptions {
    /// Grow one level every `time_step` seconds
    pub auto: bool,
    pub time_step: f32,
    /// Planting point in canvas coordinates; bottom center when unset
    pub plant_at: Option<Point>,
}

/// Where a tree is planted when no point is given
pub fn default_planting_point(config: &GrowthConfig) -> Point {
    Point::new(
        (config.canvas_width / 2) as f64,
        config.canvas_height.saturating_sub(100) as f64,
    )
}

/// Maps canvas coordinates onto the terminal cell grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale_x: f64,
    scale_y: f64,
    cols: u16,
    rows: u16,
}

impl Viewport {
    /// Fit the whole canvas into `cols` x `rows` cells
    pub fn fit(config: &GrowthConfig, cols: u16, rows: u16) -> Self {
        Self {
            scale_x: cols as f64 / config.canvas_width as f64,
            scale_y: rows as f64 / config.canvas_height as f64,
            cols,
            rows,
        }
    }

    pub fn to_cell(&self, p: Point) -> (f64, f64) {
        (p.x * self.scale_x, p.y * self.scale_y)
    }
}

/// Pick a glyph for a segment from its direction in cell space
fn glyph(dx: f64, dy: f64) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > ay * 2.0 {
        '_'
    } else if ay > ax * 2.0 {
        '|'
    } else if (dx > 0.0) == (dy < 0.0) {
        '/'
    } else {
        '\\'
    }
}

/// Rasterize the visible part of one branch into the cell buffer with a
/// DDA walk
fn plot_branch(term: &mut Terminal, view: &Viewport, branch: &Branch) {
    let (x0, y0) = view.to_cell(branch.start);
    let (x1, y1) = view.to_cell(branch.end);
    let ch = glyph(x1 - x0, y1 - y0);
    let color = Some(rgb(branch.color));
    let bold = branch.thickness >= BOLD_THICKNESS;

    let (start, end) = (Point::new(x0, y0), Point::new(x1, y1));
    let grid = Point::new(view.cols as f64, view.rows as f64);
    let Some((from, to)) = clip_segment(start, end, Point::default(), grid) else {
        return;
    };
    let (x0, y0) = (from.x, from.y);
    let (dx, dy) = (to.x - x0, to.y - y0);

    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (x0 + dx * t).floor() as i32;
        let y = (y0 + dy * t).floor() as i32;
        term.set(x, y, ch, color, bold);
    }
}

/// Draw every branch, plus the grid when enabled
pub fn plot_tree(
    term: &mut Terminal,
    view: &Viewport,
    config: &GrowthConfig,
    branches: &[Branch],
) {
    if config.show_grid {
        for gy in (0..config.canvas_height).step_by(50) {
            for gx in (0..config.canvas_width).step_by(50) {
                let (x, y) = view.to_cell(Point::new(gx as f64, gy as f64));
                term.set(x as i32, y as i32, '·', Some(GRID_COLOR), false);
            }
        }
        let (cx, _) = view.to_cell(Point::new(config.canvas_width as f64 / 2.0, 0.0));
        for y in 0..view.rows as i32 {
            term.set(cx as i32, y, '┆', Some(GRID_COLOR), false);
        }
    }

    // Insertion order: deeper generations paint over their parents
    for branch in branches {
        plot_branch(term, view, branch);
    }
}

/// What the host loop should do after a key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Per-session viewer state kept outside the engine
#[derive(Debug, Default)]
pub struct ViewerState {
    pub show_help: bool,
    /// Last engine message, shown on the status line until the next key
    pub message: Option<String>,
}

impl ViewerState {
    /// Apply a key press to the engine.
    ///
    /// Engine errors become status messages; they never end the session.
    pub fn handle_key<S: UniformSource>(
        &mut self,
        engine: &mut GrowthEngine<S>,
        code: KeyCode,
    ) -> Action {
        self.message = None;

        if self.show_help {
            return match code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('?') => {
                    self.show_help = false;
                    Action::Continue
                }
                _ => Action::Continue,
            };
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char(' ') => {
                if engine.is_empty() {
                    let at = engine
                        .planted_at()
                        .unwrap_or_else(|| default_planting_point(engine.config()));
                    engine.plant_trunk(at.x, at.y);
                } else if let Err(err) = engine.grow_one_level() {
                    self.message = Some(err.to_string());
                }
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                if let Err(err) = engine.grow_full_tree() {
                    self.message = Some(err.to_string());
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => engine.reset(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                engine.randomize_colors();
                self.message = Some("Colors randomized; reset and regrow to recolor".into());
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let update = ConfigUpdate {
                    show_grid: Some(!engine.config().show_grid),
                    ..ConfigUpdate::default()
                };
                if let Err(err) = engine.update_config(&update) {
                    self.message = Some(err.to_string());
                }
            }
            _ => {}
        }
        Action::Continue
    }

    /// Compose a full frame: tree, status line, optional help box
    pub fn draw<S: UniformSource>(&self, term: &mut Terminal, engine: &GrowthEngine<S>) {
        term.clear();
        let (cols, rows) = term.size();
        let tree_rows = rows.saturating_sub(1);
        let view = Viewport::fit(engine.config(), cols, tree_rows);
        plot_tree(term, &view, engine.config(), engine.branches());

        let status_y = tree_rows as i32;
        match &self.message {
            Some(msg) => term.set_str(0, status_y, msg, Some(ERROR_COLOR), true),
            None => {
                let line = format!("{}  (? for help)", engine.stats().status());
                term.set_str(0, status_y, &line, Some(STATUS_COLOR), false);
            }
        }

        if self.show_help {
            render_help_overlay(term, HELP);
        }
    }
}

/// Run the interactive viewer until the user quits
pub fn run<S: UniformSource>(
    engine: &mut GrowthEngine<S>,
    options: &ViewOptions,
) -> io::Result<()> {
    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let at = options
        .plant_at
        .unwrap_or_else(|| default_planting_point(engine.config()));
    engine.plant_trunk(at.x, at.y);

    let mut state = ViewerState::default();
    let auto = options.auto || engine.config().auto_grow;
    let tick_ms = (options.time_step.max(0.0) * 1000.0) as u64;

    loop {
        if term.refresh_size()? {
            term.clear_screen()?;
        }
        state.draw(&mut term, engine);
        term.render()?;

        let timeout = if auto { tick_ms } else { 100 };
        match term.wait_key(timeout)? {
            Some(code) => {
                debug!(?code, "key press");
                if state.handle_key(engine, code) == Action::Quit {
                    break;
                }
            }
            None => {
                if auto && !state.show_help && !engine.is_complete() && !engine.is_empty() {
                    if let Err(err) = engine.grow_one_level() {
                        state.message = Some(err.to_string());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Render the tree once to stdout with ANSI colors
pub fn print<S: UniformSource, W: io::Write>(
    engine: &GrowthEngine<S>,
    cols: u16,
    rows: u16,
    out: &mut W,
) -> io::Result<()> {
    let mut term = Terminal::headless(cols, rows);
    let view = Viewport::fit(engine.config(), cols, rows);
    plot_tree(&mut term, &view, engine.config(), engine.branches());
    term.write_ansi(out)
}
