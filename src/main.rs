use clap::{Args, Parser, Subcommand};
use fractree::config::{parse_color, parse_palette};
use fractree::export::{self, TreeDocument};
use fractree::settings::Settings;
use fractree::viewer::{self, ViewOptions};
use fractree::{
    ConfigUpdate, GrowthConfig, GrowthDirection, GrowthEngine, GrowthError, Point, Preset,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fractree")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Fractal tree generator: grow branching trees level by level", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Tree options shared by every subcommand
#[derive(Args, Clone)]
struct TreeArgs {
    /// Style preset: classic, grand, winter, autumn
    #[arg(short, long)]
    preset: Option<String>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum growth depth
    #[arg(short, long)]
    depth: Option<u32>,

    /// Branch angle variation in degrees
    #[arg(short, long)]
    angle: Option<f64>,

    /// Child length as a fraction of the parent (0-1)
    #[arg(short = 'L', long)]
    length: Option<f64>,

    /// Trunk length in canvas pixels
    #[arg(short = 'b', long)]
    base_length: Option<f64>,

    /// Jitter applied to angles and lengths (0 = symmetric tree)
    #[arg(short, long)]
    randomness: Option<f64>,

    /// Trunk color (#rrggbb)
    #[arg(long)]
    trunk_color: Option<String>,

    /// Leaf palette, comma-separated (#rrggbb,#rrggbb,...)
    #[arg(short = 'c', long)]
    leaves: Option<String>,

    /// Background color (#rrggbb)
    #[arg(long)]
    background: Option<String>,

    /// Grow the trunk downward instead of up
    #[arg(long)]
    downward: bool,

    /// Draw a reference grid
    #[arg(short, long)]
    grid: bool,

    /// Planting point x (canvas pixels, default: center)
    #[arg(short = 'x', long)]
    x: Option<f64>,

    /// Planting point y (canvas pixels, default: 100 above the bottom)
    #[arg(short = 'y', long)]
    y: Option<f64>,

    /// Settings file (default: <config dir>/fractree/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); FRACTREE_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a tree interactively in the terminal
    View {
        #[command(flatten)]
        tree: TreeArgs,

        /// Grow one level automatically every --time seconds
        #[arg(long)]
        auto: bool,

        /// Auto-growth step delay in seconds
        #[arg(short, long, default_value = "0.5")]
        time: f32,
    },

    /// Grow a full tree and print it to stdout
    Print {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Grow a full tree and save it as PNG and/or JSON
    Export {
        #[command(flatten)]
        tree: TreeArgs,

        /// PNG output path (default: fractal_tree_<timestamp>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the branch list and settings as JSON
        #[arg(short, long)]
        json: Option<PathBuf>,
    },

    /// Grow a full tree and print branch statistics
    Info {
        #[command(flatten)]
        tree: TreeArgs,
    },
}

impl TreeArgs {
    fn overrides(&self) -> Result<ConfigUpdate, GrowthError> {
        Ok(ConfigUpdate {
            trunk_color: self.trunk_color.as_deref().map(parse_color).transpose()?,
            leaf_colors: self.leaves.as_deref().map(parse_palette).transpose()?,
            bg_color: self.background.as_deref().map(parse_color).transpose()?,
            max_depth: self.depth,
            angle_variation: self.angle,
            length_factor: self.length,
            base_length: self.base_length,
            randomness: self.randomness,
            direction: self.downward.then_some(GrowthDirection::Downward),
            show_grid: self.grid.then_some(true),
            ..ConfigUpdate::default()
        })
    }

    /// Preset, then settings file, then command-line flags
    fn resolve_config(&self) -> Result<GrowthConfig, String> {
        let settings = match &self.config {
            Some(path) => Settings::load_from(path).map_err(|e| e.to_string())?,
            None => Settings::load(),
        };

        let preset = match &self.preset {
            Some(name) => name.parse::<Preset>().map_err(|e| e.to_string())?,
            None => settings.preset.unwrap_or_default(),
        };

        let overrides = self.overrides().map_err(|e| e.to_string())?;
        let update = settings.tree.merge(overrides);
        preset.config().apply(&update).map_err(|e| e.to_string())
    }

    fn engine(&self) -> Result<GrowthEngine, String> {
        let config = self.resolve_config()?;
        let engine = match self.seed {
            Some(seed) => GrowthEngine::seeded(config, seed),
            None => GrowthEngine::new(config),
        };
        engine.map_err(|e| e.to_string())
    }

    fn planting_point(&self, config: &GrowthConfig) -> Point {
        let fallback = viewer::default_planting_point(config);
        Point::new(self.x.unwrap_or(fallback.x), self.y.unwrap_or(fallback.y))
    }

    /// Plant at the requested point and grow to max depth
    fn grown(&self) -> Result<GrowthEngine, String> {
        let mut engine = self.engine()?;
        let at = self.planting_point(engine.config());
        engine.plant_trunk(at.x, at.y);
        engine.grow_full_tree().map_err(|e| e.to_string())?;
        Ok(engine)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("FRACTREE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn fail(msg: String) -> ! {
    eprintln!("fractree: {}", msg);
    process::exit(2);
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::View { tree, auto, time } => {
            init_logging(tree.verbose);
            let mut engine = tree.engine().unwrap_or_else(|e| fail(e));
            let plant_at = (tree.x.is_some() || tree.y.is_some())
                .then(|| tree.planting_point(engine.config()));
            let options = ViewOptions {
                auto,
                time_step: time,
                plant_at,
            };
            viewer::run(&mut engine, &options)?;
        }
        Commands::Print { tree } => {
            init_logging(tree.verbose);
            let engine = tree.grown().unwrap_or_else(|e| fail(e));
            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            let mut out = io::stdout().lock();
            viewer::print(&engine, cols, rows.saturating_sub(1).max(1), &mut out)?;
            out.flush()?;
        }
        Commands::Export { tree, output, json } => {
            init_logging(tree.verbose);
            let engine = tree.grown().unwrap_or_else(|e| fail(e));

            if let Some(path) = &json {
                TreeDocument::new(engine.config(), engine.branches())
                    .save(path)
                    .unwrap_or_else(|e| fail(e.to_string()));
                println!("Tree saved to: {}", path.display());
            }
            if output.is_some() || json.is_none() {
                let path = output.unwrap_or_else(|| export::default_filename().into());
                export::save_png(&path, engine.config(), engine.branches())
                    .unwrap_or_else(|e| fail(e.to_string()));
                println!("Tree saved to: {}", path.display());
            }
        }
        Commands::Info { tree } => {
            init_logging(tree.verbose);
            let engine = tree.grown().unwrap_or_else(|e| fail(e));
            println!("{}", engine.stats());
        }
    }

    Ok(())
}
