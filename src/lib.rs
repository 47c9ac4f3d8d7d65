//! Fractal tree growth engine.
//!
//! [`GrowthEngine`] plants a trunk and grows the tree one generation at a
//! time; [`model`] derives branch color and thickness from depth. The
//! [`viewer`] and [`export`] modules are hosts that only read the engine's
//! branch list.

pub mod branch;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod help;
pub mod model;
pub mod random;
pub mod settings;
pub mod stats;
pub mod terminal;
pub mod viewer;

pub use branch::{Branch, BranchId, Point};
pub use color::Rgb;
pub use config::{ConfigUpdate, GrowthConfig, GrowthDirection, Preset};
pub use engine::GrowthEngine;
pub use error::{ColorParseError, GrowthError};
pub use random::UniformSource;
pub use stats::TreeStats;
