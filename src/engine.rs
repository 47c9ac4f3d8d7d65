//! Tree growth state machine.
//!
//! The engine owns the branch arena: branches are appended in creation order
//! and their ids are their indices, so `parent_id` links can be followed with
//! plain indexing. Nothing is ever mutated after it is appended; planting and
//! resetting clear the arena wholesale.

use crate::branch::{Branch, BranchId, Point};
use crate::color::{random_palette, RANDOM_TRUNK};
use crate::config::{ConfigUpdate, GrowthConfig};
use crate::error::{GrowthError, Result};
use crate::model::{color_at, thickness_at};
use crate::random::UniformSource;
use crate::stats::TreeStats;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace, warn};

/// Grows a fractal tree one generation at a time.
#[derive(Debug, Clone)]
pub struct GrowthEngine<S = StdRng> {
    config: GrowthConfig,
    branches: Vec<Branch>,
    depth: u32,
    next_id: BranchId,
    planted_at: Option<Point>,
    rng: S,
}

impl GrowthEngine<StdRng> {
    /// Engine with an entropy-seeded random source
    pub fn new(config: GrowthConfig) -> Result<Self> {
        Self::with_source(config, StdRng::from_entropy())
    }

    /// Engine whose geometry is reproducible for a given seed
    pub fn seeded(config: GrowthConfig, seed: u64) -> Result<Self> {
        Self::with_source(config, StdRng::seed_from_u64(seed))
    }
}

impl<S: UniformSource> GrowthEngine<S> {
    pub fn with_source(config: GrowthConfig, rng: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            branches: Vec::new(),
            depth: 0,
            next_id: 0,
            planted_at: None,
            rng,
        })
    }

    /// Discard the current tree and plant a new trunk at `(x, y)`.
    ///
    /// Coordinates are not bounds-checked; a trunk may extend off-canvas.
    pub fn plant_trunk(&mut self, x: f64, y: f64) -> &Branch {
        self.clear();
        self.planted_at = Some(Point::new(x, y));

        let start = Point::new(x, y);
        let dir = self.config.direction;
        let end = Point::new(x, y + dir.y_sign() * self.config.base_length);

        let trunk = Branch {
            id: self.alloc_id(),
            parent_id: None,
            start,
            end,
            depth: 0,
            length: self.config.base_length,
            angle: dir.trunk_angle(),
            thickness: self.config.trunk_thickness,
            color: self.config.trunk_color,
        };
        debug!(x, y, direction = ?dir, "planted trunk");
        self.branches.push(trunk);
        &self.branches[0]
    }

    /// Grow two children from every terminal branch.
    ///
    /// Returns the new generation. On error the tree is left as it was.
    pub fn grow_one_level(&mut self) -> Result<&[Branch]> {
        if self.branches.is_empty() {
            warn!("growth requested before planting");
            return Err(GrowthError::EmptyTree);
        }
        if self.config.max_depth == 0 {
            warn!("growth requested with max_depth = 0");
            return Err(GrowthError::InvalidConfiguration(
                "max_depth must be positive to grow".to_string(),
            ));
        }
        if self.depth >= self.config.max_depth {
            debug!(depth = self.depth, "maximum depth reached");
            return Err(GrowthError::MaxDepthReached {
                max_depth: self.config.max_depth,
            });
        }

        let child_depth = self.depth + 1;
        let thickness = thickness_at(child_depth, &self.config);
        let color = color_at(child_depth, &self.config);
        let spread = self.config.angle_variation;
        let randomness = self.config.randomness;
        let length_factor = self.config.length_factor;

        let first_new = self.branches.len();
        let terminals: Vec<(BranchId, Point, f64, f64)> = self
            .branches
            .iter()
            .filter(|b| b.depth == self.depth)
            .map(|b| (b.id, b.end, b.angle, b.length))
            .collect();

        let mut generation = Vec::with_capacity(terminals.len() * 2);
        for (parent_id, origin, parent_angle, parent_length) in terminals {
            for offset in [-spread, spread] {
                // Angle jitter spans +-R, length jitter only +-R/2
                let offset = offset * (1.0 + (self.rng.next_unit() - 0.5) * 2.0 * randomness);
                let angle = parent_angle + offset;
                let length = parent_length
                    * length_factor
                    * (1.0 + (self.rng.next_unit() - 0.5) * randomness);

                generation.push(Branch {
                    id: self.alloc_id(),
                    parent_id: Some(parent_id),
                    start: origin,
                    end: origin.project(angle, length),
                    depth: child_depth,
                    length,
                    angle,
                    thickness,
                    color,
                });
            }
        }

        trace!(
            count = generation.len(),
            depth = child_depth,
            "new generation"
        );
        self.branches.extend(generation);
        self.depth = child_depth;
        Ok(&self.branches[first_new..])
    }

    /// Grow until `max_depth`. Already being at max depth is not an error.
    pub fn grow_full_tree(&mut self) -> Result<()> {
        if self.branches.is_empty() {
            warn!("full growth requested before planting");
            return Err(GrowthError::EmptyTree);
        }
        while self.depth < self.config.max_depth {
            self.grow_one_level()?;
        }
        debug!(
            depth = self.depth,
            branches = self.branches.len(),
            "tree fully grown"
        );
        Ok(())
    }

    /// Drop all branches. Configuration and planting point are kept.
    pub fn reset(&mut self) {
        debug!(branches = self.branches.len(), "reset tree");
        self.clear();
    }

    /// Merge `update` into the configuration for subsequent growth.
    ///
    /// Existing branches keep the color and thickness they were created with.
    pub fn update_config(&mut self, update: &ConfigUpdate) -> Result<()> {
        self.config = self.config.apply(update)?;
        debug!("configuration updated");
        Ok(())
    }

    /// Replace the configuration wholesale after validating it.
    pub fn set_config(&mut self, config: GrowthConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Swap in a random harmonious palette with a brown trunk.
    ///
    /// Like any configuration change this only colors branches grown later;
    /// replant and regrow to see it on the whole tree.
    pub fn randomize_colors(&mut self) {
        let leaf_colors = random_palette(&mut self.rng);
        debug!(?leaf_colors, "randomized palette");
        self.config.trunk_color = RANDOM_TRUNK;
        self.config.leaf_colors = leaf_colors;
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id)
    }

    /// The branch `branch` grew from, or `None` for the trunk
    pub fn parent_of(&self, branch: &Branch) -> Option<&Branch> {
        branch.parent_id.and_then(|id| self.branch(id))
    }

    /// Branches eligible to spawn children on the next growth step
    pub fn terminal_branches(&self) -> impl Iterator<Item = &Branch> {
        let depth = self.depth;
        self.branches.iter().filter(move |b| b.depth == depth)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn planted_at(&self) -> Option<Point> {
        self.planted_at
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.branches.is_empty() && self.depth >= self.config.max_depth
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(self)
    }

    fn alloc_id(&mut self) -> BranchId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clear(&mut self) {
        self.branches.clear();
        self.depth = 0;
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthDirection;
    use crate::random::{Fixed, Sequence};

    fn still(config: GrowthConfig) -> GrowthEngine<Fixed> {
        GrowthEngine::with_source(config, Fixed(0.5)).unwrap()
    }

    #[test]
    fn trunk_points_up_by_default() {
        let mut engine = still(GrowthConfig::default());
        let trunk = engine.plant_trunk(600.0, 700.0).clone();
        assert_eq!(trunk.start, Point::new(600.0, 700.0));
        assert_eq!(trunk.end, Point::new(600.0, 520.0));
        assert_eq!(trunk.angle, 270.0);
        assert_eq!(trunk.id, 0);
        assert!(trunk.is_trunk());
        assert_eq!(engine.planted_at(), Some(Point::new(600.0, 700.0)));
    }

    #[test]
    fn downward_trunk() {
        let cfg = GrowthConfig {
            direction: GrowthDirection::Downward,
            ..GrowthConfig::default()
        };
        let mut engine = still(cfg);
        let trunk = engine.plant_trunk(10.0, 10.0).clone();
        assert_eq!(trunk.end, Point::new(10.0, 190.0));
        assert_eq!(trunk.angle, 90.0);
    }

    #[test]
    fn children_are_ordered_negative_offset_first() {
        let cfg = GrowthConfig {
            randomness: 0.0,
            ..GrowthConfig::default()
        };
        let mut engine = still(cfg);
        engine.plant_trunk(0.0, 0.0);
        engine.grow_one_level().unwrap();
        let angles: Vec<f64> = engine.branches()[1..].iter().map(|b| b.angle).collect();
        assert_eq!(angles, vec![235.0, 305.0]);

        engine.grow_one_level().unwrap();
        let parents: Vec<Option<BranchId>> =
            engine.branches()[3..].iter().map(|b| b.parent_id).collect();
        assert_eq!(parents, vec![Some(1), Some(1), Some(2), Some(2)]);
        let ids: Vec<BranchId> = engine.branches().iter().map(|b| b.id).collect();
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn terminal_branches_are_the_newest_generation() {
        let mut engine = still(GrowthConfig::default());
        assert_eq!(engine.terminal_branches().count(), 0);

        engine.plant_trunk(0.0, 0.0);
        let trunk: Vec<BranchId> = engine.terminal_branches().map(|b| b.id).collect();
        assert_eq!(trunk, vec![0]);

        engine.grow_one_level().unwrap();
        engine.grow_one_level().unwrap();
        let tips: Vec<BranchId> = engine.terminal_branches().map(|b| b.id).collect();
        assert_eq!(tips, vec![3, 4, 5, 6]);
        let depth = engine.depth();
        assert!(engine.terminal_branches().all(|b| b.depth == depth));
    }

    #[test]
    fn jitter_extremes_follow_asymmetric_ranges() {
        // U = 0 for angle, U2 = 0 for length: angle scaled by 1 - R, length by 1 - R/2
        let cfg = GrowthConfig {
            randomness: 0.2,
            ..GrowthConfig::default()
        };
        let mut engine = GrowthEngine::with_source(cfg, Sequence::new(vec![0.0])).unwrap();
        engine.plant_trunk(0.0, 0.0);
        let gen = engine.grow_one_level().unwrap().to_vec();
        let left = &gen[0];
        assert!((left.angle - (270.0 - 35.0 * 0.8)).abs() < 1e-9);
        assert!((left.length - 180.0 * 0.65 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn empty_tree_rejects_growth() {
        let mut engine = still(GrowthConfig::default());
        assert_eq!(engine.grow_one_level().unwrap_err(), GrowthError::EmptyTree);
        assert_eq!(engine.grow_full_tree().unwrap_err(), GrowthError::EmptyTree);
        assert!(engine.branches().is_empty());
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn max_depth_stops_single_steps() {
        let cfg = GrowthConfig {
            max_depth: 2,
            ..GrowthConfig::default()
        };
        let mut engine = still(cfg);
        engine.plant_trunk(0.0, 0.0);
        engine.grow_one_level().unwrap();
        engine.grow_one_level().unwrap();
        let before = engine.branches().to_vec();
        assert_eq!(
            engine.grow_one_level().unwrap_err(),
            GrowthError::MaxDepthReached { max_depth: 2 }
        );
        assert_eq!(engine.branches(), &before[..]);
        assert!(engine.is_complete());
    }

    #[test]
    fn zero_max_depth_rejects_growth_but_full_growth_is_a_no_op() {
        let cfg = GrowthConfig {
            max_depth: 0,
            ..GrowthConfig::default()
        };
        let mut engine = still(cfg);
        engine.plant_trunk(0.0, 0.0);
        assert!(matches!(
            engine.grow_one_level(),
            Err(GrowthError::InvalidConfiguration(_))
        ));
        assert!(engine.grow_full_tree().is_ok());
        assert_eq!(engine.branches().len(), 1);
    }

    #[test]
    fn reset_keeps_config_and_planting_point() {
        let mut engine = still(GrowthConfig::default());
        engine.plant_trunk(5.0, 6.0);
        engine.grow_one_level().unwrap();
        engine.reset();
        assert!(engine.is_empty());
        assert_eq!(engine.depth(), 0);
        assert_eq!(engine.planted_at(), Some(Point::new(5.0, 6.0)));
        // ids restart after reset + replant
        assert_eq!(engine.plant_trunk(5.0, 6.0).id, 0);
    }

    #[test]
    fn replanting_discards_previous_tree() {
        let mut engine = still(GrowthConfig::default());
        engine.plant_trunk(0.0, 0.0);
        engine.grow_full_tree().unwrap();
        engine.plant_trunk(1.0, 1.0);
        assert_eq!(engine.branches().len(), 1);
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn randomized_colors_only_affect_new_branches() {
        let mut engine = still(GrowthConfig::default());
        engine.plant_trunk(0.0, 0.0);
        engine.grow_one_level().unwrap();
        let old = engine.branches().to_vec();
        engine.randomize_colors();
        assert_eq!(engine.config().trunk_color, RANDOM_TRUNK);
        assert_eq!(engine.branches(), &old[..]);
    }

    #[test]
    fn rejected_update_leaves_config() {
        let mut engine = still(GrowthConfig::default());
        let bad = ConfigUpdate {
            randomness: Some(-1.0),
            ..ConfigUpdate::default()
        };
        assert!(engine.update_config(&bad).is_err());
        assert_eq!(engine.config(), &GrowthConfig::default());
    }

    #[test]
    fn set_config_validates_and_keeps_the_tree() {
        let mut engine = still(GrowthConfig::default());
        engine.plant_trunk(0.0, 0.0);
        engine.grow_one_level().unwrap();

        let bad = GrowthConfig {
            canvas_width: 0,
            ..GrowthConfig::default()
        };
        assert!(matches!(
            engine.set_config(bad),
            Err(GrowthError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.config(), &GrowthConfig::default());

        let deeper = GrowthConfig {
            max_depth: 12,
            ..GrowthConfig::default()
        };
        engine.set_config(deeper.clone()).unwrap();
        assert_eq!(engine.config(), &deeper);
        assert_eq!(engine.branches().len(), 3);
        assert_eq!(engine.depth(), 1);
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let cfg = GrowthConfig {
            leaf_colors: vec![],
            ..GrowthConfig::default()
        };
        assert!(GrowthEngine::with_source(cfg, Fixed(0.5)).is_err());
    }
}
