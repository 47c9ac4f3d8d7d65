use crate::branch::Point;
use crate::config::GrowthDirection;
use crate::engine::GrowthEngine;
use crate::random::UniformSource;
use serde::Serialize;
use std::fmt;

/// Snapshot of a tree's shape and the settings that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStats {
    pub planted_at: Option<Point>,
    pub depth: u32,
    pub max_depth: u32,
    pub total_branches: usize,
    /// Branch count for each depth from 0 to `depth`
    pub per_depth: Vec<usize>,
    pub angle_variation: f64,
    pub base_length: f64,
    pub length_factor: f64,
    pub randomness: f64,
    pub direction: GrowthDirection,
}

impl TreeStats {
    pub fn collect<S: UniformSource>(engine: &GrowthEngine<S>) -> Self {
        let config = engine.config();
        let depth = engine.depth();
        let mut per_depth = vec![0usize; depth as usize + 1];
        for branch in engine.branches() {
            if let Some(slot) = per_depth.get_mut(branch.depth as usize) {
                *slot += 1;
            }
        }
        if engine.is_empty() {
            per_depth.clear();
        }

        Self {
            planted_at: engine.planted_at(),
            depth,
            max_depth: config.max_depth,
            total_branches: engine.branches().len(),
            per_depth,
            angle_variation: config.angle_variation,
            base_length: config.base_length,
            length_factor: config.length_factor,
            randomness: config.randomness,
            direction: config.direction,
        }
    }

    /// One-line status for a host's status bar
    pub fn status(&self) -> String {
        if self.total_branches == 0 {
            "Ready to plant trunk".to_string()
        } else if self.depth == 0 {
            "Trunk planted".to_string()
        } else {
            format!("Depth: {} | Branches: {}", self.depth, self.total_branches)
        }
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== TREE INFORMATION ===")?;
        writeln!(f, "Current Depth: {}/{}", self.depth, self.max_depth)?;
        writeln!(f, "Total Branches: {}", self.total_branches)?;
        match self.planted_at {
            Some(p) => writeln!(f, "Tree Center: ({}, {})", p.x, p.y)?,
            None => writeln!(f, "Tree Center: -")?,
        }

        writeln!(f)?;
        writeln!(f, "=== BRANCH DISTRIBUTION ===")?;
        for (depth, count) in self.per_depth.iter().enumerate() {
            writeln!(f, "Depth {}: {} branches", depth, count)?;
        }

        writeln!(f)?;
        writeln!(f, "=== CURRENT SETTINGS ===")?;
        writeln!(f, "Angle Variation: {}°", self.angle_variation)?;
        writeln!(f, "Base Length: {}", self.base_length)?;
        writeln!(f, "Length Factor: {}", self.length_factor)?;
        writeln!(f, "Max Depth: {}", self.max_depth)?;
        writeln!(f, "Randomness: {}", self.randomness)?;
        let direction = match self.direction {
            GrowthDirection::Upward => "Upward",
            GrowthDirection::Downward => "Downward",
        };
        write!(f, "Growth Direction: {}", direction)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GrowthConfig;
    use crate::engine::GrowthEngine;
    use crate::random::Fixed;

    fn engine() -> GrowthEngine<Fixed> {
        GrowthEngine::with_source(GrowthConfig::default(), Fixed(0.5)).unwrap()
    }

    #[test]
    fn status_tracks_lifecycle() {
        let mut engine = engine();
        assert_eq!(engine.stats().status(), "Ready to plant trunk");
        engine.plant_trunk(0.0, 0.0);
        assert_eq!(engine.stats().status(), "Trunk planted");
        engine.grow_one_level().unwrap();
        assert_eq!(engine.stats().status(), "Depth: 1 | Branches: 3");
    }

    #[test]
    fn distribution_doubles_each_level() {
        let mut engine = engine();
        engine.plant_trunk(0.0, 0.0);
        for _ in 0..3 {
            engine.grow_one_level().unwrap();
        }
        let stats = engine.stats();
        assert_eq!(stats.per_depth, vec![1, 2, 4, 8]);
        assert_eq!(stats.total_branches, 15);

        let text = stats.to_string();
        assert!(text.contains("Depth 3: 8 branches"));
        assert!(text.contains("Growth Direction: Upward"));
    }

    #[test]
    fn empty_tree_has_no_distribution() {
        let engine = engine();
        assert!(engine.stats().per_depth.is_empty());
    }
}
