use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// A point in canvas space. y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `length` away along `angle_deg` (clockwise from +x).
    pub fn project(self, angle_deg: f64, length: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point {
            x: self.x + rad.cos() * length,
            y: self.y + rad.sin() * length,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Clip the segment `a`-`b` to the box spanned by `min` and `max`
/// (Liang-Barsky). Returns `None` when nothing of it lies inside, or when
/// a coordinate is not finite.
pub fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if ![a.x, a.y, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, a.x - min.x),
        (dx, max.x - a.x),
        (-dy, a.y - min.y),
        (dy, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        Point::new(
            (a.x + t * dx).clamp(min.x, max.x),
            (a.y + t * dy).clamp(min.y, max.y),
        )
    };
    Some((at(t0), at(t1)))
}

/// Identifier of a branch; also its index in the engine's branch list.
pub type BranchId = usize;

/// One line segment of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    /// `None` only for the trunk
    pub parent_id: Option<BranchId>,
    pub start: Point,
    pub end: Point,
    pub depth: u32,
    /// Stored rather than recomputed: children derive their length from it
    pub length: f64,
    /// Degrees, clockwise from +x
    pub angle: f64,
    pub thickness: f64,
    pub color: Rgb,
}

impl Branch {
    pub fn is_trunk(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_follows_screen_convention() {
        let origin = Point::new(0.0, 0.0);
        // 270 degrees points up the screen
        let up = origin.project(270.0, 10.0);
        assert!(up.x.abs() < 1e-9);
        assert!((up.y + 10.0).abs() < 1e-9);
        // 90 degrees points down
        let down = origin.project(90.0, 10.0);
        assert!((down.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn distance_matches_projection_length() {
        let p = Point::new(3.0, 4.0);
        let q = p.project(33.0, 7.5);
        assert!((p.distance(q) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn clipping_keeps_inside_segments() {
        let (a, b) = (Point::new(1.0, 2.0), Point::new(8.0, 9.0));
        let clipped = clip_segment(a, b, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(clipped, Some((a, b)));
    }

    #[test]
    fn clipping_trims_to_box_edges() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(10.0, 10.0);
        let far = Point::new(5.0, -1e19);
        let (s, e) = clip_segment(Point::new(5.0, 5.0), far, min, max).unwrap();
        assert_eq!(s, Point::new(5.0, 5.0));
        assert_eq!(e.x, 5.0);
        assert!(e.y.abs() < 1e-9, "clipped end {:?}", e);

        let across = (Point::new(-10.0, 5.0), Point::new(20.0, 5.0));
        let (s, e) = clip_segment(across.0, across.1, min, max).unwrap();
        assert!(s.x.abs() < 1e-9 && (e.x - 10.0).abs() < 1e-9);
        assert_eq!((s.y, e.y), (5.0, 5.0));
    }

    #[test]
    fn clipping_rejects_outside_and_non_finite() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(10.0, 10.0);
        let outside = [
            (Point::new(-5.0, -5.0), Point::new(-1.0, 20.0)),
            (Point::new(11.0, 0.0), Point::new(30.0, 0.0)),
            (Point::new(0.0, 0.0), Point::new(f64::INFINITY, 1.0)),
        ];
        for (a, b) in outside {
            assert_eq!(clip_segment(a, b, min, max), None, "{:?} -> {:?}", a, b);
        }
    }
}
