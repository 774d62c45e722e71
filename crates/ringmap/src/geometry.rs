//! Polar geometry of the ring map.
//!
//! Angles are in degrees, measured from "up" (12 o'clock) and increasing
//! clockwise, in a y-down coordinate system. Every function here works in
//! colony space; the camera transform is applied around the result.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Sub};

pub const FULL_TURN: f64 = 360.0;
pub const HALF_TURN: f64 = 180.0;

// decimals emitted in path data
const PATH_PRECISION: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Converts a map angle (0° = up, clockwise) to the radians used by
/// `cos`/`sin` and by cairo's `arc`.
pub fn screen_radians(angle_deg: f64) -> f64 {
    (angle_deg - 90.0) * PI / 180.0
}

pub fn polar_to_cartesian(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = screen_radians(angle_deg);
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Inverse of [`polar_to_cartesian`]: returns `(radius, angle_deg)` with the
/// angle normalised to `[0, 360)`.
pub fn cartesian_to_polar(center: Point, point: Point) -> (f64, f64) {
    let (dx, dy) = (point.x - center.x, point.y - center.y);
    let angle = dy.atan2(dx).to_degrees() + 90.0;
    (dx.hypot(dy), normalize_angle(angle))
}

pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= FULL_TURN { 0.0 } else { a }
}

/// Sectors spanning more than a half turn take the long way round; exactly
/// 180° stays on the short arc.
pub fn is_large_arc(start_deg: f64, end_deg: f64) -> bool {
    end_deg - start_deg > HALF_TURN
}

fn covers_full_turn(start_deg: f64, end_deg: f64) -> bool {
    end_deg - start_deg >= FULL_TURN
}

/// The four corners and flags of one annulus sector.
///
/// `Display` renders SVG path data: outer arc clockwise from the start angle,
/// a radial line inwards, the inner arc back counter-clockwise, close.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnulusPath {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_deg: f64,
    pub end_deg: f64,
    pub outer_start: Point,
    pub outer_end: Point,
    pub inner_end: Point,
    pub inner_start: Point,
    pub large_arc: bool,
}

impl AnnulusPath {
    pub fn is_full_ring(&self) -> bool {
        covers_full_turn(self.start_deg, self.end_deg)
    }

    fn write_arc(
        f: &mut fmt::Formatter<'_>,
        radius: f64,
        large: bool,
        clockwise: bool,
        to: Point,
    ) -> fmt::Result {
        write!(
            f,
            " A {r} {r} 0 {} {} {} {}",
            u8::from(large),
            u8::from(clockwise),
            Coord(to.x),
            Coord(to.y),
            r = Coord(radius),
        )
    }
}

impl fmt::Display for AnnulusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M {} {}", Coord(self.outer_start.x), Coord(self.outer_start.y))?;

        if self.is_full_ring() {
            // an arc between identical endpoints draws nothing: go via the opposite side
            let outer_mid =
                polar_to_cartesian(self.center, self.outer_radius, self.start_deg + HALF_TURN);
            let inner_mid =
                polar_to_cartesian(self.center, self.inner_radius, self.start_deg + HALF_TURN);
            Self::write_arc(f, self.outer_radius, false, true, outer_mid)?;
            Self::write_arc(f, self.outer_radius, false, true, self.outer_end)?;
            write!(f, " L {} {}", Coord(self.inner_end.x), Coord(self.inner_end.y))?;
            Self::write_arc(f, self.inner_radius, false, false, inner_mid)?;
            Self::write_arc(f, self.inner_radius, false, false, self.inner_start)?;
        } else {
            Self::write_arc(f, self.outer_radius, self.large_arc, true, self.outer_end)?;
            write!(f, " L {} {}", Coord(self.inner_end.x), Coord(self.inner_end.y))?;
            Self::write_arc(f, self.inner_radius, self.large_arc, false, self.inner_start)?;
        }

        f.write_str(" Z")
    }
}

/// Builds the outline of the region between `inner_radius` and `outer_radius`
/// from `start_deg` to `end_deg`.
///
/// An extent of a full turn or more yields a complete ring whose end corners
/// coincide with its start corners.
pub fn describe_annulus_sector(
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    start_deg: f64,
    end_deg: f64,
) -> AnnulusPath {
    let end_deg = if covers_full_turn(start_deg, end_deg) {
        start_deg + FULL_TURN
    } else {
        end_deg
    };

    AnnulusPath {
        center,
        inner_radius,
        outer_radius,
        start_deg,
        end_deg,
        outer_start: polar_to_cartesian(center, outer_radius, start_deg),
        outer_end: polar_to_cartesian(center, outer_radius, end_deg),
        inner_end: polar_to_cartesian(center, inner_radius, end_deg),
        inner_start: polar_to_cartesian(center, inner_radius, start_deg),
        large_arc: is_large_arc(start_deg, end_deg),
    }
}

/// Mid-angle, mid-radius point of a sector, where its label goes.
pub fn label_anchor(
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    start_deg: f64,
    end_deg: f64,
) -> Point {
    polar_to_cartesian(
        center,
        (inner_radius + outer_radius) / 2.0,
        (start_deg + end_deg) / 2.0,
    )
}

/// Whether `point` falls inside the annulus sector. The angular span is
/// half-open, so neighbouring sectors never both claim their shared edge.
pub fn annulus_contains(
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    start_deg: f64,
    end_deg: f64,
    point: Point,
) -> bool {
    let (radius, angle) = cartesian_to_polar(center, point);
    if radius < inner_radius || radius > outer_radius {
        return false;
    }
    if covers_full_turn(start_deg, end_deg) {
        return true;
    }
    normalize_angle(angle - start_deg) < end_deg - start_deg
}

/// Fixed-precision coordinate formatting for stable path text.
#[derive(Debug, Clone, Copy)]
pub struct Coord(pub f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10f64.powi(PATH_PRECISION);
        let mut v = (self.0 * scale).round() / scale;
        if v == 0.0 {
            v = 0.0;
        }
        write!(f, "{:.*}", PATH_PRECISION as usize, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_polar_periodicity() {
        let center = Point::new(250.0, 250.0);
        for angle in [-90.0, 0.0, 37.5, 181.0, 359.0] {
            let a = polar_to_cartesian(center, 120.0, angle);
            let b = polar_to_cartesian(center, 120.0, angle + FULL_TURN);
            assert!(close(a, b), "{angle}: {a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_polar_orientation() {
        let origin = Point::default();
        assert!(close(polar_to_cartesian(origin, 10.0, 90.0), Point::new(10.0, 0.0)));
        // zero points up in y-down space
        assert!(close(polar_to_cartesian(origin, 10.0, 0.0), Point::new(0.0, -10.0)));
        assert!(close(polar_to_cartesian(origin, 10.0, 180.0), Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_cartesian_to_polar_inverts() {
        let center = Point::new(500.0, 500.0);
        let p = polar_to_cartesian(center, 300.0, 292.5);
        let (r, a) = cartesian_to_polar(center, p);
        assert!((r - 300.0).abs() < EPS);
        assert!((a - 292.5).abs() < EPS);
    }

    #[test]
    fn test_large_arc_flag() {
        let c = Point::default();
        assert!(!describe_annulus_sector(c, 10.0, 20.0, 0.0, 180.0).large_arc);
        assert!(describe_annulus_sector(c, 10.0, 20.0, 0.0, 181.0).large_arc);
        assert!(!describe_annulus_sector(c, 10.0, 20.0, -90.0, 90.0).large_arc);
    }

    #[test]
    fn test_path_text() {
        let path = describe_annulus_sector(Point::default(), 10.0, 20.0, 0.0, 90.0);
        assert_eq!(
            path.to_string(),
            "M 0.000 -20.000 A 20.000 20.000 0 0 1 20.000 0.000 \
             L 10.000 0.000 A 10.000 10.000 0 0 0 0.000 -10.000 Z"
        );
    }

    #[test]
    fn test_path_is_deterministic() {
        let center = Point::new(500.0, 500.0);
        let a = describe_annulus_sector(center, 220.0, 440.0, -90.0, -38.571_428_571);
        let b = describe_annulus_sector(center, 220.0, 440.0, -90.0, -38.571_428_571);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_adjacent_sectors_share_edges() {
        let center = Point::new(250.0, 250.0);
        for (inner, outer) in [(110.0, 200.0), (3.5, 7.25), (220.0, 440.0)] {
            let a = describe_annulus_sector(center, inner, outer, 200.0, 250.0);
            let b = describe_annulus_sector(center, inner, outer, 250.0, 300.0);
            assert_eq!(a.outer_end, b.outer_start);
            assert_eq!(a.inner_end, b.inner_start);
        }
    }

    #[test]
    fn test_full_ring_uses_two_arcs() {
        let path = describe_annulus_sector(Point::default(), 10.0, 20.0, 0.0, 360.0);
        assert!(path.is_full_ring());
        let text = path.to_string();
        assert_eq!(text.matches(" A ").count(), 4);
        assert!(text.contains("A 20.000 20.000 0 0 1 0.000 20.000"));
    }

    #[test]
    fn test_coord_drops_negative_zero() {
        assert_eq!(Coord(-0.0001).to_string(), "0.000");
        assert_eq!(Coord(-1.23456).to_string(), "-1.235");
    }

    #[test]
    fn test_label_anchor_mid_angle_mid_radius() {
        let p = label_anchor(Point::default(), 10.0, 30.0, 80.0, 100.0);
        assert!(close(p, Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_annulus_contains() {
        let c = Point::new(100.0, 100.0);
        let inside = polar_to_cartesian(c, 50.0, 45.0);
        assert!(annulus_contains(c, 40.0, 60.0, 0.0, 90.0, inside));
        assert!(!annulus_contains(c, 40.0, 60.0, 90.0, 180.0, inside));
        assert!(!annulus_contains(c, 55.0, 60.0, 0.0, 90.0, inside));

        // spans that cross 0° are matched modulo a full turn
        let top = polar_to_cartesian(c, 50.0, 5.0);
        assert!(annulus_contains(c, 40.0, 60.0, -30.0, 20.0, top));
        assert!(annulus_contains(c, 40.0, 60.0, 350.0, 400.0, top));
    }

    #[test]
    fn test_shared_edge_belongs_to_one_sector() {
        let c = Point::default();
        let edge = polar_to_cartesian(c, 50.0, 90.0);
        assert!(!annulus_contains(c, 40.0, 60.0, 0.0, 90.0, edge));
        assert!(annulus_contains(c, 40.0, 60.0, 90.0, 180.0, edge));
    }
}
