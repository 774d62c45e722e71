pub mod view;

pub use view::draw;

use ringmap::geometry::Point;

pub const SECTOR_STROKE_WIDTH: f64 = 1.0;
pub const SELECTED_STROKE_WIDTH: f64 = 3.0;
pub const HOVER_LIGHTEN: f64 = 0.12;
pub const TOOLTIP_OFFSET: f64 = 12.0;
pub const TOOLTIP_WIDTH: f64 = 240.0;
pub const TOOLTIP_HEIGHT: f64 = 56.0;
pub const CLICK_SLOP: f64 = 4.0; // pointer travel below which a press/release is a click

/// Top-left corner of the hover tooltip for a pointer at `at`, kept inside a
/// `width` × `height` canvas.
pub fn tooltip_origin(at: Point, width: f64, height: f64) -> (i32, i32) {
    let mut x = at.x + TOOLTIP_OFFSET;
    let mut y = at.y + TOOLTIP_OFFSET;
    if x + TOOLTIP_WIDTH > width {
        x = at.x - TOOLTIP_OFFSET - TOOLTIP_WIDTH;
    }
    if y + TOOLTIP_HEIGHT > height {
        y = at.y - TOOLTIP_OFFSET - TOOLTIP_HEIGHT;
    }
    (x.max(0.0).round() as i32, y.max(0.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_follows_pointer() {
        assert_eq!(tooltip_origin(Point::new(100.0, 50.0), 800.0, 600.0), (112, 62));
    }

    #[test]
    fn test_tooltip_flips_at_edges() {
        let cases = vec![
            (Point::new(700.0, 50.0), (448, 62)),
            (Point::new(100.0, 580.0), (112, 512)),
            (Point::new(790.0, 590.0), (538, 522)),
            (Point::new(5.0, 5.0), (17, 17)),
        ];

        for (at, expected) in cases {
            assert_eq!(tooltip_origin(at, 800.0, 600.0), expected);
        }
    }
}
