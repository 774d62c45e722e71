//! Decorative marks scattered over a sector according to its category.
//!
//! Every generator walks a fixed grid of rings × columns laid over the
//! sector, inset by the layout's decor margin. The output is purely cosmetic
//! and carries no interaction.

use crate::geometry::{self, Point};
use crate::sector::{Category, Detail, HexColor, Layout, Sector, Span};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Option<HexColor>,
    pub stroke: Option<HexColor>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Paint {
    fn filled(fill: HexColor) -> Self {
        Self {
            fill: Some(fill),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    fn outlined(fill: HexColor, stroke: HexColor, stroke_width: f64) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            stroke_width,
            opacity: 0.95,
        }
    }

    fn line(stroke: HexColor, stroke_width: f64, opacity: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(stroke),
            stroke_width,
            opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Rounded rectangle centred on `center`, rotated clockwise by `rotation_deg`.
    Rect {
        center: Point,
        width: f64,
        height: f64,
        corner: f64,
        rotation_deg: f64,
        paint: Paint,
    },
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    Line {
        from: Point,
        to: Point,
        paint: Paint,
    },
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    ring: usize,
    col: usize,
    radius: f64,
    angle: f64,
    pos: Point,
}

/// Rings × columns over the inset sector.
#[derive(Debug, Clone, Copy)]
struct Grid {
    center: Point,
    inner: f64,
    outer: f64,
    span: Span,
    rings: usize,
    cols: usize,
    // where inside each ring band the row sits, 0.5 = middle
    bias: f64,
}

impl Grid {
    fn ring_step(&self) -> f64 {
        (self.outer - self.inner) / self.rings as f64
    }

    fn angle_step(&self) -> f64 {
        self.span.extent() / self.cols as f64
    }

    fn angle_of(&self, col: usize) -> f64 {
        self.span.start + col as f64 * self.angle_step() + self.angle_step() * 0.5
    }

    /// Rough arc length available to one column at `radius`.
    fn arc(&self, radius: f64) -> f64 {
        (self.angle_step() / 360.0) * PI * radius
    }

    fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rings).flat_map(move |ring| {
            let radius = self.inner + ring as f64 * self.ring_step() + self.ring_step() * self.bias;
            (0..self.cols).map(move |col| {
                let angle = self.angle_of(col);
                Cell {
                    ring,
                    col,
                    radius,
                    angle,
                    pos: geometry::polar_to_cartesian(self.center, radius, angle),
                }
            })
        })
    }
}

struct Shape {
    rings: usize,
    cols: usize,
    bias: f64,
}

fn shape(category: Category) -> Shape {
    let (rings, cols, bias) = match category {
        Category::Industry => (6, 14, 0.5),
        Category::Storage => (8, 10, 0.5),
        Category::Housing => (7, 16, 0.45),
        Category::Waste => (6, 12, 0.55),
        Category::Research => (5, 10, 0.5),
        Category::Energy => (6, 12, 0.5),
        Category::Crops => (9, 18, 0.5),
    };
    Shape { rings, cols, bias }
}

/// Marks for one sector of `layout`; empty for plain layouts and
/// uncategorised sectors.
pub fn sector_marks(layout: &Layout, sector: &Sector) -> Vec<Mark> {
    let extras = layout.extras();
    match (extras.detail, sector.category) {
        (Detail::Full, Some(category)) => {
            let (inner, outer) = layout.decor_band();
            decorate(category, layout.ring().center, inner, outer, sector.span)
        }
        _ => Vec::new(),
    }
}

/// Marks for `category` laid over the band `inner..outer` across `span`.
pub fn decorate(category: Category, center: Point, inner: f64, outer: f64, span: Span) -> Vec<Mark> {
    if outer <= inner || span.extent() <= 0.0 {
        return Vec::new();
    }

    let Shape { rings, cols, bias } = shape(category);
    let grid = Grid {
        center,
        inner,
        outer,
        span,
        rings,
        cols,
        bias,
    };

    let mut marks = Vec::with_capacity(rings * cols * 2);
    for cell in grid.cells() {
        match category {
            Category::Industry => industry(&grid, cell, &mut marks),
            Category::Storage => storage(&grid, cell, &mut marks),
            Category::Housing => housing(&grid, cell, &mut marks),
            Category::Waste => waste(&grid, cell, &mut marks),
            Category::Research => research(&grid, cell, &mut marks),
            Category::Energy => energy(&grid, cell, &mut marks),
            Category::Crops => crops(&grid, cell, &mut marks),
        }
    }
    marks
}

fn industry(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    let fill = if cell.col % 3 == 0 {
        HexColor::rgb(0x6b, 0x6b, 0x6b)
    } else {
        HexColor::rgb(0x8c, 0x8c, 0x8c)
    };
    marks.push(Mark::Rect {
        center: cell.pos,
        width: (grid.ring_step() * 0.9).max(12.0),
        height: (grid.arc(cell.radius) * 0.6).max(4.0),
        corner: 3.0,
        rotation_deg: cell.angle + 90.0,
        paint: Paint::outlined(fill, HexColor::rgb(0x2b, 0x2b, 0x2b), 0.6),
    });
}

fn storage(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    const CRATES: [(u8, u8, u8); 3] = [(0xc9, 0xb0, 0x7a), (0xd8, 0xc4, 0x8f), (0xbf, 0xa8, 0x6a)];
    let (r, g, b) = CRATES[(cell.ring + cell.col) % CRATES.len()];
    marks.push(Mark::Rect {
        center: cell.pos,
        width: grid.ring_step() * 0.8,
        height: (grid.arc(cell.radius) * 0.6).max(6.0),
        corner: 2.0,
        rotation_deg: 0.0,
        paint: Paint::outlined(HexColor::rgb(r, g, b), HexColor::rgb(0x8b, 0x6f, 0x3d), 0.5),
    });
}

fn housing(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    const ROOFS: [(u8, u8, u8); 4] = [
        (0xe2, 0x7b, 0x7b),
        (0xf2, 0xb9, 0x7a),
        (0x7f, 0xb8, 0xe7),
        (0x9a, 0xd6, 0x8f),
    ];
    let width = (grid.ring_step() * 0.5).max(6.0);
    let height = (grid.arc(cell.radius) * 0.45).max(6.0);
    let (r, g, b) = ROOFS[(cell.ring * 3 + cell.col) % ROOFS.len()];

    marks.push(Mark::Rect {
        center: cell.pos,
        width,
        height,
        corner: 3.0,
        rotation_deg: 0.0,
        paint: Paint {
            opacity: 1.0,
            ..Paint::outlined(HexColor::rgb(0xff, 0xff, 0xff), HexColor::rgb(0xbd, 0xbd, 0xbd), 0.6)
        },
    });
    // roof strip across the top 40% of the house
    marks.push(Mark::Rect {
        center: Point::new(cell.pos.x, cell.pos.y - height * 0.3),
        width,
        height: height * 0.4,
        corner: 3.0,
        rotation_deg: 0.0,
        paint: Paint {
            opacity: 0.95,
            ..Paint::filled(HexColor::rgb(r, g, b))
        },
    });
}

fn waste(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    let tank = (grid.ring_step() * 0.28).max(3.0);
    marks.push(Mark::Circle {
        center: cell.pos,
        radius: tank,
        paint: Paint::outlined(HexColor::rgb(0xf2, 0xb5, 0x7f), HexColor::rgb(0x9b, 0x5a, 0x2a), 0.6),
    });
    marks.push(Mark::Circle {
        center: Point::new(cell.pos.x + tank * 0.6, cell.pos.y - tank * 0.6),
        radius: (tank * 0.25).max(0.8),
        paint: Paint::filled(HexColor::rgb(0x6b, 0x3a, 0x1f)),
    });
}

fn research(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    let node = (grid.ring_step() * 0.22).max(3.0);
    marks.push(Mark::Rect {
        center: cell.pos,
        width: node * 2.0,
        height: node * 2.0,
        corner: 2.0,
        rotation_deg: 0.0,
        paint: Paint::outlined(HexColor::rgb(0x9c, 0xc0, 0xe8), HexColor::rgb(0x3b, 0x6f, 0xa6), 0.5),
    });
    if cell.col + 1 < grid.cols {
        let next = geometry::polar_to_cartesian(grid.center, cell.radius, grid.angle_of(cell.col + 1));
        marks.push(Mark::Line {
            from: cell.pos,
            to: next,
            paint: Paint::line(HexColor::rgb(0x7a, 0xa0, 0xd6), 0.6, 0.6),
        });
    }
}

fn energy(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    if (cell.ring + cell.col) % 7 == 0 {
        marks.push(Mark::Circle {
            center: cell.pos,
            radius: (grid.ring_step() * 0.35).max(4.0),
            paint: Paint::outlined(HexColor::rgb(0xcf, 0xcf, 0xcf), HexColor::rgb(0x7d, 0x7d, 0x7d), 0.6),
        });
    } else {
        marks.push(Mark::Rect {
            center: cell.pos,
            width: (grid.ring_step() * 0.6).max(6.0),
            height: (grid.arc(cell.radius) * 0.5).max(3.0),
            corner: 1.0,
            rotation_deg: 0.0,
            paint: Paint::outlined(HexColor::rgb(0x2b, 0x3b, 0x58), HexColor::rgb(0x1b, 0x27, 0x38), 0.5),
        });
    }
}

fn crops(grid: &Grid, cell: Cell, marks: &mut Vec<Mark>) {
    let canopy = (grid.ring_step() * 0.3).max(3.0);
    marks.push(Mark::Circle {
        center: cell.pos,
        radius: canopy,
        paint: Paint {
            opacity: 1.0,
            ..Paint::outlined(HexColor::rgb(0x3c, 0x8c, 0x4a), HexColor::rgb(0x2b, 0x5e, 0x33), 0.5)
        },
    });
    // trunk below the canopy
    marks.push(Mark::Rect {
        center: Point::new(cell.pos.x, cell.pos.y + canopy),
        width: canopy * 0.2,
        height: canopy * 0.8,
        corner: 0.0,
        rotation_deg: 0.0,
        paint: Paint::filled(HexColor::rgb(0x6b, 0x4f, 0x2a)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::cartesian_to_polar;
    use crate::sector::{Extras, InfoText, Ring, SectorDraft, SectorName};
    use strum::IntoEnumIterator;

    const CENTER: Point = Point { x: 500.0, y: 500.0 };

    #[test]
    fn test_mark_counts() {
        let span = Span::new(-90.0, -38.0);
        let count = |c| decorate(c, CENTER, 226.0, 434.0, span).len();

        assert_eq!(count(Category::Industry), 6 * 14);
        assert_eq!(count(Category::Storage), 8 * 10);
        assert_eq!(count(Category::Housing), 7 * 16 * 2);
        assert_eq!(count(Category::Waste), 6 * 12 * 2);
        assert_eq!(count(Category::Research), 5 * 10 + 5 * 9);
        assert_eq!(count(Category::Energy), 6 * 12);
        assert_eq!(count(Category::Crops), 9 * 18 * 2);
    }

    #[test]
    fn test_cells_stay_inside_band_and_span() {
        let span = Span::new(350.0, 410.0);
        for category in Category::iter() {
            let Shape { rings, cols, bias } = shape(category);
            let grid = Grid {
                center: CENTER,
                inner: 226.0,
                outer: 434.0,
                span,
                rings,
                cols,
                bias,
            };
            for cell in grid.cells() {
                let (radius, angle) = cartesian_to_polar(CENTER, cell.pos);
                assert!(radius > 226.0 && radius < 434.0, "{category}: {radius}");
                let offset = geometry::normalize_angle(angle - span.start);
                assert!(offset > 0.0 && offset < span.extent(), "{category}: {angle}");
            }
        }
    }

    #[test]
    fn test_industry_marks_follow_the_radius() {
        let marks = decorate(Category::Industry, CENTER, 226.0, 434.0, Span::new(0.0, 90.0));
        match &marks[0] {
            Mark::Rect { rotation_deg, .. } => {
                let expected = 90.0 / 14.0 / 2.0 + 90.0;
                assert!((rotation_deg - expected).abs() < 1e-9);
            }
            other => panic!("unexpected mark {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_band_is_empty() {
        assert!(decorate(Category::Crops, CENTER, 300.0, 300.0, Span::new(0.0, 90.0)).is_empty());
    }

    #[test]
    fn test_sector_marks_respect_detail() {
        let drafts = vec![
            SectorDraft {
                name: SectorName::new("Energy"),
                color: HexColor::rgb(0xf1, 0xdf, 0xc3),
                info: InfoText::new("Power"),
                category: Some(Category::Energy),
                span: None,
            },
            SectorDraft {
                name: SectorName::new("Misc"),
                color: HexColor::rgb(0xee, 0xee, 0xee),
                info: InfoText::default(),
                category: None,
                span: None,
            },
        ];
        let ring = Ring {
            center: CENTER,
            inner: 220.0,
            outer: 440.0,
        };

        let full = Layout::build(drafts.clone(), ring, Extras::default()).unwrap();
        assert!(!sector_marks(&full, &full.sectors()[0]).is_empty());
        assert!(sector_marks(&full, &full.sectors()[1]).is_empty());

        let plain = Layout::build(
            drafts,
            ring,
            Extras {
                detail: Detail::Plain,
                ..Extras::default()
            },
        )
        .unwrap();
        assert!(sector_marks(&plain, &plain.sectors()[0]).is_empty());
    }
}
