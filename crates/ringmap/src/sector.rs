use crate::geometry::{self, AnnulusPath, FULL_TURN, Point};
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

// tolerance when checking that consecutive sectors meet
const SEAM_TOLERANCE: f64 = 1e-6;

/// 1-based position of a sector in its layout; also the label drawn on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct SectorId(usize);

impl SectorId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SectorName(String);

crate::text_newtype!(SectorName);

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct InfoText(String);

crate::text_newtype!(InfoText);

#[derive(Debug, Error, PartialEq)]
#[error("Invalid colour '{input}': {reason}")]
pub struct ColorError {
    input: String,
    reason: String,
}

/// An sRGB colour written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Srgb::new(r, g, b))
    }

    /// Components scaled to `0.0..=1.0`, as cairo wants them.
    pub fn to_f64(self) -> Srgb<f64> {
        self.0.into_format()
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.starts_with('#') {
            return Err(ColorError {
                input: s.to_string(),
                reason: "expected a leading '#'".to_string(),
            });
        }
        Srgb::<u8>::from_str(trimmed)
            .map(Self)
            .map_err(|e| ColorError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

/// What a sector is used for; selects its decorative fill.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(to_string = "industry", serialize = "manufacturing")]
    Industry,
    #[strum(to_string = "storage")]
    Storage,
    #[strum(to_string = "housing", serialize = "residential")]
    Housing,
    #[strum(to_string = "waste", serialize = "recycling")]
    Waste,
    #[strum(to_string = "research", serialize = "labs", serialize = "r&d")]
    Research,
    #[strum(to_string = "energy", serialize = "power")]
    Energy,
    #[strum(to_string = "crops", serialize = "biosystems", serialize = "farms")]
    Crops,
}

/// How much of the diagram to draw.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Detail {
    /// Sector fills plus per-category decoration.
    #[default]
    Full,
    /// Flat sector fills only.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn extent(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub id: SectorId,
    pub name: SectorName,
    pub color: HexColor,
    pub info: InfoText,
    pub category: Option<Category>,
    pub span: Span,
}

/// A sector before it has been placed in a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorDraft {
    pub name: SectorName,
    pub color: HexColor,
    pub info: InfoText,
    pub category: Option<Category>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: Point,
    pub inner: f64,
    pub outer: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Layout has no sectors")]
    Empty,
    #[error("Invalid radii: inner {inner} must be positive and below outer {outer}")]
    Radii { inner: f64, outer: f64 },
    #[error("Sector '{name}' has an empty or invalid span {start}..{end}")]
    BadSpan { name: String, start: f64, end: f64 },
    #[error("Either every sector sets start/end angles or none does ('{name}' differs)")]
    PartialAngles { name: String },
    #[error("Gap of {gap:.3}° between '{before}' and '{after}'")]
    Gap {
        before: String,
        after: String,
        gap: f64,
    },
    #[error("'{before}' and '{after}' overlap by {overlap:.3}°")]
    Overlap {
        before: String,
        after: String,
        overlap: f64,
    },
    #[error("Sectors cover {total:.3}° instead of a full turn")]
    Coverage { total: f64 },
}

/// Optional radii and decoration settings of a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extras {
    pub biosphere_radius: Option<f64>,
    pub crop_ring_radius: Option<f64>,
    pub decor_margin: f64,
    pub detail: Detail,
}

impl Default for Extras {
    fn default() -> Self {
        Self {
            biosphere_radius: None,
            crop_ring_radius: None,
            decor_margin: 6.0,
            detail: Detail::Full,
        }
    }
}

/// A validated set of sectors that tiles one full turn of a ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    sectors: Vec<Sector>,
    ring: Ring,
    extras: Extras,
}

impl Layout {
    /// Places `drafts` on `ring`. Drafts without angles are split evenly
    /// starting at -90° (9 o'clock); drafts with angles must meet end to start
    /// and add up to exactly one full turn.
    pub fn build(
        drafts: Vec<SectorDraft>,
        ring: Ring,
        extras: Extras,
    ) -> Result<Self, LayoutError> {
        if drafts.is_empty() {
            return Err(LayoutError::Empty);
        }
        if !(ring.inner > 0.0 && ring.inner < ring.outer && ring.outer.is_finite()) {
            return Err(LayoutError::Radii {
                inner: ring.inner,
                outer: ring.outer,
            });
        }

        let explicit = drafts[0].span.is_some();
        if let Some(odd) = drafts.iter().find(|d| d.span.is_some() != explicit) {
            return Err(LayoutError::PartialAngles {
                name: odd.name.to_string(),
            });
        }

        let spans = if explicit {
            drafts.iter().filter_map(|d| d.span).collect()
        } else {
            even_spans(drafts.len())
        };

        let sectors: Vec<Sector> = drafts
            .into_iter()
            .zip(spans)
            .enumerate()
            .map(|(i, (draft, span))| Sector {
                id: SectorId::new(i + 1),
                name: draft.name,
                color: draft.color,
                info: draft.info,
                category: draft.category,
                span,
            })
            .collect();

        check_tiling(&sectors)?;

        log::debug!(
            "Built layout of {} sectors on ring {}..{}",
            sectors.len(),
            ring.inner,
            ring.outer
        );

        Ok(Self {
            sectors,
            ring,
            extras,
        })
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn ring(&self) -> Ring {
        self.ring
    }

    pub fn extras(&self) -> Extras {
        self.extras
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        id.index().and_then(|i| self.sectors.get(i))
    }

    pub fn path(&self, sector: &Sector) -> AnnulusPath {
        geometry::describe_annulus_sector(
            self.ring.center,
            self.ring.inner,
            self.ring.outer,
            sector.span.start,
            sector.span.end,
        )
    }

    /// Radii of the band decoration is confined to: the ring inset by the
    /// decor margin on both sides.
    pub fn decor_band(&self) -> (f64, f64) {
        (
            self.ring.inner + self.extras.decor_margin,
            self.ring.outer - self.extras.decor_margin,
        )
    }

    /// Clip region for a sector's decoration.
    pub fn decor_path(&self, sector: &Sector) -> AnnulusPath {
        let (inner, outer) = self.decor_band();
        geometry::describe_annulus_sector(
            self.ring.center,
            inner,
            outer,
            sector.span.start,
            sector.span.end,
        )
    }

    pub fn label_anchor(&self, sector: &Sector) -> Point {
        geometry::label_anchor(
            self.ring.center,
            self.ring.inner,
            self.ring.outer,
            sector.span.start,
            sector.span.end,
        )
    }

    /// The sector under a colony-space point, if any.
    pub fn hit_test(&self, point: Point) -> Option<SectorId> {
        self.sectors
            .iter()
            .find(|s| {
                geometry::annulus_contains(
                    self.ring.center,
                    self.ring.inner,
                    self.ring.outer,
                    s.span.start,
                    s.span.end,
                    point,
                )
            })
            .map(|s| s.id)
    }
}

fn even_spans(count: usize) -> Vec<Span> {
    let step = FULL_TURN / count as f64;
    (0..count)
        .map(|i| Span::new(-90.0 + i as f64 * step, -90.0 + (i + 1) as f64 * step))
        .collect()
}

fn check_tiling(sectors: &[Sector]) -> Result<(), LayoutError> {
    for s in sectors {
        let Span { start, end } = s.span;
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(LayoutError::BadSpan {
                name: s.name.to_string(),
                start,
                end,
            });
        }
    }

    for pair in sectors.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        let delta = after.span.start - before.span.end;
        if delta > SEAM_TOLERANCE {
            return Err(LayoutError::Gap {
                before: before.name.to_string(),
                after: after.name.to_string(),
                gap: delta,
            });
        }
        if delta < -SEAM_TOLERANCE {
            return Err(LayoutError::Overlap {
                before: before.name.to_string(),
                after: after.name.to_string(),
                overlap: -delta,
            });
        }
    }

    let total: f64 = sectors.iter().map(|s| s.span.extent()).sum();
    if (total - FULL_TURN).abs() > SEAM_TOLERANCE {
        return Err(LayoutError::Coverage { total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, span: Option<(f64, f64)>) -> SectorDraft {
        SectorDraft {
            name: SectorName::new(name),
            color: HexColor::rgb(0xe8, 0xa2, 0x9c),
            info: InfoText::new(format!("{name} info")),
            category: None,
            span: span.map(|(s, e)| Span::new(s, e)),
        }
    }

    fn ring() -> Ring {
        Ring {
            center: Point::new(500.0, 500.0),
            inner: 220.0,
            outer: 440.0,
        }
    }

    #[test]
    fn test_even_split_tiles_full_turn() {
        let drafts = (0..7).map(|i| draft(&format!("s{i}"), None)).collect();
        let layout = Layout::build(drafts, ring(), Extras::default()).unwrap();

        let sectors = layout.sectors();
        assert_eq!(sectors.len(), 7);
        assert_eq!(sectors[0].span.start, -90.0);
        assert!((sectors[6].span.end - 270.0).abs() < 1e-9);
        assert_eq!(sectors[3].id, SectorId::new(4));
    }

    #[test]
    fn test_explicit_spans_accepted() {
        let drafts = vec![
            draft("a", Some((200.0, 250.0))),
            draft("b", Some((250.0, 400.0))),
            draft("c", Some((400.0, 560.0))),
        ];
        assert!(Layout::build(drafts, ring(), Extras::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let cases = vec![
            (vec![], LayoutError::Empty),
            (
                vec![draft("a", Some((0.0, 100.0))), draft("b", Some((110.0, 370.0)))],
                LayoutError::Gap {
                    before: "a".into(),
                    after: "b".into(),
                    gap: 10.0,
                },
            ),
            (
                vec![draft("a", Some((0.0, 200.0))), draft("b", Some((190.0, 370.0)))],
                LayoutError::Overlap {
                    before: "a".into(),
                    after: "b".into(),
                    overlap: 10.0,
                },
            ),
            (
                vec![draft("a", Some((0.0, 200.0))), draft("b", None)],
                LayoutError::PartialAngles { name: "b".into() },
            ),
            (
                vec![draft("a", Some((10.0, 10.0)))],
                LayoutError::BadSpan {
                    name: "a".into(),
                    start: 10.0,
                    end: 10.0,
                },
            ),
        ];

        for (drafts, expected) in cases {
            assert_eq!(
                Layout::build(drafts, ring(), Extras::default()),
                Err(expected)
            );
        }
    }

    #[test]
    fn test_rejects_short_coverage() {
        // the six-sector poster only spans 200..530
        let drafts = vec![
            draft("industry", Some((200.0, 250.0))),
            draft("storage", Some((250.0, 300.0))),
            draft("housing", Some((300.0, 350.0))),
            draft("waste", Some((350.0, 400.0))),
            draft("crops", Some((400.0, 470.0))),
            draft("energy", Some((470.0, 530.0))),
        ];
        let err = Layout::build(drafts, ring(), Extras::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Coverage { total } if (total - 330.0).abs() < 1e-9));
    }

    #[test]
    fn test_rejects_bad_radii() {
        let bad = Ring {
            inner: 500.0,
            ..ring()
        };
        let err = Layout::build(vec![draft("a", None)], bad, Extras::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Radii { .. }));
    }

    #[test]
    fn test_hit_test() {
        let drafts = (0..4).map(|i| draft(&format!("s{i}"), None)).collect();
        let layout = Layout::build(drafts, ring(), Extras::default()).unwrap();

        for sector in layout.sectors() {
            let anchor = layout.label_anchor(sector);
            assert_eq!(layout.hit_test(anchor), Some(sector.id));
        }
        assert_eq!(layout.hit_test(Point::new(500.0, 500.0)), None);
        assert_eq!(layout.hit_test(Point::new(500.0, 20.0)), None);
    }

    #[test]
    fn test_sector_lookup() {
        let layout = Layout::build(vec![draft("only", None)], ring(), Extras::default()).unwrap();
        assert_eq!(layout.sector(SectorId::new(1)).map(|s| s.name.as_str()), Some("only"));
        assert!(layout.sector(SectorId::new(0)).is_none());
        assert!(layout.sector(SectorId::new(2)).is_none());
        // a single sector owns the whole ring
        assert!(layout.path(&layout.sectors()[0]).is_full_ring());
        assert_eq!(layout.hit_test(Point::new(500.0, 200.0)), Some(SectorId::new(1)));
    }

    #[test]
    fn test_decor_path_is_inset_by_margin() {
        let drafts = vec![draft("a", Some((0.0, 90.0))), draft("b", Some((90.0, 360.0)))];
        let layout = Layout::build(drafts, ring(), Extras::default()).unwrap();
        assert_eq!(layout.decor_band(), (226.0, 434.0));

        let clip = layout.decor_path(&layout.sectors()[0]);
        assert_eq!(clip.inner_radius, 226.0);
        assert_eq!(clip.outer_radius, 434.0);
        assert!(clip.outer_start.distance_to(Point::new(500.0, 66.0)) < 1e-9);
        assert!(clip.inner_end.distance_to(Point::new(726.0, 500.0)) < 1e-9);
    }

    #[test]
    fn test_category_parsing() {
        let cases = vec![
            ("\"industry\"", Category::Industry),
            ("\"Industry\"", Category::Industry),
            ("\"LABS\"", Category::Research),
            ("\"r&d\"", Category::Research),
            ("\"biosystems\"", Category::Crops),
            ("\"power\"", Category::Energy),
        ];

        for (json, expected) in cases {
            let parsed: Category = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, expected);
        }
        assert_eq!(Category::Research.to_string(), "research");
    }

    #[test]
    fn test_hex_color() {
        let c: HexColor = serde_json::from_str("\"#E8A29C\"").unwrap();
        assert_eq!(c, HexColor::rgb(0xe8, 0xa2, 0x9c));
        assert_eq!(c.to_string(), "#e8a29c");
        assert!("e8a29c".parse::<HexColor>().is_err());
        assert!("#zzzzzz".parse::<HexColor>().is_err());
    }
}
