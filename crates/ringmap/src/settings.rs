use crate::geometry::Point;
use crate::sector::{
    Category, Detail, Extras, HexColor, InfoText, Layout, LayoutError, Ring, SectorDraft,
    SectorName, Span,
};
use crate::view::Viewport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The map definition shipped with the crate, in config-file form.
pub const DEFAULT_SETTINGS: &str = include_str!("default_map.toml");

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SectorConfig {
    pub name: SectorName,
    pub color: HexColor,
    #[serde(default)]
    pub info: InfoText,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

impl SectorConfig {
    fn new(name: &str, color: HexColor, info: &str, category: Category) -> Self {
        Self {
            name: SectorName::new(name),
            color,
            info: InfoText::new(info),
            category: Some(category),
            start: None,
            end: None,
        }
    }

    fn to_draft(&self) -> Result<SectorDraft, LayoutError> {
        let span = match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Span::new(start, end)),
            (None, None) => None,
            _ => {
                return Err(LayoutError::PartialAngles {
                    name: self.name.to_string(),
                });
            }
        };
        Ok(SectorDraft {
            name: self.name.clone(),
            color: self.color,
            info: self.info.clone(),
            category: self.category,
            span,
        })
    }
}

/// Everything needed to draw one map. Radii are fractions of `viewbox`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_viewbox")]
    pub viewbox: f64,
    #[serde(default = "default_outer_ratio")]
    pub outer_ratio: f64,
    #[serde(default = "default_inner_ratio")]
    pub inner_ratio: f64,
    #[serde(default)]
    pub biosphere_ratio: Option<f64>,
    #[serde(default)]
    pub crop_ring_ratio: Option<f64>,
    #[serde(default = "default_decor_margin")]
    pub decor_margin: f64,
    #[serde(default)]
    pub detail: Detail,
    #[serde(default)]
    pub sectors: Vec<SectorConfig>,
}

fn default_title() -> String {
    "ENERGY AND WASTE MANAGEMENT".to_string()
}

fn default_viewbox() -> f64 {
    1000.0
}

fn default_outer_ratio() -> f64 {
    0.44
}

fn default_inner_ratio() -> f64 {
    0.22
}

fn default_decor_margin() -> f64 {
    6.0
}

impl Default for MapSettings {
    fn default() -> Self {
        let hex = HexColor::rgb;
        Self {
            title: default_title(),
            viewbox: default_viewbox(),
            outer_ratio: default_outer_ratio(),
            inner_ratio: default_inner_ratio(),
            biosphere_ratio: Some(0.18),
            crop_ring_ratio: None,
            decor_margin: default_decor_margin(),
            detail: Detail::Full,
            sectors: vec![
                SectorConfig::new(
                    "Industry",
                    hex(0xe8, 0xa2, 0x9c),
                    "Manufacturing & processing",
                    Category::Industry,
                ),
                SectorConfig::new(
                    "Storage",
                    hex(0xf4, 0xd6, 0x8a),
                    "Material & fuel storage",
                    Category::Storage,
                ),
                SectorConfig::new(
                    "Housing",
                    hex(0xb1, 0xdb, 0xe6),
                    "Residential and services",
                    Category::Housing,
                ),
                SectorConfig::new(
                    "Waste & Processing",
                    hex(0xbc, 0xe1, 0xac),
                    "Recycling & waste-to-energy",
                    Category::Waste,
                ),
                SectorConfig::new(
                    "R&D / Labs",
                    hex(0xce, 0xb8, 0xe4),
                    "Research, labs, testing",
                    Category::Research,
                ),
                SectorConfig::new(
                    "Energy",
                    hex(0xf1, 0xdf, 0xc3),
                    "Power generation & storage",
                    Category::Energy,
                ),
                SectorConfig::new(
                    "Crops / Biosystems",
                    hex(0xcd, 0xe7, 0xc5),
                    "Greenhouses & farms",
                    Category::Crops,
                ),
            ],
        }
    }
}

impl MapSettings {
    /// Reads `path`, then lets `<ENV_PREFIX>_*` variables override scalar keys.
    pub fn load(path: &Path, env_prefix: &str) -> Result<Self, SettingsError> {
        let s = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn ring(&self) -> Ring {
        Ring {
            center: Point::new(self.viewbox / 2.0, self.viewbox / 2.0),
            inner: self.viewbox * self.inner_ratio,
            outer: self.viewbox * self.outer_ratio,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::square(self.viewbox)
    }

    /// Validates the sector list into a layout.
    pub fn layout(&self) -> Result<Layout, SettingsError> {
        let drafts = self
            .sectors
            .iter()
            .map(SectorConfig::to_draft)
            .collect::<Result<Vec<_>, _>>()?;

        let extras = Extras {
            biosphere_radius: self.biosphere_ratio.map(|r| r * self.viewbox),
            crop_ring_radius: self.crop_ring_ratio.map(|r| r * self.viewbox),
            decor_margin: self.decor_margin,
            detail: self.detail,
        };

        Ok(Layout::build(drafts, self.ring(), extras)?)
    }

    /// Layout of the built-in colony. Always tiles the ring.
    pub fn builtin_layout() -> Layout {
        Self::default()
            .layout()
            .expect("built-in colony map is a valid layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_matches_builtin() {
        let parsed = MapSettings::from_toml(DEFAULT_SETTINGS).unwrap();
        assert_eq!(parsed, MapSettings::default());
    }

    #[test]
    fn test_builtin_layout_is_valid() {
        let layout = MapSettings::builtin_layout();
        assert_eq!(layout.sectors().len(), 7);
        assert_eq!(layout.ring().outer, 440.0);
        assert_eq!(layout.extras().biosphere_radius, Some(180.0));
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let settings = MapSettings::from_toml(
            r##"
            [[sectors]]
            name = "Everything"
            color = "#cccccc"
            "##,
        )
        .unwrap();

        assert_eq!(settings.viewbox, 1000.0);
        assert_eq!(settings.detail, Detail::Full);
        assert_eq!(settings.sectors[0].info, InfoText::default());
        assert!(settings.layout().is_ok());
    }

    #[test]
    fn test_explicit_angles_and_detail() {
        let settings = MapSettings::from_toml(
            r##"
            title = "Poster"
            viewbox = 500
            outer_ratio = 0.4
            inner_ratio = 0.22
            crop_ring_ratio = 0.12
            detail = "PLAIN"

            [[sectors]]
            name = "Industry"
            color = "#f2a2a2"
            category = "industry"
            start = 200
            end = 380

            [[sectors]]
            name = "Crops"
            color = "#b8dbab"
            category = "Crops"
            start = 380
            end = 560
            "##,
        )
        .unwrap();

        assert_eq!(settings.detail, Detail::Plain);
        let layout = settings.layout().unwrap();
        assert_eq!(layout.ring().outer, 200.0);
        assert_eq!(layout.extras().crop_ring_radius, Some(60.0));
        assert_eq!(layout.sectors()[1].span, Span::new(380.0, 560.0));
    }

    #[test]
    fn test_half_specified_angles_rejected() {
        let settings = MapSettings::from_toml(
            r##"
            [[sectors]]
            name = "Lonely"
            color = "#cccccc"
            start = 0
            "##,
        )
        .unwrap();

        assert!(matches!(
            settings.layout(),
            Err(SettingsError::Layout(LayoutError::PartialAngles { .. }))
        ));
    }

    #[test]
    fn test_bad_colour_rejected() {
        let result = MapSettings::from_toml(
            r##"
            [[sectors]]
            name = "Broken"
            color = "teal"
            "##,
        );
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_no_sectors_rejected() {
        let settings = MapSettings::from_toml("title = \"Empty\"").unwrap();
        assert!(matches!(
            settings.layout(),
            Err(SettingsError::Layout(LayoutError::Empty))
        ));
    }
}
