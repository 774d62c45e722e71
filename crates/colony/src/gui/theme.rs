use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

/// Colours used by the map canvas. The first four follow the active GTK
/// theme; the colony-specific ones are fixed.
pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub sector_stroke: Srgba<f64>,
    pub selected_stroke: Srgba<f64>,
    pub label: Srgba<f64>,
    pub halo_fill: Srgba<f64>,
    pub halo_stroke: Srgba<f64>,
    pub biosphere_fill: Srgba<f64>,
    pub biosphere_stroke: Srgba<f64>,
    pub crop_ring_fill: Srgba<f64>,
    pub crop_ring_stroke: Srgba<f64>,
}

fn rgb8(r: u8, g: u8, b: u8) -> Srgba<f64> {
    Srgba::new(r, g, b, 255).into_format()
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            background: Self::lookup_color(
                context,
                "theme_base_color",
                rgb8(0xfb, 0xfb, 0xfa),
                None,
            ),
            sector_stroke: Self::lookup_color(
                context,
                "theme_fg_color",
                rgb8(0x33, 0x33, 0x33),
                Some(0.85),
            ),
            selected_stroke: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                rgb8(0x1a, 0x5f, 0xb4),
                Some(1.0),
            ),
            label: Self::lookup_color(
                context,
                "theme_fg_color",
                rgb8(0x11, 0x11, 0x11),
                Some(1.0),
            ),
            ..Self::default()
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                Srgba::new(
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    alpha_override.unwrap_or(c.alpha() as f64),
                )
            })
            .unwrap_or(fallback)
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: rgb8(0xfb, 0xfb, 0xfa),
            sector_stroke: rgb8(0x33, 0x33, 0x33),
            selected_stroke: rgb8(0x1a, 0x5f, 0xb4),
            label: rgb8(0x11, 0x11, 0x11),
            halo_fill: rgb8(0xff, 0xff, 0xff),
            halo_stroke: rgb8(0xe9, 0xe9, 0xe9),
            biosphere_fill: rgb8(0xea, 0xf4, 0xe6),
            biosphere_stroke: rgb8(0x2b, 0x2b, 0x2b),
            crop_ring_fill: rgb8(0xcf, 0xe8, 0xc7),
            crop_ring_stroke: rgb8(0x44, 0x44, 0x44),
        }
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.colony-title {
    font-weight: 800;
    font-size: 1.3em;
    letter-spacing: 1px;
}

.colony-subtitle {
    opacity: 0.7;
    letter-spacing: 2px;
}

.colony-panel {
    background-color: @theme_base_color;
    border-radius: 8px;
    padding: 12px;
    box-shadow: 0 1px 4px alpha(black, 0.12);
}

.colony-heading {
    font-weight: 700;
}

.colony-tooltip {
    background-color: alpha(white, 0.96);
    color: #111111;
    border: 1px solid #dddddd;
    border-radius: 6px;
    padding: 6px 8px;
}

.colony-tooltip-name {
    font-weight: 700;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
