//! Drawing metrics shared by the SVG and cairo renderers, in colony units.

/// Gap between the outer ring and the halo disc behind it.
pub const HALO_PADDING: f64 = 16.0;

const LABEL_FONT_RATIO: f64 = 0.012;
const MIN_LABEL_FONT: f64 = 10.0;
const CENTRE_FONT_RATIO: f64 = 0.02;
const MIN_CENTRE_FONT: f64 = 12.0;

/// Size of the sector number labels.
pub fn label_font_size(viewbox: f64) -> f64 {
    (viewbox * LABEL_FONT_RATIO).max(MIN_LABEL_FONT)
}

/// Size of the `BIOSPHERE` caption.
pub fn centre_font_size(viewbox: f64) -> f64 {
    (viewbox * CENTRE_FONT_RATIO).max(MIN_CENTRE_FONT)
}
