use super::{HOVER_LIGHTEN, SECTOR_STROKE_WIDTH, SELECTED_STROKE_WIDTH};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use palette::{FromColor, Hsl, IntoColor, Lighten, Srgb, Srgba};
use ringmap::decor::{self, Mark, Paint};
use ringmap::geometry::{Point, screen_radians};
use ringmap::metrics::{self, HALO_PADDING};
use ringmap::sector::{HexColor, Layout, Sector};
use ringmap::view::Controller;
use std::f64::consts::PI;

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn set_hex(cr: &Context, color: HexColor, alpha: f64) {
    let (r, g, b) = color.to_f64().into_components();
    cr.set_source_rgba(r, g, b, alpha);
}

/// Fill colour of a sector, lightened while hovered.
fn sector_fill(color: HexColor, hovered: bool) -> Srgb<f64> {
    let base = color.to_f64();
    if !hovered {
        return base;
    }
    let hsl: Hsl<palette::encoding::Srgb, f64> = base.into_color();
    Srgb::from_color(hsl.lighten(HOVER_LIGHTEN))
}

fn draw_centered_text(cr: &Context, text: &str, at: Point) -> Result<(), cairo::Error> {
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(
            at.x - ext.width() / 2.0 - ext.x_bearing(),
            at.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(text)?;
    }
    Ok(())
}

struct SectorRenderer<'a> {
    layout: &'a Layout,
    sector: &'a Sector,
    hovered: bool,
    selected: bool,
    font_size: f64,
}

impl<'a> SectorRenderer<'a> {
    fn new(
        layout: &'a Layout,
        sector: &'a Sector,
        hovered: bool,
        selected: bool,
        font_size: f64,
    ) -> Self {
        Self {
            layout,
            sector,
            hovered,
            selected,
            font_size,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_fill(cr, colors)?;
        self.draw_decor(cr)?;
        self.draw_label(cr, colors)
    }

    fn trace(&self, cr: &Context) {
        let ring = self.layout.ring();
        self.trace_band(cr, ring.inner, ring.outer);
    }

    /// The sector's span between `inner` and `outer`: outer arc clockwise,
    /// inner arc back counter-clockwise.
    fn trace_band(&self, cr: &Context, inner: f64, outer: f64) {
        let center = self.layout.ring().center;
        let span = self.sector.span;
        let (a0, a1) = (screen_radians(span.start), screen_radians(span.end));

        cr.new_path();
        cr.arc(center.x, center.y, outer, a0, a1);
        cr.arc_negative(center.x, center.y, inner, a1, a0);
        cr.close_path();
    }

    fn draw_fill(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let (r, g, b) = sector_fill(self.sector.color, self.hovered).into_components();
        cr.set_source_rgb(r, g, b);
        self.trace(cr);
        cr.fill_preserve()?;

        if self.selected {
            set_source(cr, colors.selected_stroke);
            cr.set_line_width(SELECTED_STROKE_WIDTH);
        } else {
            set_source(cr, colors.sector_stroke);
            cr.set_line_width(SECTOR_STROKE_WIDTH);
        }
        cr.stroke()
    }

    fn draw_decor(&self, cr: &Context) -> Result<(), cairo::Error> {
        let marks = decor::sector_marks(self.layout, self.sector);
        if marks.is_empty() {
            return Ok(());
        }

        cr.save()?;
        self.clip_decor(cr);
        for mark in &marks {
            draw_mark(cr, mark)?;
        }
        cr.restore()
    }

    /// Restricts drawing to the decor band inside this sector.
    fn clip_decor(&self, cr: &Context) {
        let (inner, outer) = self.layout.decor_band();
        self.trace_band(cr, inner, outer);
        cr.clip();
    }

    fn draw_label(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        set_source(cr, colors.label);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(self.font_size);
        draw_centered_text(
            cr,
            &self.sector.id.to_string(),
            self.layout.label_anchor(self.sector),
        )
    }
}

fn apply_paint(cr: &Context, paint: &Paint) -> Result<(), cairo::Error> {
    match (paint.fill, paint.stroke) {
        (Some(fill), Some(stroke)) => {
            set_hex(cr, fill, paint.opacity);
            cr.fill_preserve()?;
            set_hex(cr, stroke, paint.opacity);
            cr.set_line_width(paint.stroke_width);
            cr.stroke()
        }
        (Some(fill), None) => {
            set_hex(cr, fill, paint.opacity);
            cr.fill()
        }
        (None, Some(stroke)) => {
            set_hex(cr, stroke, paint.opacity);
            cr.set_line_width(paint.stroke_width);
            cr.stroke()
        }
        (None, None) => {
            cr.new_path();
            Ok(())
        }
    }
}

fn rounded_rect(cr: &Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 1.5 * PI);
    cr.close_path();
}

fn draw_mark(cr: &Context, mark: &Mark) -> Result<(), cairo::Error> {
    cr.new_path();
    match mark {
        Mark::Rect {
            center,
            width,
            height,
            corner,
            rotation_deg,
            paint,
        } => {
            cr.save()?;
            cr.translate(center.x, center.y);
            cr.rotate(rotation_deg.to_radians());
            rounded_rect(cr, -width / 2.0, -height / 2.0, *width, *height, *corner);
            apply_paint(cr, paint)?;
            cr.restore()
        }
        Mark::Circle {
            center,
            radius,
            paint,
        } => {
            cr.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
            apply_paint(cr, paint)
        }
        Mark::Line { from, to, paint } => {
            cr.move_to(from.x, from.y);
            cr.line_to(to.x, to.y);
            apply_paint(cr, paint)
        }
    }
}

fn draw_halo(cr: &Context, layout: &Layout, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let ring = layout.ring();
    cr.new_path();
    cr.arc(
        ring.center.x,
        ring.center.y,
        ring.outer + HALO_PADDING,
        0.0,
        2.0 * PI,
    );
    set_source(cr, colors.halo_fill);
    cr.fill_preserve()?;
    set_source(cr, colors.halo_stroke);
    cr.set_line_width(1.0);
    cr.stroke()
}

fn draw_centre(
    cr: &Context,
    layout: &Layout,
    viewbox: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let c = layout.ring().center;
    let extras = layout.extras();

    if let Some(r) = extras.biosphere_radius {
        cr.new_path();
        cr.arc(c.x, c.y, r, 0.0, 2.0 * PI);
        set_source(cr, colors.biosphere_fill);
        cr.fill_preserve()?;
        set_source(cr, colors.biosphere_stroke);
        cr.set_line_width(2.0);
        cr.stroke()?;
    }

    if let Some(r) = extras.crop_ring_radius {
        cr.new_path();
        cr.arc(c.x, c.y, r, 0.0, 2.0 * PI);
        set_source(cr, colors.crop_ring_fill);
        cr.fill_preserve()?;
        set_source(cr, colors.crop_ring_stroke);
        cr.set_line_width(1.0);
        cr.stroke()?;
    }

    if extras.biosphere_radius.is_some() {
        set_source(cr, colors.label);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(metrics::centre_font_size(viewbox));
        draw_centered_text(cr, "BIOSPHERE", c)?;
    }
    Ok(())
}

/// Paints the whole map for the controller's current camera onto `cr`, which
/// is expected to cover the controller's viewport.
pub fn draw(cr: &Context, controller: &Controller, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_source(cr, colors.background);
    cr.paint()?;

    let layout = controller.layout();
    let state = controller.state();
    let viewbox = controller.viewport().viewbox;
    let transform = controller.transform();
    let font_size = metrics::label_font_size(viewbox);

    cr.save()?;
    cr.translate(transform.offset.x, transform.offset.y);
    cr.scale(transform.scale, transform.scale);

    draw_halo(cr, layout, colors)?;
    for sector in layout.sectors() {
        SectorRenderer::new(
            layout,
            sector,
            state.hovered.is_some_and(|h| h.sector == sector.id),
            state.selected == Some(sector.id),
            font_size,
        )
        .draw(cr, colors)?;
    }
    draw_centre(cr, layout, viewbox, colors)?;

    cr.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmap::sector::{Category, Extras, InfoText, Ring, SectorDraft, SectorName};
    use ringmap::settings::MapSettings;
    use ringmap::view::ViewState;

    fn lightness(c: Srgb<f64>) -> f64 {
        let hsl: Hsl<palette::encoding::Srgb, f64> = c.into_color();
        hsl.lightness
    }

    #[test]
    fn test_hover_lightens_fill() {
        let color = HexColor::rgb(0xe8, 0xa2, 0x9c);
        assert_eq!(sector_fill(color, false), color.to_f64());
        assert!(lightness(sector_fill(color, true)) > lightness(color.to_f64()));
    }

    #[test]
    fn test_decor_clip_stays_inside_margin_band() {
        let drafts = [Category::Industry, Category::Storage]
            .into_iter()
            .map(|category| SectorDraft {
                name: SectorName::new(category.to_string()),
                color: HexColor::rgb(0xe8, 0xa2, 0x9c),
                info: InfoText::default(),
                category: Some(category),
                span: None,
            })
            .collect();
        let ring = Ring {
            center: Point::new(500.0, 500.0),
            inner: 400.0,
            outer: 440.0,
        };
        let layout = Layout::build(drafts, ring, Extras::default()).unwrap();
        let renderer = SectorRenderer::new(&layout, &layout.sectors()[0], false, false, 12.0);

        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1000, 1000).unwrap();
        let cr = Context::new(&surface).unwrap();
        renderer.clip_decor(&cr);

        // first sector spans -90..90, so the band crosses the +x axis at 406..434
        assert!(cr.in_clip(920.0, 500.0).unwrap());
        assert!(!cr.in_clip(937.0, 500.0).unwrap());
        assert!(!cr.in_clip(903.0, 500.0).unwrap());
    }

    #[test]
    fn test_draw_offscreen() {
        let settings = MapSettings::default();
        let mut state = ViewState::at(1.5, Point::new(-20.0, 10.0));
        state.selected = Some(ringmap::sector::SectorId::new(2));
        let controller =
            Controller::with_state(settings.layout().unwrap(), settings.viewport(), state);

        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1000, 1000).unwrap();
        let cr = Context::new(&surface).unwrap();
        draw(&cr, &controller, &ThemeColors::default()).unwrap();
    }
}
