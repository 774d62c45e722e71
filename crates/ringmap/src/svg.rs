//! Static SVG rendering of a map under a given camera.
//!
//! The document mirrors what the desktop view draws: each sector gets its
//! fill, clipped decoration, a transparent hit overlay carrying a `<title>`
//! tooltip, and its number at mid-angle/mid-radius. Zoom and pan become one
//! `transform` on the group wrapping every shape.

use crate::decor::{self, Mark, Paint};
use crate::geometry::Coord;
use crate::metrics::{self, HALO_PADDING};
use crate::sector::{Layout, Sector};
use crate::view::Controller;
use std::fmt::Write;

const BACKGROUND: &str = "#fbfbfa";
const HALO_FILL: &str = "#ffffff";
const HALO_STROKE: &str = "#e9e9e9";
const SECTOR_STROKE: &str = "#333333";
const LABEL_FILL: &str = "#111111";
const BIOSPHERE_FILL: &str = "#eaf4e6";
const BIOSPHERE_STROKE: &str = "#2b2b2b";
const CROP_RING_FILL: &str = "#cfe8c7";
const CROP_RING_STROKE: &str = "#444444";

/// Escape the five XML special characters.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn paint_attrs(paint: &Paint) -> String {
    let fill = paint.fill.map_or_else(|| "none".to_string(), |c| c.to_string());
    let mut attrs = format!(r#"fill="{fill}""#);
    if let Some(stroke) = paint.stroke {
        let _ = write!(
            attrs,
            r#" stroke="{stroke}" stroke-width="{}""#,
            Coord(paint.stroke_width)
        );
    }
    if paint.opacity < 1.0 {
        let _ = write!(attrs, r#" opacity="{}""#, Coord(paint.opacity));
    }
    attrs
}

fn write_mark(out: &mut String, mark: &Mark) {
    match mark {
        Mark::Rect {
            center,
            width,
            height,
            corner,
            rotation_deg,
            paint,
        } => {
            let _ = write!(
                out,
                r#"      <rect x="{}" y="{}" width="{}" height="{}" rx="{}""#,
                Coord(center.x - width / 2.0),
                Coord(center.y - height / 2.0),
                Coord(*width),
                Coord(*height),
                Coord(*corner),
            );
            if *rotation_deg != 0.0 {
                let _ = write!(
                    out,
                    r#" transform="rotate({} {} {})""#,
                    Coord(*rotation_deg),
                    Coord(center.x),
                    Coord(center.y)
                );
            }
            let _ = writeln!(out, " {}/>", paint_attrs(paint));
        }
        Mark::Circle {
            center,
            radius,
            paint,
        } => {
            let _ = writeln!(
                out,
                r#"      <circle cx="{}" cy="{}" r="{}" {}/>"#,
                Coord(center.x),
                Coord(center.y),
                Coord(*radius),
                paint_attrs(paint)
            );
        }
        Mark::Line { from, to, paint } => {
            let _ = writeln!(
                out,
                r#"      <line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                Coord(from.x),
                Coord(from.y),
                Coord(to.x),
                Coord(to.y),
                paint_attrs(paint)
            );
        }
    }
}

fn clip_id(sector: &Sector) -> String {
    format!("sector-clip-{}", sector.id)
}

fn write_sector(out: &mut String, controller: &Controller, sector: &Sector) {
    let layout = controller.layout();
    let state = controller.state();
    let d = layout.path(sector).to_string();
    let selected = state.selected == Some(sector.id);
    let hovered = state.hovered.is_some_and(|h| h.sector == sector.id);

    let mut class = String::from("sector");
    if hovered {
        class.push_str(" hovered");
    }
    if selected {
        class.push_str(" selected");
    }

    let _ = writeln!(
        out,
        r#"    <g class="{class}" data-sector="{}">"#,
        sector.id
    );
    let _ = writeln!(
        out,
        r#"      <path d="{d}" fill="{}" stroke="{SECTOR_STROKE}" stroke-width="{}"/>"#,
        sector.color,
        if selected { 3 } else { 1 }
    );

    let marks = decor::sector_marks(layout, sector);
    if !marks.is_empty() {
        let _ = writeln!(out, r#"      <g clip-path="url(#{})">"#, clip_id(sector));
        for mark in &marks {
            out.push_str("  ");
            write_mark(out, mark);
        }
        let _ = writeln!(out, "      </g>");
    }

    let _ = writeln!(
        out,
        r#"      <path class="hit" d="{d}" fill="transparent"><title>{}: {}</title></path>"#,
        xml_escape(sector.name.as_str()),
        xml_escape(sector.info.as_str())
    );

    let anchor = layout.label_anchor(sector);
    let font_size = metrics::label_font_size(controller.viewport().viewbox);
    let _ = writeln!(
        out,
        r#"      <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-size="{}" font-weight="800" fill="{LABEL_FILL}">{}</text>"#,
        Coord(anchor.x),
        Coord(anchor.y),
        Coord(font_size),
        sector.id
    );
    let _ = writeln!(out, "    </g>");
}

fn write_centre(out: &mut String, layout: &Layout, viewbox: f64) {
    let c = layout.ring().center;
    let extras = layout.extras();

    if let Some(r) = extras.biosphere_radius {
        let _ = writeln!(
            out,
            r#"    <circle cx="{}" cy="{}" r="{}" fill="{BIOSPHERE_FILL}" stroke="{BIOSPHERE_STROKE}" stroke-width="2"/>"#,
            Coord(c.x),
            Coord(c.y),
            Coord(r)
        );
    }
    if let Some(r) = extras.crop_ring_radius {
        let _ = writeln!(
            out,
            r#"    <circle cx="{}" cy="{}" r="{}" fill="{CROP_RING_FILL}" stroke="{CROP_RING_STROKE}"/>"#,
            Coord(c.x),
            Coord(c.y),
            Coord(r)
        );
    }
    if extras.biosphere_radius.is_some() {
        let _ = writeln!(
            out,
            r#"    <text x="{}" y="{}" text-anchor="middle" font-size="{}" font-weight="900" fill="{LABEL_FILL}">BIOSPHERE</text>"#,
            Coord(c.x),
            Coord(c.y + 6.0),
            Coord(metrics::centre_font_size(viewbox))
        );
    }
}

/// Renders the controller's layout under its current camera as a standalone
/// SVG document sized by the controller's viewport.
pub fn render(controller: &Controller, title: &str) -> String {
    let layout = controller.layout();
    let viewport = controller.viewport();
    let transform = controller.transform();
    let ring = layout.ring();
    let mut out = String::new();

    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" preserveAspectRatio="xMidYMid meet">"#,
        w = Coord(viewport.width),
        h = Coord(viewport.height),
    );
    let _ = writeln!(out, "  <title>{}</title>", xml_escape(title));
    let _ = writeln!(
        out,
        r#"  <rect width="100%" height="100%" fill="{BACKGROUND}"/>"#
    );

    let _ = writeln!(out, "  <defs>");
    for sector in layout.sectors() {
        let _ = writeln!(
            out,
            r#"    <clipPath id="{}"><path d="{}"/></clipPath>"#,
            clip_id(sector),
            layout.decor_path(sector)
        );
    }
    let _ = writeln!(out, "  </defs>");

    let _ = writeln!(
        out,
        r#"  <g transform="translate({} {}) scale({})">"#,
        Coord(transform.offset.x),
        Coord(transform.offset.y),
        Coord(transform.scale)
    );
    let _ = writeln!(
        out,
        r#"    <circle cx="{}" cy="{}" r="{}" fill="{HALO_FILL}" stroke="{HALO_STROKE}"/>"#,
        Coord(ring.center.x),
        Coord(ring.center.y),
        Coord(ring.outer + HALO_PADDING)
    );
    for sector in layout.sectors() {
        write_sector(&mut out, controller, sector);
    }
    write_centre(&mut out, layout, viewport.viewbox);
    let _ = writeln!(out, "  </g>");
    let _ = writeln!(out, "</svg>");

    out
}
