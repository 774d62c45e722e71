//! Transient view state of a mounted map and the controller that turns
//! pointer and wheel input into state transitions.
//!
//! Nothing here can fail: out-of-range zoom requests are clamped and input
//! that does not apply to the current state is ignored.

use crate::geometry::Point;
use crate::sector::{Layout, Sector, SectorId};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const WHEEL_ZOOM_IN: f64 = 1.12;
pub const WHEEL_ZOOM_OUT: f64 = 0.88;
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

/// A square logical viewbox fitted (centred, aspect preserved) into a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub viewbox: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A canvas exactly the size of the viewbox; canvas pixels equal colony units.
    pub fn square(viewbox: f64) -> Self {
        Self {
            viewbox,
            width: viewbox,
            height: viewbox,
        }
    }

    pub fn fit_scale(&self) -> f64 {
        let side = self.width.min(self.height);
        if side > 0.0 && self.viewbox > 0.0 {
            side / self.viewbox
        } else {
            1.0
        }
    }

    pub fn fit_origin(&self) -> Point {
        let drawn = self.viewbox * self.fit_scale();
        Point::new(
            ((self.width - drawn) / 2.0).max(0.0),
            ((self.height - drawn) / 2.0).max(0.0),
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.viewbox / 2.0, self.viewbox / 2.0)
    }
}

/// Uniform scale followed by a translation: `canvas = offset + scale · colony`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale: f64,
    pub offset: Point,
}

impl Affine {
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + self.scale * p.x,
            self.offset.y + self.scale * p.y,
        )
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub sector: SectorId,
    /// Canvas-local cursor position, for tooltip placement.
    pub at: Point,
}

/// Cursor and pan offset captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDragSession {
    pub start_cursor: Point,
    pub start_pan: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    /// Canvas pixels.
    pub pan: Point,
    pub hovered: Option<Hover>,
    pub selected: Option<SectorId>,
    drag: Option<PointerDragSession>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            hovered: None,
            selected: None,
            drag: None,
        }
    }
}

impl ViewState {
    /// A resting camera at `zoom` (clamped) and `pan`, nothing hovered or selected.
    pub fn at(zoom: f64, pan: Point) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan,
            ..Self::default()
        }
    }

    pub fn is_panning(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<PointerDragSession> {
        self.drag
    }
}

/// What the host should refresh after an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewChange {
    /// The canvas needs repainting.
    pub should_redraw: bool,
    /// Tooltip or selection panel content changed.
    pub should_refresh_panel: bool,
}

impl ViewChange {
    pub fn new(should_redraw: bool, should_refresh_panel: bool) -> Self {
        Self {
            should_redraw,
            should_refresh_panel,
        }
    }

    fn redraw(changed: bool) -> Self {
        Self::new(changed, false)
    }
}

pub struct Controller {
    layout: Layout,
    viewport: Viewport,
    state: ViewState,
}

impl Controller {
    pub fn new(layout: Layout, viewport: Viewport) -> Self {
        Self {
            layout,
            viewport,
            state: ViewState::default(),
        }
    }

    pub fn with_state(layout: Layout, viewport: Viewport, state: ViewState) -> Self {
        Self {
            layout,
            viewport,
            state,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Swaps in a new layout, dropping hover or selection that points at a
    /// sector the new layout lacks.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        if let Some(hover) = self.state.hovered
            && self.layout.sector(hover.sector).is_none()
        {
            self.state.hovered = None;
        }
        if let Some(id) = self.state.selected
            && self.layout.sector(id).is_none()
        {
            self.state.selected = None;
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn resize(&mut self, width: f64, height: f64) -> ViewChange {
        let changed = self.viewport.width != width || self.viewport.height != height;
        self.viewport.width = width;
        self.viewport.height = height;
        ViewChange::redraw(changed)
    }

    /// Colony space to canvas space, with zoom about the viewbox centre.
    pub fn transform(&self) -> Affine {
        let fit = self.viewport.fit_scale();
        let origin = self.viewport.fit_origin();
        let c = self.viewport.center();
        let zoom = self.state.zoom;
        Affine {
            scale: fit * zoom,
            offset: Point::new(
                origin.x + self.state.pan.x + fit * c.x * (1.0 - zoom),
                origin.y + self.state.pan.y + fit * c.y * (1.0 - zoom),
            ),
        }
    }

    pub fn hovered_sector(&self) -> Option<&Sector> {
        self.state
            .hovered
            .and_then(|h| self.layout.sector(h.sector))
    }

    pub fn selected_sector(&self) -> Option<&Sector> {
        self.state.selected.and_then(|id| self.layout.sector(id))
    }

    pub fn sector_at(&self, at: Point) -> Option<SectorId> {
        self.layout.hit_test(self.transform().invert(at))
    }

    pub fn pointer_down(&mut self, at: Point) -> ViewChange {
        self.state.drag = Some(PointerDragSession {
            start_cursor: at,
            start_pan: self.state.pan,
        });
        log::debug!("Drag started at ({:.1}, {:.1})", at.x, at.y);
        ViewChange::default()
    }

    pub fn pointer_move(&mut self, at: Point) -> ViewChange {
        let mut redraw = false;

        if let Some(drag) = self.state.drag {
            let pan = drag.start_pan + (at - drag.start_cursor);
            redraw = pan != self.state.pan;
            self.state.pan = pan;
        }

        let hover = self.sector_at(at).map(|sector| Hover { sector, at });
        let sector_changed = hover.map(|h| h.sector) != self.state.hovered.map(|h| h.sector);
        let moved = hover != self.state.hovered;
        self.state.hovered = hover;

        ViewChange::new(redraw || sector_changed, moved)
    }

    pub fn pointer_up(&mut self) -> ViewChange {
        if self.state.drag.take().is_some() {
            log::debug!(
                "Drag ended with pan ({:.1}, {:.1})",
                self.state.pan.x,
                self.state.pan.y
            );
        }
        ViewChange::default()
    }

    /// The pointer left the canvas: ends any drag and clears hover.
    pub fn pointer_leave(&mut self) -> ViewChange {
        self.pointer_up();
        self.clear_hover()
    }

    pub fn clear_hover(&mut self) -> ViewChange {
        let changed = self.state.hovered.take().is_some();
        ViewChange::new(changed, changed)
    }

    /// Zooms in for negative (upward) `delta_y`, out for positive. The caller
    /// should treat the wheel event as consumed either way.
    pub fn wheel(&mut self, delta_y: f64) -> ViewChange {
        if delta_y == 0.0 || delta_y.is_nan() {
            return ViewChange::default();
        }
        let factor = if -delta_y.signum() > 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.set_zoom(self.state.zoom * factor)
    }

    pub fn zoom_in(&mut self) -> ViewChange {
        self.set_zoom(self.state.zoom * BUTTON_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> ViewChange {
        self.set_zoom(self.state.zoom / BUTTON_ZOOM_STEP)
    }

    fn set_zoom(&mut self, zoom: f64) -> ViewChange {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.state.zoom;
        self.state.zoom = zoom;
        ViewChange::redraw(changed)
    }

    pub fn reset(&mut self) -> ViewChange {
        let changed = self.state.zoom != 1.0 || self.state.pan != Point::default();
        self.state.zoom = 1.0;
        self.state.pan = Point::default();
        ViewChange::redraw(changed)
    }

    /// Selects whatever sector is under `at`; clicks on empty space keep the
    /// current selection.
    pub fn click(&mut self, at: Point) -> ViewChange {
        match self.sector_at(at) {
            Some(id) => self.select(id),
            None => ViewChange::default(),
        }
    }

    pub fn select(&mut self, id: SectorId) -> ViewChange {
        if self.layout.sector(id).is_none() {
            return ViewChange::default();
        }
        let changed = self.state.selected != Some(id);
        self.state.selected = Some(id);
        if changed {
            log::debug!("Selected sector {}", id);
        }
        ViewChange::new(changed, changed)
    }

    pub fn close_selection(&mut self) -> ViewChange {
        let changed = self.state.selected.take().is_some();
        ViewChange::new(changed, changed)
    }

    /// Hands the selected sector to `go`. Returns `false` (and does nothing)
    /// without a selection.
    pub fn navigate<F>(&self, go: F) -> bool
    where
        F: FnOnce(&Sector),
    {
        match self.selected_sector() {
            Some(sector) => {
                log::info!("Navigating to '{}'", sector.name);
                go(sector);
                true
            }
            None => false,
        }
    }
}
