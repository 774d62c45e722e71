use crate::config::{self, LoadedMap};
use crate::events::AppEvent;
use crate::gui::map::{self, CLICK_SLOP};
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use ringmap::geometry::Point;
use ringmap::sector::{Layout, Sector};
use ringmap::view::{Controller, ViewChange, Viewport};
use std::cell::RefCell;
use std::rc::Rc;

const SUBTITLE: &str = "FUNCTIONAL ANALYSIS OF SPACE COLONY";
const SELECTION_HINT: &str = "Click any sector to view details.";
const CONTROLS_HINT: &str = "Pan: drag the map. Zoom: scroll or use the buttons. Hover for info.";

#[derive(Debug, Clone, PartialEq)]
struct Tooltip {
    name: String,
    info: String,
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct SelectionInfo {
    name: String,
    info: String,
}

impl From<&Sector> for SelectionInfo {
    fn from(sector: &Sector) -> Self {
        Self {
            name: format!("{}. {}", sector.id, sector.name),
            info: sector.info.to_string(),
        }
    }
}

pub struct AppModel {
    controller: Rc<RefCell<Controller>>,
    title: String,
    tooltip: Option<Tooltip>,
    selection: Option<SelectionInfo>,
    status: String,
    panning: bool,
    drawing_area: gtk::DrawingArea,
    legend: gtk::FlowBox,
}

#[derive(Debug)]
pub enum AppMsg {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp { at: Point, travel: f64 },
    PointerLeave,
    Wheel(f64),
    ZoomIn,
    ZoomOut,
    Reset,
    Navigate,
    CloseSelection,
    EditConfig,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

fn legend_entry(sector: &Sector) -> gtk::Box {
    let entry = gtk::Box::new(gtk::Orientation::Horizontal, 8);

    let swatch = gtk::DrawingArea::new();
    swatch.set_content_width(20);
    swatch.set_content_height(12);
    swatch.set_valign(gtk::Align::Center);
    let (r, g, b) = sector.color.to_f64().into_components();
    swatch.set_draw_func(move |_, cr, w, h| {
        cr.rectangle(0.5, 0.5, w as f64 - 1.0, h as f64 - 1.0);
        cr.set_source_rgb(r, g, b);
        let _ = cr.fill_preserve();
        cr.set_source_rgba(0.0, 0.0, 0.0, 0.15);
        cr.set_line_width(1.0);
        let _ = cr.stroke();
    });

    let label = gtk::Label::new(Some(&format!("{}. {}", sector.id, sector.name)));
    label.set_xalign(0.0);
    label.set_tooltip_text(Some(sector.info.as_str()));

    entry.append(&swatch);
    entry.append(&label);
    entry
}

fn fill_legend(legend: &gtk::FlowBox, layout: &Layout) {
    while let Some(child) = legend.first_child() {
        legend.remove(&child);
    }
    for sector in layout.sectors() {
        legend.insert(&legend_entry(sector), -1);
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (LoadedMap, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Colony"),
            set_default_width: 1200,
            set_default_height: 820,

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 24,
                set_margin_top: 16,
                set_margin_bottom: 16,
                set_margin_start: 16,
                set_margin_end: 16,

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    set_spacing: 6,
                    set_hexpand: true,

                    gtk::Label {
                        #[watch]
                        set_label: &model.title,
                        add_css_class: "colony-title",
                    },

                    gtk::Label {
                        set_label: SUBTITLE,
                        add_css_class: "colony-subtitle",
                    },

                    gtk::Overlay {
                        set_hexpand: true,
                        set_vexpand: true,

                        #[name = "drawing_area"]
                        gtk::DrawingArea {
                            set_hexpand: true,
                            set_vexpand: true,
                            #[watch]
                            set_cursor_from_name: Some(if model.panning { "grabbing" } else { "grab" }),

                            add_controller = gtk::EventControllerMotion {
                                connect_motion[sender] => move |_, x, y| {
                                    sender.input(AppMsg::PointerMove(Point::new(x, y)));
                                },
                                connect_leave[sender] => move |_| {
                                    sender.input(AppMsg::PointerLeave);
                                },
                            },

                            add_controller = gtk::GestureDrag {
                                set_button: gtk::gdk::BUTTON_PRIMARY,
                                connect_drag_begin[sender] => move |_, x, y| {
                                    sender.input(AppMsg::PointerDown(Point::new(x, y)));
                                },
                                connect_drag_update[sender] => move |gesture, dx, dy| {
                                    if let Some((x, y)) = gesture.start_point() {
                                        sender.input(AppMsg::PointerMove(Point::new(x + dx, y + dy)));
                                    }
                                },
                                connect_drag_end[sender] => move |gesture, dx, dy| {
                                    if let Some((x, y)) = gesture.start_point() {
                                        sender.input(AppMsg::PointerUp {
                                            at: Point::new(x + dx, y + dy),
                                            travel: dx.hypot(dy),
                                        });
                                    }
                                },
                            },

                            add_controller = gtk::EventControllerScroll {
                                set_flags: gtk::EventControllerScrollFlags::VERTICAL,
                                connect_scroll[sender] => move |_, _, dy| {
                                    sender.input(AppMsg::Wheel(dy));
                                    glib::Propagation::Stop
                                },
                            },
                        },

                        add_overlay = &gtk::Box {
                            set_orientation: gtk::Orientation::Vertical,
                            set_spacing: 2,
                            set_halign: gtk::Align::Start,
                            set_valign: gtk::Align::Start,
                            set_can_target: false,
                            add_css_class: "colony-tooltip",
                            #[watch]
                            set_visible: model.tooltip.is_some(),
                            #[watch]
                            set_margin_start: model.tooltip.as_ref().map_or(0, |t| t.x),
                            #[watch]
                            set_margin_top: model.tooltip.as_ref().map_or(0, |t| t.y),

                            gtk::Label {
                                set_xalign: 0.0,
                                add_css_class: "colony-tooltip-name",
                                #[watch]
                                set_label: model.tooltip.as_ref().map_or("", |t| t.name.as_str()),
                            },
                            gtk::Label {
                                set_xalign: 0.0,
                                #[watch]
                                set_label: model.tooltip.as_ref().map_or("", |t| t.info.as_str()),
                            },
                        },
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Vertical,
                    set_spacing: 16,
                    set_width_request: 320,

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 8,
                        add_css_class: "colony-panel",

                        gtk::Label {
                            set_label: "Legend",
                            set_xalign: 0.0,
                            add_css_class: "colony-heading",
                        },

                        #[name = "legend"]
                        gtk::FlowBox {
                            set_selection_mode: gtk::SelectionMode::None,
                            set_max_children_per_line: 2,
                            set_column_spacing: 8,
                            set_row_spacing: 4,
                        },
                    },

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_spacing: 8,
                        add_css_class: "colony-panel",

                        gtk::Label {
                            set_label: "Selected Sector",
                            set_xalign: 0.0,
                            add_css_class: "colony-heading",
                        },

                        gtk::Label {
                            set_xalign: 0.0,
                            add_css_class: "colony-tooltip-name",
                            #[watch]
                            set_visible: model.selection.is_some(),
                            #[watch]
                            set_label: model.selection.as_ref().map_or("", |s| s.name.as_str()),
                        },

                        gtk::Label {
                            set_xalign: 0.0,
                            set_wrap: true,
                            #[watch]
                            set_label: model.selection.as_ref().map_or(SELECTION_HINT, |s| s.info.as_str()),
                        },

                        gtk::Box {
                            set_orientation: gtk::Orientation::Horizontal,
                            set_spacing: 8,
                            set_homogeneous: true,
                            #[watch]
                            set_visible: model.selection.is_some(),

                            gtk::Button {
                                set_label: "Goto",
                                add_css_class: "suggested-action",
                                connect_clicked => AppMsg::Navigate,
                            },
                            gtk::Button {
                                set_label: "Close",
                                connect_clicked => AppMsg::CloseSelection,
                            },
                        },
                    },

                    gtk::Box {
                        set_orientation: gtk::Orientation::Horizontal,
                        set_spacing: 6,
                        set_halign: gtk::Align::Center,

                        gtk::Button {
                            set_label: "+",
                            set_tooltip_text: Some("Zoom in"),
                            connect_clicked => AppMsg::ZoomIn,
                        },
                        gtk::Button {
                            set_label: "\u{2212}",
                            set_tooltip_text: Some("Zoom out"),
                            connect_clicked => AppMsg::ZoomOut,
                        },
                        gtk::Button {
                            set_label: "Reset",
                            connect_clicked => AppMsg::Reset,
                        },
                    },

                    gtk::Label {
                        set_label: CONTROLS_HINT,
                        set_wrap: true,
                        set_xalign: 0.0,
                        add_css_class: "dim-label",
                    },

                    gtk::Label {
                        set_xalign: 0.0,
                        set_wrap: true,
                        #[watch]
                        set_label: &model.status,
                    },

                    gtk::Button {
                        set_label: "Edit map config",
                        set_valign: gtk::Align::End,
                        set_vexpand: true,
                        connect_clicked => AppMsg::EditConfig,
                    },
                },
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (map, rx) = init;

        theme::load_css();

        let controller = Controller::new(map.layout, map.settings.viewport());

        let model = AppModel {
            controller: Rc::new(RefCell::new(controller)),
            title: map.settings.title,
            tooltip: None,
            selection: None,
            status: String::new(),
            panning: false,
            drawing_area: gtk::DrawingArea::default(),
            legend: gtk::FlowBox::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model.legend = widgets.legend.clone();
        fill_legend(&model.legend, model.controller.borrow().layout());

        let controller_draw = model.controller.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                controller_draw
                    .borrow_mut()
                    .resize(width as f64, height as f64);
                if let Err(e) = map::draw(cr, &controller_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        let change = match msg {
            AppMsg::PointerDown(at) => self.controller.borrow_mut().pointer_down(at),
            AppMsg::PointerMove(at) => self.controller.borrow_mut().pointer_move(at),
            AppMsg::PointerUp { at, travel } => {
                let mut controller = self.controller.borrow_mut();
                controller.pointer_up();
                if travel < CLICK_SLOP {
                    controller.click(at)
                } else {
                    ViewChange::default()
                }
            }
            AppMsg::PointerLeave => self.controller.borrow_mut().pointer_leave(),
            AppMsg::Wheel(dy) => self.controller.borrow_mut().wheel(dy),
            AppMsg::ZoomIn => self.controller.borrow_mut().zoom_in(),
            AppMsg::ZoomOut => self.controller.borrow_mut().zoom_out(),
            AppMsg::Reset => self.controller.borrow_mut().reset(),
            AppMsg::CloseSelection => self.controller.borrow_mut().close_selection(),
            AppMsg::Navigate => {
                let controller = self.controller.borrow();
                controller.navigate(|sector| {
                    self.status = format!("Navigating to {}", sector.name);
                });
                ViewChange::default()
            }
            AppMsg::EditConfig => {
                self.edit_config();
                ViewChange::default()
            }
            AppMsg::ConfigReload => self.reload(),
        };

        if change.should_refresh_panel {
            self.sync_panel();
        }
        if change.should_redraw {
            self.drawing_area.queue_draw();
        }
        self.panning = self.controller.borrow().state().is_panning();
    }
}

impl AppModel {
    fn sync_panel(&mut self) {
        let controller = self.controller.borrow();
        let viewport = controller.viewport();

        self.tooltip = controller
            .state()
            .hovered
            .zip(controller.hovered_sector())
            .map(|(hover, sector)| {
                let (x, y) = map::tooltip_origin(hover.at, viewport.width, viewport.height);
                Tooltip {
                    name: sector.name.to_string(),
                    info: sector.info.to_string(),
                    x,
                    y,
                }
            });
        self.selection = controller.selected_sector().map(SelectionInfo::from);
    }

    fn edit_config(&mut self) {
        match config::write_default_config() {
            Ok(path) => {
                if let Err(e) = std::process::Command::new("xdg-open").arg(&path).spawn() {
                    log::error!("Failed to open {}: {}", path.display(), e);
                }
                self.status = format!("Editing {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to write default config: {}", e);
                self.status = format!("Could not write config: {}", e);
            }
        }
    }

    fn reload(&mut self) -> ViewChange {
        match config::load_config() {
            Ok(map) => {
                {
                    let mut controller = self.controller.borrow_mut();
                    let viewport = Viewport {
                        viewbox: map.settings.viewbox,
                        ..controller.viewport()
                    };
                    controller.set_layout(map.layout);
                    controller.set_viewport(viewport);
                    fill_legend(&self.legend, controller.layout());
                }
                self.title = map.settings.title;
                self.status.clear();
                log::info!("Configuration reloaded");
                ViewChange::new(true, true)
            }
            Err(e) => {
                log::error!("Failed to reload config: {}", e);
                self.status = format!("Config not reloaded: {}", e);
                ViewChange::default()
            }
        }
    }
}
