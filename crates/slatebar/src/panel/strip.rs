//! PanelStrip - the strip widget hosting the three regions.
//!
//! A custom widget rather than a `GtkBox` because the region placement is
//! not a box layout: the center region is positioned against the monitor's
//! work area (see `layout.rs`) and the sides are clamped to the remaining
//! slack. `measure` claims the full monitor width regardless of content;
//! `size_allocate` recomputes the region boxes from scratch on every pass.
//!
//! The strip also owns the input behavior of empty panel space: primary
//! press / touch starts a window drag when a maximized window sits under
//! the press, and Escape hands focus back to the topmost window.

use std::cell::RefCell;

use gtk4::gdk;
use gtk4::gdk::BUTTON_PRIMARY;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use tracing::debug;

use crate::services::compositor::GrabRequest;
use crate::services::config_manager::ConfigManager;
use crate::services::screen::{MonitorGeometry, ScreenService};
use crate::services::windows::WindowService;
use crate::styles::widget;

use super::drag;
use super::layout::{self, Direction, RegionWidths};
use super::menu_manager::MenuManager;
use super::status_area::RegionName;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct PanelStrip {
        pub(super) left: RefCell<Option<gtk4::Box>>,
        pub(super) center: RefCell<Option<gtk4::Box>>,
        pub(super) right: RefCell<Option<gtk4::Box>>,
        /// Monitor this strip was built for; used for the preferred width
        /// and as the fallback when the live resolution fails.
        pub(super) monitor: RefCell<Option<MonitorGeometry>>,
        pub(super) menu_manager: RefCell<Option<MenuManager>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PanelStrip {
        const NAME: &'static str = "SlatebarPanelStrip";
        type Type = super::PanelStrip;
        type ParentType = gtk4::Widget;

        fn class_init(klass: &mut Self::Class) {
            klass.set_css_name("panel-strip");
        }
    }

    impl ObjectImpl for PanelStrip {
        fn constructed(&self) {
            self.parent_constructed();

            for (slot, class) in [
                (&self.left, widget::REGION_LEFT),
                (&self.center, widget::REGION_CENTER),
                (&self.right, widget::REGION_RIGHT),
            ] {
                let region = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
                region.add_css_class(widget::REGION);
                region.add_css_class(class);
                region.set_parent(&*self.obj());
                *slot.borrow_mut() = Some(region);
            }
        }

        fn dispose(&self) {
            for slot in [&self.left, &self.center, &self.right] {
                if let Some(region) = slot.borrow_mut().take() {
                    region.unparent();
                }
            }
        }
    }

    impl WidgetImpl for PanelStrip {
        fn request_mode(&self) -> gtk4::SizeRequestMode {
            gtk4::SizeRequestMode::ConstantSize
        }

        fn measure(&self, orientation: gtk4::Orientation, _for_size: i32) -> (i32, i32, i32, i32) {
            if orientation == gtk4::Orientation::Horizontal {
                // The strip always claims its monitor's full width,
                // independent of region content.
                let width = self
                    .monitor
                    .borrow()
                    .as_ref()
                    .map_or(0, |monitor| monitor.rect.width);
                (0, width, -1, -1)
            } else {
                let height = ConfigManager::global().panel_height();
                (height, height, -1, -1)
            }
        }

        fn size_allocate(&self, width: i32, height: i32, baseline: i32) {
            let (Some(left), Some(center), Some(right)) = (
                self.left.borrow().clone(),
                self.center.borrow().clone(),
                self.right.borrow().clone(),
            ) else {
                return;
            };

            let natural = RegionWidths {
                left: left.measure(gtk4::Orientation::Horizontal, -1).1,
                center: center.measure(gtk4::Orientation::Horizontal, -1).1,
                right: right.measure(gtk4::Orientation::Horizontal, -1).1,
            };

            // Resolved fresh on every pass; when the monitor or its work
            // area is unknown the correction simply drops out.
            let screen = ScreenService::global();
            let offset = screen
                .monitor_for_widget(&*self.obj())
                .and_then(|monitor| {
                    screen
                        .work_area(monitor.index)
                        .map(|area| layout::center_offset(&monitor, &area))
                })
                .unwrap_or(0);

            let direction = match self.obj().direction() {
                gtk4::TextDirection::Rtl => Direction::Rtl,
                _ => Direction::Ltr,
            };

            let regions = layout::allocate_regions(width, height, natural, direction, offset);

            for (child, child_box) in [
                (&left, regions.left),
                (&center, regions.center),
                (&right, regions.right),
            ] {
                let transform = gtk4::gsk::Transform::new()
                    .translate(&gtk4::graphene::Point::new(child_box.x1 as f32, 0.0));
                child.allocate(
                    child_box.width(),
                    child_box.height(),
                    baseline,
                    Some(transform),
                );
            }
        }
    }
}

glib::wrapper! {
    pub struct PanelStrip(ObjectSubclass<imp::PanelStrip>)
        @extends gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget;
}

impl PanelStrip {
    pub fn new(monitor: MonitorGeometry, menu_manager: MenuManager) -> Self {
        let strip: Self = glib::Object::builder().build();
        *strip.imp().monitor.borrow_mut() = Some(monitor);
        *strip.imp().menu_manager.borrow_mut() = Some(menu_manager);
        strip.set_focusable(true);
        strip.attach_controllers();
        strip
    }

    /// One of the three region containers.
    pub fn region(&self, name: RegionName) -> gtk4::Box {
        let slot = match name {
            RegionName::Left => &self.imp().left,
            RegionName::Center => &self.imp().center,
            RegionName::Right => &self.imp().right,
        };
        slot.borrow()
            .clone()
            .unwrap_or_else(|| gtk4::Box::new(gtk4::Orientation::Horizontal, 0))
    }

    fn attach_controllers(&self) {
        // Primary button and touch-begin both arrive through one gesture.
        let gesture = gtk4::GestureClick::new();
        gesture.set_button(BUTTON_PRIMARY);
        let strip = self.downgrade();
        gesture.connect_pressed(move |gesture, _n_press, x, y| {
            if let Some(strip) = strip.upgrade() {
                strip.try_drag_window(gesture, x, y);
            }
        });
        self.add_controller(gesture);

        let key = gtk4::EventControllerKey::new();
        key.connect_key_pressed(|controller, keyval, _keycode, _state| {
            if keyval == gdk::Key::Escape {
                WindowService::global().focus_default_window(controller.current_event_time());
                return glib::Propagation::Stop;
            }
            glib::Propagation::Proceed
        });
        self.add_controller(key);
    }

    /// Start a window move when a press lands on empty strip space above a
    /// draggable window. Claims the gesture's event sequence on success,
    /// otherwise lets the event propagate.
    fn try_drag_window(&self, gesture: &gtk4::GestureClick, x: f64, y: f64) {
        let menu_open = self
            .imp()
            .menu_manager
            .borrow()
            .as_ref()
            .is_some_and(MenuManager::any_open);
        if menu_open {
            return;
        }

        // Only presses on the strip itself count; children handle their own.
        let this: gtk4::Widget = self.clone().upcast();
        match self.pick(x, y, gtk4::PickFlags::DEFAULT) {
            Some(target) if target == this => {}
            _ => return,
        }

        let Some(monitor) = ScreenService::global()
            .monitor_for_widget(self)
            .or_else(|| self.imp().monitor.borrow().clone())
        else {
            return;
        };
        let stage_x = monitor.rect.x + x as i32;

        let windows = WindowService::global().windows_by_stacking();
        let Some(window) = drag::draggable_window_at(&windows, monitor.index, stage_x) else {
            return;
        };

        let grab = GrabRequest {
            device: gesture.device().map(|d| d.name().to_string()),
            time_ms: gesture.current_event_time(),
        };
        debug!("starting move grab for window {}", window.id);
        if WindowService::global().begin_move_grab(window.id, &grab) {
            gesture.set_state(gtk4::EventSequenceState::Claimed);
        }
    }
}
