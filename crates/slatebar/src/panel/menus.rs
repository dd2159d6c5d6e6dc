//! Well-known menu buttons and their role table.
//!
//! The three buttons every panel hosts are resolved through a role →
//! constructor table built once at panel construction. Constructors only
//! run when the process-wide pool has no parked instance for the role;
//! reclaimed buttons come back with their menus and timers intact.
//!
//! Button *content* is intentionally thin: the clock gets a calendar
//! popover, quick settings a few stub rows, activities a launcher action.

use gtk4::glib;
use gtk4::prelude::*;
use tracing::{debug, warn};

use crate::services::config_manager::ConfigManager;
use crate::styles::{state, widget};

use super::menu_button::PanelButton;
use super::status_area::RegionName;

pub const ROLE_QUICK_SETTINGS: &str = "quickSettings";
pub const ROLE_DATE_MENU: &str = "dateMenu";
pub const ROLE_ACTIVITIES: &str = "activities";

/// One well-known role: where it goes and how to build it when the pool
/// comes up empty.
pub struct RoleSpec {
    pub role: &'static str,
    pub region: RegionName,
    pub build: fn() -> PanelButton,
}

/// The role table, in acquisition order.
pub fn well_known_roles() -> [RoleSpec; 3] {
    [
        RoleSpec {
            role: ROLE_QUICK_SETTINGS,
            region: RegionName::Right,
            build: quick_settings_button,
        },
        RoleSpec {
            role: ROLE_DATE_MENU,
            region: RegionName::Center,
            build: date_menu_button,
        },
        RoleSpec {
            role: ROLE_ACTIVITIES,
            region: RegionName::Left,
            build: activities_button,
        },
    ]
}

fn update_clock_label(label: &gtk4::Label, format: &str) {
    let text = glib::DateTime::now_local().and_then(|now| now.format(format));
    match text {
        Ok(text) => label.set_text(&text),
        Err(e) => {
            warn!("clock format {format:?} failed: {e}");
            label.set_text("--:--");
        }
    }
}

/// Clock button with a calendar popover.
fn date_menu_button() -> PanelButton {
    let button = PanelButton::new();
    button.add_css_class(widget::CLOCK);

    let label = gtk4::Label::new(None);
    button.set_content(&label);

    let format = ConfigManager::global().config().menus.clock_format.clone();
    update_clock_label(&label, &format);

    // The button is pooled for the life of the process; the tick is
    // intentionally never removed.
    glib::timeout_add_seconds_local(1, move || {
        update_clock_label(&label, &format);
        glib::ControlFlow::Continue
    });

    let popover = gtk4::Popover::new();
    popover.set_child(Some(&gtk4::Calendar::new()));
    button.set_menu(Some(&popover));

    button
}

/// Quick-settings indicator with a popover of session toggles.
fn quick_settings_button() -> PanelButton {
    let button = PanelButton::new();
    button.add_css_class(widget::QUICK_SETTINGS);
    button.set_content(&gtk4::Image::from_icon_name("preferences-system-symbolic"));

    let rows = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    // TODO: back these switches with the session's settings portal.
    for name in ["Wi-Fi", "Bluetooth", "Night light"] {
        let row = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
        row.add_css_class(widget::QS_ROW);
        let label = gtk4::Label::new(Some(name));
        label.set_hexpand(true);
        label.set_xalign(0.0);
        row.append(&label);
        row.append(&gtk4::Switch::new());
        rows.append(&row);
    }

    let popover = gtk4::Popover::new();
    popover.set_child(Some(&rows));
    button.set_menu(Some(&popover));

    button
}

/// Activities button: spawns the configured launcher.
fn activities_button() -> PanelButton {
    let button = PanelButton::new();
    button.add_css_class(widget::ACTIVITIES);
    button.add_css_class(state::CLICKABLE);

    let label = gtk4::Label::new(Some("Activities"));
    button.set_content(&label);

    button.connect_activated(|| {
        let command = ConfigManager::global()
            .config()
            .menus
            .activities_command
            .clone();
        if command.is_empty() {
            debug!("activities pressed, no launcher configured");
            return;
        }
        if let Err(e) = glib::spawn_command_line_async(&command) {
            warn!("failed to spawn {command:?}: {e}");
        }
    });

    button
}
