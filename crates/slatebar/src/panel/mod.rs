//! Panel assembly.
//!
//! A `Panel` ties one monitor's strip to the status-area bookkeeping: it
//! checks the three well-known roles out of the process-wide pool on
//! construction, hands them back on `disable`, and hosts third-party
//! registrations through `add_to_status_area`.

pub mod drag;
pub mod layout;
pub mod menu_button;
pub mod menu_manager;
pub mod menu_pool;
pub mod menus;
pub mod status_area;
pub mod strip;

use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use tracing::debug;

use slatebar_core::{Error, Result};

use crate::services::callbacks::SubscriptionId;
use crate::services::screen::{MonitorGeometry, ScreenService};

use menu_button::PanelButton;
use menu_manager::MenuManager;
use menu_pool::RolePool;
use menus::{ROLE_ACTIVITIES, ROLE_DATE_MENU, ROLE_QUICK_SETTINGS, RoleSpec};
use status_area::{RegionName, SlotRegistry};
use strip::PanelStrip;

struct PanelInner {
    strip: PanelStrip,
    menu_manager: MenuManager,
    status_area: SlotRegistry<PanelButton>,
    screen_subscription: Cell<Option<SubscriptionId>>,
}

pub struct Panel {
    inner: Rc<PanelInner>,
}

impl Panel {
    /// Build a panel for `monitor` and populate its well-known roles.
    pub fn new(monitor: MonitorGeometry) -> Self {
        let menu_manager = MenuManager::new();
        let strip = PanelStrip::new(monitor.clone(), menu_manager.clone());

        // Work-area changes move the center region; re-run allocation.
        let strip_ref = strip.downgrade();
        let subscription = ScreenService::global().subscribe(move |_| {
            if let Some(strip) = strip_ref.upgrade() {
                strip.queue_resize();
            }
        });

        let panel = Self {
            inner: Rc::new(PanelInner {
                strip,
                menu_manager,
                status_area: SlotRegistry::new(),
                screen_subscription: Cell::new(Some(subscription)),
            }),
        };

        debug!(
            "panel created on {} (index {})",
            monitor.connector, monitor.index
        );
        for spec in menus::well_known_roles() {
            panel.acquire_menu(&spec);
        }
        panel
    }

    /// The strip widget, for embedding in a window.
    pub fn strip(&self) -> &PanelStrip {
        &self.inner.strip
    }

    /// Check the button for a well-known role out of the pool (or build
    /// it) and embed it at the front of its region. Idempotent: an
    /// occupied role is left alone.
    fn acquire_menu(&self, spec: &RoleSpec) {
        if self.inner.status_area.is_occupied(spec.role) {
            return;
        }

        let button = RolePool::global().acquire_or_else(spec.role, spec.build);
        if let Some(menu) = button.menu() {
            self.inner.menu_manager.add_menu(&menu);
        }
        insert_child_at(&self.inner.strip.region(spec.region), &button, 0);
        // Occupancy was checked above; the slot cannot conflict.
        let _ = self.inner.status_area.occupy(spec.role, button);
    }

    /// Detach a well-known role's button and park it in the pool for the
    /// next panel. The button is deliberately not destroyed (see
    /// `menu_pool`). No-op when the role is vacant.
    fn release_menu(&self, role: &str) {
        let Some(button) = self.inner.status_area.vacate(role) else {
            return;
        };
        button.detach();
        if let Some(menu) = button.menu() {
            self.inner.menu_manager.remove_menu(&menu);
        }
        RolePool::global().release(role, button);
        debug!("parked menu button for role `{role}`");
    }

    /// Register a third-party widget under `role`.
    ///
    /// `position` defaults to the front of the region; `region_name`
    /// resolves left/center/right with right as the fallback. The widget
    /// must be a `PanelButton`. Its slot clears itself when the widget is
    /// destroyed; no explicit release is required for this path.
    pub fn add_to_status_area(
        &self,
        role: &str,
        widget: &gtk4::Widget,
        position: Option<usize>,
        region_name: Option<&str>,
    ) -> Result<PanelButton> {
        if self.inner.status_area.is_occupied(role) {
            return Err(Error::RoleConflict(role.to_string()));
        }
        let Some(button) = widget.downcast_ref::<PanelButton>() else {
            return Err(Error::CapabilityViolation(role.to_string()));
        };
        let button = button.clone();

        button.detach();
        let region = RegionName::from_name(region_name.unwrap_or("right"));
        insert_child_at(
            &self.inner.strip.region(region),
            &button,
            position.unwrap_or(0),
        );
        if let Some(menu) = button.menu() {
            self.inner.menu_manager.add_menu(&menu);
        }
        self.inner.status_area.occupy(role, button.clone())?;

        // Self-unregistration: destruction clears the slot. Vacating an
        // already-vacant role is a no-op, so this stays safe when the
        // panel released the role first or is already gone.
        let inner = Rc::downgrade(&self.inner);
        let role = role.to_string();
        button.connect_destroy(move |_| {
            if let Some(inner) = inner.upgrade() {
                inner.status_area.vacate(&role);
            }
        });

        Ok(button)
    }

    /// Park the well-known menus back into the pool. Called on teardown;
    /// dynamically registered roles clean themselves up through their
    /// destroy observers.
    pub fn disable(&self) {
        self.release_menu(ROLE_QUICK_SETTINGS);
        self.release_menu(ROLE_ACTIVITIES);
        self.release_menu(ROLE_DATE_MENU);
    }
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        if let Some(id) = self.screen_subscription.take() {
            ScreenService::global().unsubscribe(id);
        }
    }
}

/// Insert `child` into `region` so it ends up at `index` among the
/// region's children. Out-of-range indices append.
fn insert_child_at(region: &gtk4::Box, child: &impl IsA<gtk4::Widget>, index: usize) {
    if index == 0 {
        region.prepend(child);
        return;
    }
    let mut sibling = region.first_child();
    for _ in 1..index {
        sibling = sibling.and_then(|s| s.next_sibling());
    }
    match sibling {
        Some(sibling) => region.insert_child_after(child, Some(&sibling)),
        None => region.append(child),
    }
}
