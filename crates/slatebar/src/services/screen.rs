//! ScreenService - monitor geometries and work areas.
//!
//! Keeps the latest compositor screen snapshot on the main thread so the
//! strip's allocation pass can resolve its monitor and work area without
//! blocking. The backend's event hook (invoked from its reader thread)
//! schedules a refresh on the GTK main loop; a refresh re-queries the
//! backend and notifies subscribers when anything changed, which is what
//! re-triggers allocation after a dock appears or an output moves.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::glib;
use gtk4::prelude::*;
use tracing::debug;

use super::callbacks::{SubscriptionId, Subscribers};
use super::compositor::{CompositorBackend, Rect, ScreenState};

/// One monitor as the panel sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorGeometry {
    /// Stable index (position in the backend's output list).
    pub index: i32,
    /// Connector name ("DP-1", ...).
    pub connector: String,
    /// Full monitor geometry in global coordinates.
    pub rect: Rect,
}

pub struct ScreenService {
    backend: RefCell<Option<Arc<dyn CompositorBackend>>>,
    state: RefCell<ScreenState>,
    subscribers: Subscribers<ScreenState>,
}

thread_local! {
    static SCREEN_SERVICE: Rc<ScreenService> = Rc::new(ScreenService {
        backend: RefCell::new(None),
        state: RefCell::new(ScreenState::default()),
        subscribers: Subscribers::new(),
    });
}

impl ScreenService {
    /// The shared instance. Main thread only.
    pub fn global() -> Rc<ScreenService> {
        SCREEN_SERVICE.with(Rc::clone)
    }

    /// Wire the service to a backend and take the initial snapshot.
    pub fn init(&self, backend: Arc<dyn CompositorBackend>) {
        backend.set_event_hook(Box::new(|| {
            // Called from the backend's reader thread; hop onto the GTK
            // main loop before touching any service state.
            glib::idle_add_once(|| ScreenService::global().refresh());
        }));
        *self.backend.borrow_mut() = Some(backend);
        self.refresh();
    }

    /// Re-query the backend and notify subscribers on change.
    pub fn refresh(&self) {
        let Some(backend) = self.backend.borrow().clone() else {
            return;
        };
        let fresh = backend.screen_state();
        if fresh == *self.state.borrow() {
            return;
        }
        debug!("screen state changed: {} output(s)", fresh.outputs.len());
        *self.state.borrow_mut() = fresh.clone();
        self.subscribers.emit(&fresh);
    }

    /// Subscribe to screen-state changes.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ScreenState) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.unsubscribe(id);
    }

    /// Look up a monitor by connector name.
    pub fn monitor_for_connector(&self, connector: &str) -> Option<MonitorGeometry> {
        let state = self.state.borrow();
        state
            .outputs
            .iter()
            .position(|o| o.connector == connector)
            .map(|index| MonitorGeometry {
                index: index as i32,
                connector: connector.to_string(),
                rect: state.outputs[index].geometry,
            })
    }

    /// Resolve the monitor a realized widget is currently shown on.
    pub fn monitor_for_widget(&self, widget: &impl IsA<gtk4::Widget>) -> Option<MonitorGeometry> {
        let native = widget.native()?;
        let surface = native.surface()?;
        let monitor = surface.display().monitor_at_surface(&surface)?;
        let connector = monitor.connector()?;
        self.monitor_for_connector(&connector)
    }

    /// Work area of the monitor at `index`.
    pub fn work_area(&self, index: i32) -> Option<Rect> {
        self.state
            .borrow()
            .outputs
            .get(usize::try_from(index).ok()?)
            .map(|o| o.work_area)
    }
}
