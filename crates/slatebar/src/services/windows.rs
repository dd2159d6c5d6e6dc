//! WindowService - window queries and commands.
//!
//! Thin main-thread facade over the compositor backend: the strip asks it
//! for the stacking-ordered window list when a drag gesture lands on empty
//! panel space, and for the focus/move commands those gestures resolve to.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::compositor::{CompositorBackend, GrabRequest, WindowId, WindowInfo};

pub struct WindowService {
    backend: RefCell<Option<Arc<dyn CompositorBackend>>>,
}

thread_local! {
    static WINDOW_SERVICE: Rc<WindowService> = Rc::new(WindowService {
        backend: RefCell::new(None),
    });
}

/// Order `windows` topmost first.
pub fn sort_by_stacking(windows: &mut [WindowInfo]) {
    windows.sort_by_key(|w| w.stacking_rank);
}

impl WindowService {
    /// The shared instance. Main thread only.
    pub fn global() -> Rc<WindowService> {
        WINDOW_SERVICE.with(Rc::clone)
    }

    pub fn init(&self, backend: Arc<dyn CompositorBackend>) {
        *self.backend.borrow_mut() = Some(backend);
    }

    /// Windows on the visible workspaces, topmost first.
    pub fn windows_by_stacking(&self) -> Vec<WindowInfo> {
        let Some(backend) = self.backend.borrow().clone() else {
            return Vec::new();
        };
        let mut windows = backend.visible_windows();
        sort_by_stacking(&mut windows);
        windows
    }

    /// Start an interactive move of `window`. Returns whether the
    /// compositor accepted the grab.
    pub fn begin_move_grab(&self, window: WindowId, grab: &GrabRequest) -> bool {
        let Some(backend) = self.backend.borrow().clone() else {
            return false;
        };
        backend.begin_move_grab(window, grab)
    }

    /// Hand keyboard focus back to the default window: the topmost window
    /// in stacking order.
    pub fn focus_default_window(&self, time_ms: u32) -> bool {
        let Some(backend) = self.backend.borrow().clone() else {
            return false;
        };
        let Some(top) = self.windows_by_stacking().into_iter().next() else {
            debug!("no window to focus (time {time_ms})");
            return false;
        };
        backend.focus_window(top.id)
    }
}
