//! Compositor backend abstraction.
//!
//! The panel needs four things from the session it runs in: output
//! geometries, per-output work areas (what is left after docks and other
//! panels reserve their edges), the windows currently on screen with their
//! frame rects and stacking order, and two commands (start moving a window,
//! focus a window). This module defines that boundary; concrete backends
//! live next to it:
//!
//! - `sway`: Sway/i3 IPC protocol (also spoken by Miracle WM and Scroll)
//! - `NullBackend`: no compositor reachable; every query degrades gracefully
//!
//! Backends may run their own reader threads. State crosses back to the
//! GTK side only through the event hook, which must be safe to invoke from
//! any thread.

pub mod factory;
pub mod sway;

/// Rectangle in global (layout) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One output together with its work area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputState {
    /// Connector name ("DP-1", "eDP-1", ...).
    pub connector: String,
    /// Full output geometry.
    pub geometry: Rect,
    /// Usable area after reserved edges are subtracted.
    pub work_area: Rect,
}

/// Snapshot of every active output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    /// Outputs in backend order; an output's position here is its
    /// monitor index for the rest of the bar.
    pub outputs: Vec<OutputState>,
}

/// Compositor-side window identifier.
pub type WindowId = i64;

/// Coarse window classification, for filtering drag targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Normal,
    Dialog,
    Desktop,
    Dock,
}

/// A window visible on some workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    /// Frame rect in global coordinates.
    pub frame_rect: Rect,
    /// Index of the output the window is on (backend output order).
    pub monitor_index: i32,
    /// Whether the window is actually showing on its workspace.
    pub showing: bool,
    pub kind: WindowKind,
    /// Whether the frame spans the work area's full height.
    pub vertically_maximized: bool,
    /// Stacking rank, 0 = topmost.
    pub stacking_rank: u32,
}

/// Input-event details forwarded with a move-grab request.
///
/// The toolkit-side sequence claim happens in the strip (GTK claims the
/// event sequence when the grab is accepted); what crosses the IPC
/// boundary is the seat/device identity and the event timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrabRequest {
    /// Device name as reported by the toolkit.
    pub device: Option<String>,
    /// Event timestamp in milliseconds.
    pub time_ms: u32,
}

/// Hook invoked whenever outputs, work areas, or windows may have changed.
pub type EventHook = Box<dyn Fn() + Send + Sync>;

/// The backend boundary the rest of the bar talks to.
pub trait CompositorBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Current outputs with their work areas.
    fn screen_state(&self) -> ScreenState;

    /// Windows on the currently visible workspaces, unsorted.
    fn visible_windows(&self) -> Vec<WindowInfo>;

    /// Ask the compositor to start moving `window` under the pointer.
    /// Returns whether the compositor accepted the request.
    fn begin_move_grab(&self, window: WindowId, grab: &GrabRequest) -> bool;

    /// Focus `window`. Returns whether the compositor accepted.
    fn focus_window(&self, window: WindowId) -> bool;

    /// Install the change hook. Replaces any previous hook.
    fn set_event_hook(&self, hook: EventHook);
}

/// Backend used when no compositor IPC is reachable: no outputs, no
/// windows, no commands. The strip still lays out (with a zero work-area
/// correction) and drags simply never find a target.
#[derive(Debug, Default)]
pub struct NullBackend;

impl CompositorBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn screen_state(&self) -> ScreenState {
        ScreenState::default()
    }

    fn visible_windows(&self) -> Vec<WindowInfo> {
        Vec::new()
    }

    fn begin_move_grab(&self, _window: WindowId, _grab: &GrabRequest) -> bool {
        false
    }

    fn focus_window(&self, _window: WindowId) -> bool {
        false
    }

    fn set_event_hook(&self, _hook: EventHook) {}
}
