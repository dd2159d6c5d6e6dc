//! Sway-compatible compositor backend using the i3 IPC protocol.
//!
//! Works with compositors that speak Sway IPC ($SWAYSOCK or $I3SOCK):
//! Sway, Miracle WM, Scroll.
//!
//! Protocol: i3 IPC binary framing with JSON payloads. Queries open a
//! fresh connection per request; a dedicated thread holds a subscription
//! connection and invokes the event hook whenever workspace, window, or
//! output events arrive.
//!
//! Reference: https://man.archlinux.org/man/sway-ipc.7.en

use std::collections::HashMap;
use std::env;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use super::{
    CompositorBackend, EventHook, GrabRequest, OutputState, Rect, ScreenState, WindowId,
    WindowInfo, WindowKind,
};

// i3 IPC constants
const IPC_MAGIC: &[u8; 6] = b"i3-ipc";
const IPC_HEADER_SIZE: usize = 14; // 6 (magic) + 4 (length) + 4 (type)

// Message types (outgoing)
const IPC_RUN_COMMAND: u32 = 0;
const IPC_GET_WORKSPACES: u32 = 1;
const IPC_SUBSCRIBE: u32 = 2;
const IPC_GET_OUTPUTS: u32 = 3;
const IPC_GET_TREE: u32 = 4;

/// Reject IPC payloads larger than this to guard against bogus length fields.
const MAX_IPC_PAYLOAD: usize = 64 * 1024 * 1024;

const RECONNECT_INITIAL_MS: u64 = 1000;
const RECONNECT_MAX_MS: u64 = 30000;

/// A frame counts as vertically maximized when it covers at least 9/10 of
/// the work-area height; the slack absorbs borders and inter-window gaps.
fn is_vertically_maximized(frame_height: i32, area_height: i32) -> bool {
    area_height > 0 && frame_height * 10 >= area_height * 9
}

/// Map sway's xwayland `window_type` string onto the coarse kinds the
/// panel filters on. Wayland-native windows carry no type and land on
/// `Normal`.
fn window_kind_from_str(window_type: Option<&str>) -> WindowKind {
    match window_type {
        Some("desktop") => WindowKind::Desktop,
        Some("dock") => WindowKind::Dock,
        Some("dialog") => WindowKind::Dialog,
        _ => WindowKind::Normal,
    }
}

fn parse_rect(value: &Value) -> Rect {
    Rect {
        x: value.get("x").and_then(Value::as_i64).unwrap_or(0) as i32,
        y: value.get("y").and_then(Value::as_i64).unwrap_or(0) as i32,
        width: value.get("width").and_then(Value::as_i64).unwrap_or(0) as i32,
        height: value.get("height").and_then(Value::as_i64).unwrap_or(0) as i32,
    }
}

/// Extract `output name -> visible workspace rect` from GET_WORKSPACES.
///
/// Sway reports workspace rects with reserved edges (panels, docks)
/// already subtracted, so the visible workspace's rect *is* the output's
/// work area.
fn parse_work_areas(workspaces: &Value) -> HashMap<String, Rect> {
    let mut areas = HashMap::new();
    let Some(list) = workspaces.as_array() else {
        return areas;
    };
    for ws in list {
        let visible = ws.get("visible").and_then(Value::as_bool).unwrap_or(false);
        if !visible {
            continue;
        }
        let Some(output) = ws.get("output").and_then(Value::as_str) else {
            continue;
        };
        let Some(rect) = ws.get("rect") else {
            continue;
        };
        areas.insert(output.to_string(), parse_rect(rect));
    }
    areas
}

/// Names of the currently visible workspaces.
fn parse_visible_workspace_names(workspaces: &Value) -> Vec<String> {
    workspaces
        .as_array()
        .map(|list| {
            list.iter()
                .filter(|ws| ws.get("visible").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|ws| ws.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Combine GET_OUTPUTS with the work areas into the screen snapshot.
/// Output order is preserved; it defines the monitor indices used across
/// the bar.
fn parse_outputs(outputs: &Value, work_areas: &HashMap<String, Rect>) -> ScreenState {
    let mut state = ScreenState::default();
    let Some(list) = outputs.as_array() else {
        return state;
    };
    for output in list {
        let active = output.get("active").and_then(Value::as_bool).unwrap_or(false);
        if !active {
            continue;
        }
        let Some(name) = output.get("name").and_then(Value::as_str) else {
            continue;
        };
        let Some(rect) = output.get("rect") else {
            continue;
        };
        let geometry = parse_rect(rect);
        let work_area = work_areas.get(name).copied().unwrap_or(geometry);
        state.outputs.push(OutputState {
            connector: name.to_string(),
            geometry,
            work_area,
        });
    }
    state
}

/// Walk a workspace subtree in focus-recency order, collecting leaf
/// windows. Ranks are handed out in discovery order, so the most recently
/// focused window of the workspace comes out with the lowest rank.
fn collect_workspace_windows(
    ws_node: &Value,
    monitor_index: i32,
    work_area_height: i32,
    next_rank: &mut u32,
    out: &mut Vec<WindowInfo>,
) {
    fn children_in_focus_order(node: &Value) -> Vec<&Value> {
        let mut children: Vec<&Value> = Vec::new();
        for key in ["nodes", "floating_nodes"] {
            if let Some(list) = node.get(key).and_then(Value::as_array) {
                children.extend(list.iter());
            }
        }

        let focus: Vec<i64> = node
            .get("focus")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();

        let id_of = |child: &Value| child.get("id").and_then(Value::as_i64).unwrap_or(-1);

        let mut ordered: Vec<&Value> = Vec::with_capacity(children.len());
        for id in &focus {
            if let Some(pos) = children.iter().position(|c| id_of(c) == *id) {
                ordered.push(children.remove(pos));
            }
        }
        ordered.extend(children);
        ordered
    }

    fn is_leaf_window(node: &Value) -> bool {
        let empty = |key: &str| {
            node.get(key)
                .and_then(Value::as_array)
                .is_none_or(|list| list.is_empty())
        };
        empty("nodes") && empty("floating_nodes") && node.get("pid").is_some()
    }

    for child in children_in_focus_order(ws_node) {
        if is_leaf_window(child) {
            let Some(id) = child.get("id").and_then(Value::as_i64) else {
                continue;
            };
            let rect = child.get("rect").map(parse_rect).unwrap_or_default();
            let kind = window_kind_from_str(child.get("window_type").and_then(Value::as_str));
            out.push(WindowInfo {
                id,
                frame_rect: rect,
                monitor_index,
                showing: true,
                kind,
                vertically_maximized: is_vertically_maximized(rect.height, work_area_height),
                stacking_rank: *next_rank,
            });
            *next_rank += 1;
        } else {
            collect_workspace_windows(child, monitor_index, work_area_height, next_rank, out);
        }
    }
}

/// Collect the windows on every visible workspace from a GET_TREE reply.
fn collect_visible_windows(
    tree: &Value,
    visible_workspaces: &[String],
    output_indices: &HashMap<String, i32>,
    work_areas: &HashMap<String, Rect>,
) -> Vec<WindowInfo> {
    let mut windows = Vec::new();
    let mut next_rank = 0u32;

    let Some(outputs) = tree.get("nodes").and_then(Value::as_array) else {
        return windows;
    };
    for output in outputs {
        let name = output.get("name").and_then(Value::as_str).unwrap_or("");
        // __i3 holds the scratchpad, not a real output.
        if name == "__i3" {
            continue;
        }
        let Some(&monitor_index) = output_indices.get(name) else {
            continue;
        };
        let work_area_height = work_areas.get(name).map_or(0, |r| r.height);

        let Some(ws_nodes) = output.get("nodes").and_then(Value::as_array) else {
            continue;
        };
        for ws_node in ws_nodes {
            let ws_name = ws_node.get("name").and_then(Value::as_str).unwrap_or("");
            if !visible_workspaces.iter().any(|v| v == ws_name) {
                continue;
            }
            collect_workspace_windows(
                ws_node,
                monitor_index,
                work_area_height,
                &mut next_rank,
                &mut windows,
            );
        }
    }
    windows
}

fn ipc_send(stream: &mut UnixStream, msg_type: u32, payload: &[u8]) -> std::io::Result<()> {
    let mut header = [0u8; IPC_HEADER_SIZE];
    header[..6].copy_from_slice(IPC_MAGIC);
    header[6..10].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    header[10..14].copy_from_slice(&msg_type.to_le_bytes());
    stream.write_all(&header)?;
    if !payload.is_empty() {
        stream.write_all(payload)?;
    }
    Ok(())
}

/// Read one i3 IPC message: (message type, payload bytes).
fn ipc_recv(stream: &mut UnixStream) -> std::io::Result<(u32, Vec<u8>)> {
    let mut header = [0u8; IPC_HEADER_SIZE];
    stream.read_exact(&mut header)?;

    if &header[..6] != IPC_MAGIC {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "invalid i3-ipc magic",
        ));
    }

    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let msg_type = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);

    if len > MAX_IPC_PAYLOAD {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("IPC payload too large: {len} bytes"),
        ));
    }

    let mut payload = vec![0u8; len];
    if len > 0 {
        stream.read_exact(&mut payload)?;
    }

    Ok((msg_type, payload))
}

/// One-shot request on a fresh connection.
fn ipc_request(socket_path: &str, msg_type: u32, payload: &[u8]) -> Option<Value> {
    let mut stream = match UnixStream::connect(socket_path) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to connect to sway socket: {e}");
            return None;
        }
    };

    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    if let Err(e) = ipc_send(&mut stream, msg_type, payload) {
        error!("failed to send IPC message: {e}");
        return None;
    }

    match ipc_recv(&mut stream) {
        Ok((_, data)) => match serde_json::from_slice(&data) {
            Ok(v) => Some(v),
            Err(e) => {
                trace!("failed to parse IPC JSON: {e}");
                None
            }
        },
        Err(e) => {
            error!("failed to read IPC response: {e}");
            None
        }
    }
}

pub struct SwayBackend {
    socket_path: Option<String>,
    hook: Arc<Mutex<Option<EventHook>>>,
    running: Arc<AtomicBool>,
}

impl SwayBackend {
    pub fn new() -> Self {
        let socket_path = env::var("SWAYSOCK").or_else(|_| env::var("I3SOCK")).ok();
        if socket_path.is_none() {
            warn!("neither SWAYSOCK nor I3SOCK is set; sway backend will be inert");
        }

        let backend = Self {
            socket_path,
            hook: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(true)),
        };
        backend.spawn_event_thread();
        backend
    }

    /// Subscription thread: hold a connection with workspace/window/output
    /// events subscribed and poke the hook on every event. Reconnects with
    /// exponential backoff when the compositor restarts.
    fn spawn_event_thread(&self) {
        let Some(socket_path) = self.socket_path.clone() else {
            return;
        };
        let hook = Arc::clone(&self.hook);
        let running = Arc::clone(&self.running);

        thread::spawn(move || {
            let mut backoff = RECONNECT_INITIAL_MS;
            while running.load(Ordering::Relaxed) {
                match Self::run_event_loop(&socket_path, &hook, &running) {
                    Ok(()) => break,
                    Err(e) => {
                        debug!("sway event connection lost: {e}; retrying in {backoff}ms");
                        thread::sleep(Duration::from_millis(backoff));
                        backoff = (backoff * 2).min(RECONNECT_MAX_MS);
                    }
                }
            }
        });
    }

    fn run_event_loop(
        socket_path: &str,
        hook: &Mutex<Option<EventHook>>,
        running: &AtomicBool,
    ) -> std::io::Result<()> {
        let mut stream = UnixStream::connect(socket_path)?;
        ipc_send(
            &mut stream,
            IPC_SUBSCRIBE,
            br#"["workspace","window","output"]"#,
        )?;
        // Subscription ack
        let _ = ipc_recv(&mut stream)?;
        debug!("sway event subscription established");

        // Initial state may have been missed while (re)connecting.
        if let Some(hook) = hook.lock().as_ref() {
            hook();
        }

        while running.load(Ordering::Relaxed) {
            let (_event_type, _payload) = ipc_recv(&mut stream)?;
            if let Some(hook) = hook.lock().as_ref() {
                hook();
            }
        }
        Ok(())
    }

    /// Run a sway command and report whether every part succeeded.
    fn run_command(&self, command: &str) -> bool {
        let Some(socket_path) = self.socket_path.as_deref() else {
            return false;
        };
        let Some(reply) = ipc_request(socket_path, IPC_RUN_COMMAND, command.as_bytes()) else {
            return false;
        };
        let ok = reply
            .as_array()
            .is_some_and(|results| {
                !results.is_empty()
                    && results.iter().all(|r| {
                        r.get("success").and_then(Value::as_bool).unwrap_or(false)
                    })
            });
        if !ok {
            warn!("sway command failed: {command}: {reply}");
        }
        ok
    }
}

impl Default for SwayBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SwayBackend {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

impl CompositorBackend for SwayBackend {
    fn name(&self) -> &'static str {
        "sway"
    }

    fn screen_state(&self) -> ScreenState {
        let Some(socket_path) = self.socket_path.as_deref() else {
            return ScreenState::default();
        };
        let Some(workspaces) = ipc_request(socket_path, IPC_GET_WORKSPACES, b"") else {
            return ScreenState::default();
        };
        let Some(outputs) = ipc_request(socket_path, IPC_GET_OUTPUTS, b"") else {
            return ScreenState::default();
        };
        parse_outputs(&outputs, &parse_work_areas(&workspaces))
    }

    fn visible_windows(&self) -> Vec<WindowInfo> {
        let Some(socket_path) = self.socket_path.as_deref() else {
            return Vec::new();
        };
        let Some(workspaces) = ipc_request(socket_path, IPC_GET_WORKSPACES, b"") else {
            return Vec::new();
        };
        let Some(outputs) = ipc_request(socket_path, IPC_GET_OUTPUTS, b"") else {
            return Vec::new();
        };
        let Some(tree) = ipc_request(socket_path, IPC_GET_TREE, b"") else {
            return Vec::new();
        };

        let visible = parse_visible_workspace_names(&workspaces);
        let work_areas = parse_work_areas(&workspaces);
        let screen = parse_outputs(&outputs, &work_areas);
        let output_indices: HashMap<String, i32> = screen
            .outputs
            .iter()
            .enumerate()
            .map(|(i, o)| (o.connector.clone(), i as i32))
            .collect();

        collect_visible_windows(&tree, &visible, &output_indices, &work_areas)
    }

    fn begin_move_grab(&self, window: WindowId, grab: &GrabRequest) -> bool {
        // Sway exposes no external interactive-grab request; focusing the
        // window and snapping it to the pointer is the closest the IPC
        // offers, and further motion continues through the compositor's
        // own drag modifier.
        debug!(
            "move grab for con {window} (device: {:?}, time: {})",
            grab.device, grab.time_ms
        );
        self.run_command(&format!("[con_id={window}] focus, move position pointer"))
    }

    fn focus_window(&self, window: WindowId) -> bool {
        self.run_command(&format!("[con_id={window}] focus"))
    }

    fn set_event_hook(&self, hook: EventHook) {
        *self.hook.lock() = Some(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_window_kind_from_str() {
        assert_eq!(window_kind_from_str(Some("desktop")), WindowKind::Desktop);
        assert_eq!(window_kind_from_str(Some("dock")), WindowKind::Dock);
        assert_eq!(window_kind_from_str(Some("dialog")), WindowKind::Dialog);
        assert_eq!(window_kind_from_str(Some("normal")), WindowKind::Normal);
        assert_eq!(window_kind_from_str(Some("splash")), WindowKind::Normal);
        assert_eq!(window_kind_from_str(None), WindowKind::Normal);
    }

    #[test]
    fn test_is_vertically_maximized() {
        assert!(is_vertically_maximized(1048, 1048));
        // Gaps and borders keep tiled frames slightly short of the full
        // work-area height.
        assert!(is_vertically_maximized(1000, 1048));
        assert!(!is_vertically_maximized(500, 1048));
        assert!(!is_vertically_maximized(100, 0));
    }

    #[test]
    fn test_parse_work_areas_uses_visible_workspace_rects() {
        let workspaces = json!([
            {"name": "1", "visible": true, "output": "DP-1",
             "rect": {"x": 0, "y": 32, "width": 1920, "height": 1048}},
            {"name": "2", "visible": false, "output": "DP-1",
             "rect": {"x": 0, "y": 0, "width": 1920, "height": 1080}},
            {"name": "3", "visible": true, "output": "HDMI-A-1",
             "rect": {"x": 1920, "y": 0, "width": 1280, "height": 1024}},
        ]);
        let areas = parse_work_areas(&workspaces);
        assert_eq!(
            areas.get("DP-1"),
            Some(&Rect {
                x: 0,
                y: 32,
                width: 1920,
                height: 1048
            })
        );
        assert_eq!(areas.get("HDMI-A-1").map(|r| r.width), Some(1280));
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn test_parse_outputs_keeps_order_and_skips_inactive() {
        let outputs = json!([
            {"name": "eDP-1", "active": true,
             "rect": {"x": 0, "y": 0, "width": 1920, "height": 1080}},
            {"name": "DP-2", "active": false,
             "rect": {"x": 0, "y": 0, "width": 0, "height": 0}},
            {"name": "HDMI-A-1", "active": true,
             "rect": {"x": 1920, "y": 0, "width": 1280, "height": 1024}},
        ]);
        let mut areas = HashMap::new();
        areas.insert(
            "eDP-1".to_string(),
            Rect {
                x: 40,
                y: 0,
                width: 1880,
                height: 1080,
            },
        );

        let state = parse_outputs(&outputs, &areas);
        assert_eq!(state.outputs.len(), 2);
        assert_eq!(state.outputs[0].connector, "eDP-1");
        assert_eq!(state.outputs[0].work_area.x, 40);
        // No visible workspace reported: work area falls back to geometry.
        assert_eq!(state.outputs[1].connector, "HDMI-A-1");
        assert_eq!(state.outputs[1].work_area, state.outputs[1].geometry);
    }

    #[test]
    fn test_collect_windows_focus_order_and_filtering() {
        // Workspace "1" on DP-1: container focus order says window 11 was
        // focused more recently than 10.
        let tree = json!({
            "nodes": [
                {"name": "__i3", "nodes": []},
                {"name": "DP-1", "nodes": [
                    {"name": "1", "id": 5, "focus": [11, 10],
                     "nodes": [
                        {"id": 10, "pid": 100, "nodes": [], "floating_nodes": [],
                         "rect": {"x": 0, "y": 32, "width": 960, "height": 1048}},
                        {"id": 11, "pid": 101, "nodes": [], "floating_nodes": [],
                         "rect": {"x": 960, "y": 32, "width": 960, "height": 1048}},
                     ],
                     "floating_nodes": []},
                    {"name": "2", "id": 6, "nodes": [
                        {"id": 12, "pid": 102, "nodes": [], "floating_nodes": [],
                         "rect": {"x": 0, "y": 32, "width": 1920, "height": 1048}},
                    ], "floating_nodes": []},
                ]},
            ],
        });
        let visible = vec!["1".to_string()];
        let mut indices = HashMap::new();
        indices.insert("DP-1".to_string(), 0);
        let mut areas = HashMap::new();
        areas.insert(
            "DP-1".to_string(),
            Rect {
                x: 0,
                y: 32,
                width: 1920,
                height: 1048,
            },
        );

        let windows = collect_visible_windows(&tree, &visible, &indices, &areas);
        // Workspace "2" is not visible; only workspace "1" contributes.
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].id, 11);
        assert_eq!(windows[0].stacking_rank, 0);
        assert_eq!(windows[1].id, 10);
        assert_eq!(windows[1].stacking_rank, 1);
        assert!(windows.iter().all(|w| w.vertically_maximized));
        assert!(windows.iter().all(|w| w.monitor_index == 0));
    }

    #[test]
    fn test_collect_windows_descends_nested_containers() {
        let tree = json!({
            "nodes": [
                {"name": "DP-1", "nodes": [
                    {"name": "1", "id": 5, "nodes": [
                        {"id": 20, "focus": [22, 21], "nodes": [
                            {"id": 21, "pid": 1, "nodes": [], "floating_nodes": [],
                             "rect": {"x": 0, "y": 0, "width": 960, "height": 500}},
                            {"id": 22, "pid": 2, "nodes": [], "floating_nodes": [],
                             "rect": {"x": 0, "y": 500, "width": 960, "height": 500}},
                        ], "floating_nodes": []},
                    ], "floating_nodes": []},
                ]},
            ],
        });
        let visible = vec!["1".to_string()];
        let mut indices = HashMap::new();
        indices.insert("DP-1".to_string(), 0);

        let windows = collect_visible_windows(&tree, &visible, &indices, &HashMap::new());
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].id, 22);
        assert_eq!(windows[1].id, 21);
        // No work area known for the output: nothing can count as
        // vertically maximized.
        assert!(windows.iter().all(|w| !w.vertically_maximized));
    }
}
