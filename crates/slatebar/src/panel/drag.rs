//! Window picking for drag-to-move.
//!
//! Pressing on empty strip space should grab the window the user sees
//! directly under the bar: the topmost vertically-maximized window on the
//! same monitor whose frame spans the press position. Desktop-type windows
//! never qualify. The predicate is plain data in, plain data out; the
//! gesture handling lives in `strip.rs`.

use crate::services::compositor::{WindowInfo, WindowKind};

/// Find the window a press at global `stage_x` should start moving.
///
/// `windows` must be ordered topmost first (see
/// `WindowService::windows_by_stacking`); the first match wins. The press
/// position must fall strictly inside the frame's horizontal span.
pub fn draggable_window_at(
    windows: &[WindowInfo],
    monitor_index: i32,
    stage_x: i32,
) -> Option<&WindowInfo> {
    windows.iter().find(|win| {
        let rect = win.frame_rect;
        win.monitor_index == monitor_index
            && win.showing
            && win.kind != WindowKind::Desktop
            && win.vertically_maximized
            && stage_x > rect.x
            && stage_x < rect.x + rect.width
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::compositor::Rect;

    fn win(id: i64, x: i32, width: i32, rank: u32) -> WindowInfo {
        WindowInfo {
            id,
            frame_rect: Rect {
                x,
                y: 0,
                width,
                height: 1048,
            },
            monitor_index: 0,
            showing: true,
            kind: WindowKind::Normal,
            vertically_maximized: true,
            stacking_rank: rank,
        }
    }

    #[test]
    fn test_picks_topmost_overlapping_window() {
        // Both windows span x=500; the list is topmost-first, so the
        // first entry wins.
        let windows = vec![win(1, 0, 1000, 0), win(2, 400, 600, 1)];
        let hit = draggable_window_at(&windows, 0, 500).unwrap();
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn test_skips_windows_outside_span() {
        let windows = vec![win(1, 0, 400, 0), win(2, 400, 600, 1)];
        let hit = draggable_window_at(&windows, 0, 700).unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn test_span_bounds_are_exclusive() {
        let windows = vec![win(1, 100, 300, 0)];
        assert!(draggable_window_at(&windows, 0, 100).is_none());
        assert!(draggable_window_at(&windows, 0, 400).is_none());
        assert!(draggable_window_at(&windows, 0, 101).is_some());
        assert!(draggable_window_at(&windows, 0, 399).is_some());
    }

    #[test]
    fn test_other_monitor_is_ignored() {
        let mut other = win(1, 0, 1000, 0);
        other.monitor_index = 1;
        assert!(draggable_window_at(&[other], 0, 500).is_none());
    }

    #[test]
    fn test_requires_vertical_maximization() {
        let mut floating = win(1, 0, 1000, 0);
        floating.vertically_maximized = false;
        let windows = vec![floating, win(2, 0, 1000, 1)];
        let hit = draggable_window_at(&windows, 0, 500).unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn test_desktop_windows_excluded() {
        let mut desktop = win(1, 0, 1000, 0);
        desktop.kind = WindowKind::Desktop;
        let windows = vec![desktop, win(2, 0, 1000, 1)];
        let hit = draggable_window_at(&windows, 0, 500).unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn test_hidden_windows_excluded() {
        let mut hidden = win(1, 0, 1000, 0);
        hidden.showing = false;
        assert!(draggable_window_at(&[hidden], 0, 500).is_none());
    }

    #[test]
    fn test_empty_list() {
        assert!(draggable_window_at(&[], 0, 500).is_none());
    }
}
