//! Three-region strip layout.
//!
//! The strip hosts three regions (left/center/right) in a fixed-height
//! horizontal band. The center region keeps its natural width and is
//! centered relative to the monitor's *visible work area* rather than the
//! raw monitor, so a dock reserved on one side does not push the clock off
//! center. The side regions are clamped both to the slack left over next to
//! the center and to their own natural widths, so an empty region never
//! swallows click-through space.
//!
//! Everything here is plain arithmetic over plain structs: the GTK glue in
//! `strip.rs` feeds in measured widths and writes the resulting boxes back
//! out. Recomputed from scratch on every pass; nothing is cached.

use crate::services::compositor::Rect;
use crate::services::screen::MonitorGeometry;

/// Horizontal text direction of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Natural (unconstrained) widths of the three regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionWidths {
    pub left: i32,
    pub center: i32,
    pub right: i32,
}

/// An allocated child box, in strip-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl ChildBox {
    fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the box.
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Height of the box.
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

/// The computed allocation for all three regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    pub left: ChildBox,
    pub center: ChildBox,
    pub right: ChildBox,
}

/// Signed width correction that re-centers the center region against the
/// monitor's work area instead of its full geometry.
///
/// A dock reserved on the left shrinks the work area and shifts its origin
/// right; the correction is positive in that case, pushing the center
/// region right by half the reserved width (and mirrored for the other
/// side).
pub fn center_offset(monitor: &MonitorGeometry, work_area: &Rect) -> i32 {
    2 * (work_area.x - monitor.rect.x) + work_area.width - monitor.rect.width
}

/// Allocate the three regions inside a `width` x `height` strip.
///
/// The center region always gets its natural width. Each side region gets
/// `min(floor(side), natural)` where `side` is the nominal per-side slack
/// `max(0, (width - center + offset) / 2)`. Under RTL the side regions
/// swap edges; the center keeps the same offset formula.
pub fn allocate_regions(
    width: i32,
    height: i32,
    natural: RegionWidths,
    direction: Direction,
    center_offset: i32,
) -> RegionLayout {
    let center_width = natural.center;

    let side = f64::max(0.0, f64::from(width - center_width + center_offset) / 2.0);
    let side_floor = side.floor() as i32;

    let left_width = side_floor.min(natural.left);
    let right_width = side_floor.min(natural.right);

    let left = match direction {
        Direction::Ltr => ChildBox::new(0, 0, left_width, height),
        Direction::Rtl => ChildBox::new((width - left_width).max(0), 0, width, height),
    };

    let center_x1 = side.ceil() as i32;
    let center = ChildBox::new(center_x1, 0, center_x1 + center_width, height);

    let right = match direction {
        Direction::Ltr => ChildBox::new((width - right_width).max(0), 0, width, height),
        Direction::Rtl => ChildBox::new(0, 0, right_width, height),
    };

    RegionLayout {
        left,
        center,
        right,
    }
}
