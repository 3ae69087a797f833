//! Shared geometry types
//!
//! Defines the vocabulary every other module speaks:
//! - Screen extent and pixel positions
//! - Wrap axis selection
//! - Screen edges and the barrier segments that sit on them

use serde::{Deserialize, Serialize};

/// A pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The logical extent of the wrap region, in pixels.
///
/// The far edge coordinates are pixel-indexed with an inclusive upper bound:
/// the rightmost column is `width - 1` and the bottom row is `height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// X coordinate of the rightmost pixel column.
    pub fn far_x(&self) -> i32 {
        self.width as i32 - 1
    }

    /// Y coordinate of the bottom pixel row.
    pub fn far_y(&self) -> i32 {
        self.height as i32 - 1
    }
}

/// Which axes wrap-around is enabled on.
///
/// Fixed at startup from the CLI/config and immutable for the process
/// lifetime.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    /// No wrapping; no barriers are created.
    None,
    /// Wrap on the left and right edges only.
    XOnly,
    /// Wrap on the top and bottom edges only.
    YOnly,
    /// Wrap on all four edges.
    #[default]
    Both,
}

impl Axis {
    /// Whether left/right wrapping is active.
    pub fn horizontal(self) -> bool {
        matches!(self, Axis::XOnly | Axis::Both)
    }

    /// Whether top/bottom wrapping is active.
    pub fn vertical(self) -> bool {
        matches!(self, Axis::YOnly | Axis::Both)
    }
}

/// Screen edge identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl Edge {
    /// All edges in barrier creation order.
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Whether a barrier on this edge exists under the given axis selection.
    pub fn enabled_under(self, axis: Axis) -> bool {
        match self {
            Edge::Left | Edge::Right => axis.horizontal(),
            Edge::Top | Edge::Bottom => axis.vertical(),
        }
    }

    /// The barrier segment for this edge at the given geometry.
    ///
    /// Segments are expressed as line endpoints in barrier coordinates,
    /// which run from 0 to `width`/`height` exclusive of no pixel: the
    /// right-edge line sits at `x = width`, between the last on-screen
    /// column and everything beyond it.
    pub fn segment(self, geometry: ScreenGeometry) -> EdgeSegment {
        let w = geometry.width as i32;
        let h = geometry.height as i32;
        let (x1, y1, x2, y2) = match self {
            Edge::Left => (0, 0, 0, h),
            Edge::Right => (w, 0, w, h),
            Edge::Top => (0, 0, w, 0),
            Edge::Bottom => (0, h, w, h),
        };
        EdgeSegment {
            edge: self,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// The line a single barrier occupies, spanning the full length of its edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSegment {
    pub edge: Edge,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}
