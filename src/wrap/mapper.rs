//! Coordinate mapper
//!
//! Pure function from a barrier crossing to the destination on the opposite
//! edge. The four edge conditions are tested in a fixed priority order —
//! `x == 0`, `y == 0`, `x == far_x`, `y == far_y` — and only the first
//! matching branch fires, which is what resolves exact corner crossings
//! (the horizontal wrap wins at a corner when both axes are active).
//!
//! The coordinate orthogonal to the crossed edge is always preserved
//! verbatim, so wrapping off the right edge at height y lands at `(0, y)`.

use crate::geometry::{Axis, Point, ScreenGeometry};

/// Map a crossing position to its wrap destination.
///
/// Returns `None` when the position is not on an edge whose axis is
/// active; no relocation happens then.
pub fn map_crossing(position: Point, geometry: ScreenGeometry, axis: Axis) -> Option<Point> {
    let far_x = geometry.far_x();
    let far_y = geometry.far_y();

    if axis.horizontal() && position.x == 0 {
        Some(Point::new(far_x, position.y))
    } else if axis.vertical() && position.y == 0 {
        Some(Point::new(position.x, far_y))
    } else if axis.horizontal() && position.x == far_x {
        Some(Point::new(0, position.y))
    } else if axis.vertical() && position.y == far_y {
        Some(Point::new(position.x, 0))
    } else {
        None
    }
}
