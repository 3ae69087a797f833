//! Geometry store
//!
//! Holds the most recently observed screen extent. Last write wins; there
//! is no history and no locking (the reconciliation loop is single
//! threaded).

use crate::geometry::ScreenGeometry;

#[derive(Debug)]
pub struct GeometryStore {
    current: ScreenGeometry,
}

impl GeometryStore {
    pub fn new(initial: ScreenGeometry) -> Self {
        Self { current: initial }
    }

    /// Replace the stored geometry unconditionally.
    pub fn set(&mut self, width: u32, height: u32) {
        self.current = ScreenGeometry::new(width, height);
        tracing::debug!(width, height, "geometry updated");
    }

    pub fn current(&self) -> ScreenGeometry {
        self.current
    }
}
