//! Barrier set manager
//!
//! Owns the handles of the edge barriers registered with the display
//! session and keeps the live set exactly equal to what the current
//! geometry and axis selection imply: rebuild deletes whatever exists and
//! recreates from scratch, so there is never a stale barrier referencing an
//! old extent and never a missing one for an enabled axis.

use crate::geometry::{Axis, Edge, ScreenGeometry};
use crate::session::{BarrierHandle, DisplaySession, SessionResult};

/// Holds at most one barrier handle per edge, indexed by [`Edge`].
#[derive(Debug, Default)]
pub struct BarrierSet {
    handles: [Option<BarrierHandle>; 4],
}

impl BarrierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete all current barriers (if any), then create the set implied by
    /// `axis` at the edges implied by `geometry`.
    ///
    /// Safe to call both at startup (nothing to delete) and on a geometry
    /// change. Creation order is deterministic: left, right, top, bottom.
    ///
    /// A creation failure is fatal for the caller; before propagating it,
    /// the barriers created earlier in the same call are deleted so no
    /// partial set is left registered.
    pub fn rebuild<S: DisplaySession + ?Sized>(
        &mut self,
        session: &mut S,
        geometry: ScreenGeometry,
        axis: Axis,
    ) -> SessionResult<()> {
        self.teardown(session);

        for edge in Edge::ALL {
            if !edge.enabled_under(axis) {
                continue;
            }
            let segment = edge.segment(geometry);
            tracing::debug!(
                ?edge,
                x1 = segment.x1,
                y1 = segment.y1,
                x2 = segment.x2,
                y2 = segment.y2,
                "creating barrier"
            );
            match session.create_barrier(segment) {
                Ok(handle) => self.handles[edge as usize] = Some(handle),
                Err(err) => {
                    self.teardown(session);
                    return Err(err);
                }
            }
        }

        session.flush()
    }

    /// Delete all barriers. Idempotent: callable before any rebuild has run
    /// and again after a previous teardown. Individual deletion failures
    /// are logged, never propagated.
    pub fn teardown<S: DisplaySession + ?Sized>(&mut self, session: &mut S) {
        for slot in &mut self.handles {
            if let Some(handle) = slot.take() {
                if let Err(err) = session.delete_barrier(handle) {
                    tracing::warn!(%err, "failed to delete barrier");
                }
            }
        }
    }

    /// Edges that currently have a live barrier.
    pub fn active_edges(&self) -> Vec<Edge> {
        Edge::ALL
            .into_iter()
            .filter(|edge| self.handles[*edge as usize].is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.iter().all(Option::is_none)
    }
}
