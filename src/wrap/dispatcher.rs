//! Event dispatcher / reconciliation loop
//!
//! Owns the display session, the geometry store and the barrier set, and
//! runs the loop that keeps them consistent: crossings go through the
//! mapper and become pointer relocations, geometry changes rebuild the
//! barrier set before the next crossing is looked at, and a shutdown signal
//! observed on the watch channel ends the loop cooperatively.
//!
//! Notifications are handled strictly in arrival order on a single task;
//! the store and barrier set need no locking.

use tokio::sync::watch;

use crate::geometry::{Axis, Point, ScreenGeometry};
use crate::session::{DisplaySession, Notification, SessionResult};

use super::{map_crossing, BarrierSet, GeometryStore};

pub struct Dispatcher<S: DisplaySession> {
    session: S,
    store: GeometryStore,
    axis: Axis,
    barriers: BarrierSet,
}

impl<S: DisplaySession> Dispatcher<S> {
    /// Build a dispatcher around a connected session. `geometry` is the
    /// startup extent (usually the session's own report, possibly
    /// overridden from configuration); the axis selection is fixed for the
    /// dispatcher's lifetime.
    pub fn new(session: S, geometry: ScreenGeometry, axis: Axis) -> Self {
        Self {
            session,
            store: GeometryStore::new(geometry),
            axis,
            barriers: BarrierSet::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Create the initial barrier set and process notifications until the
    /// shutdown channel fires or the session fails.
    ///
    /// The barrier set is torn down on every exit path, clean or not, so
    /// the display is never left with orphaned barriers by a falling-out
    /// error.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> SessionResult<()> {
        let result = self.run_inner(&mut shutdown).await;
        self.barriers.teardown(&mut self.session);
        let _ = self.session.flush();
        result
    }

    async fn run_inner(&mut self, shutdown: &mut watch::Receiver<bool>) -> SessionResult<()> {
        self.barriers
            .rebuild(&mut self.session, self.store.current(), self.axis)?;
        tracing::info!(
            geometry = ?self.store.current(),
            axis = ?self.axis,
            "cursor wrap active"
        );

        loop {
            tokio::select! {
                notification = self.session.next_notification() => {
                    match notification? {
                        Notification::Crossing { position } => self.handle_crossing(position)?,
                        Notification::GeometryChanged { width, height } => {
                            self.handle_geometry_change(width, height)?;
                        }
                        Notification::Unknown { tag } => {
                            tracing::debug!(tag, "ignoring unrecognized notification");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    fn handle_crossing(&mut self, position: Point) -> SessionResult<()> {
        match map_crossing(position, self.store.current(), self.axis) {
            Some(target) => {
                tracing::debug!(from = ?position, to = ?target, "wrapping pointer");
                // A failed relocation loses one wrap, not the process.
                if let Err(err) = self.session.relocate_pointer(target) {
                    tracing::warn!(%err, "pointer relocation failed");
                }
                self.session.flush()
            }
            None => {
                tracing::trace!(position = ?position, "crossing on inactive edge");
                Ok(())
            }
        }
    }

    fn handle_geometry_change(&mut self, width: u32, height: u32) -> SessionResult<()> {
        tracing::info!(width, height, "screen geometry changed, rebuilding barriers");
        self.store.set(width, height);
        self.barriers
            .rebuild(&mut self.session, self.store.current(), self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MockSession, SessionError};

    fn shutdown_pair() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    /// Run until the scripted queue is exhausted; the mock then reports a
    /// lost connection, which ends the loop with teardown applied.
    async fn run_script(mut session: MockSession, axis: Axis) -> (MockSession, SessionResult<()>) {
        let (_tx, rx) = shutdown_pair();
        let geometry = session.query_geometry();
        let mut dispatcher = Dispatcher::new(session, geometry, axis);
        let result = dispatcher.run(rx).await;
        session = dispatcher.session;
        (session, result)
    }

    #[tokio::test]
    async fn crossing_relocates_to_opposite_edge() {
        let mut session = MockSession::new(1920, 1080);
        session.push_notification(Notification::Crossing {
            position: Point::new(0, 540),
        });

        let (session, result) = run_script(session, Axis::Both).await;

        assert!(matches!(result, Err(SessionError::Connection(_))));
        assert_eq!(session.relocations, vec![Point::new(1919, 540)]);
        // All barriers were deleted on the way out.
        assert!(session.live_segments().is_empty());
    }

    #[tokio::test]
    async fn inactive_axis_crossing_is_ignored() {
        let mut session = MockSession::new(800, 600);
        session.push_notification(Notification::Crossing {
            position: Point::new(0, 300),
        });

        let (session, _) = run_script(session, Axis::YOnly).await;

        assert!(session.relocations.is_empty());
    }

    #[tokio::test]
    async fn geometry_change_applies_before_next_crossing() {
        let mut session = MockSession::new(1920, 1080);
        session.push_notification(Notification::GeometryChanged {
            width: 2560,
            height: 1440,
        });
        session.push_notification(Notification::Crossing {
            position: Point::new(0, 1079),
        });

        let (session, _) = run_script(session, Axis::Both).await;

        // Mapped against the new extent, not the old 1919.
        assert_eq!(session.relocations, vec![Point::new(2559, 1079)]);

        // The rebuilt barriers all reflected the new geometry.
        assert_eq!(session.created.len(), 8);
        for segment in &session.created[4..] {
            assert_ne!(segment.x2, 1920);
            assert_ne!(segment.y2, 1080);
        }
    }

    #[tokio::test]
    async fn unknown_notification_is_skipped() {
        let mut session = MockSession::new(1920, 1080);
        session.push_notification(Notification::Unknown { tag: 33 });
        session.push_notification(Notification::Crossing {
            position: Point::new(1919, 7),
        });

        let (session, _) = run_script(session, Axis::Both).await;

        assert_eq!(session.relocations, vec![Point::new(0, 7)]);
    }

    #[tokio::test]
    async fn relocation_failure_is_not_fatal() {
        let mut session = MockSession::new(1920, 1080);
        session.fail_relocate = true;
        session.push_notification(Notification::Crossing {
            position: Point::new(0, 10),
        });
        session.push_notification(Notification::Crossing {
            position: Point::new(0, 20),
        });

        let (session, result) = run_script(session, Axis::Both).await;

        // Both crossings were processed; the loop only ended when the
        // scripted queue ran dry.
        assert!(matches!(result, Err(SessionError::Connection(_))));
        assert!(session.relocations.is_empty());
        assert!(session.flushes >= 3);
    }

    #[tokio::test]
    async fn startup_creation_failure_is_fatal() {
        let mut session = MockSession::new(1920, 1080);
        session.fail_create_at = Some(0);

        let (session, result) = run_script(session, Axis::Both).await;

        assert!(matches!(result, Err(SessionError::BarrierCreation { .. })));
        assert!(session.live_segments().is_empty());
    }

    #[tokio::test]
    async fn shutdown_tears_down_and_returns_ok() {
        let mut session = MockSession::new(1920, 1080);
        session.hang_when_empty = true;

        let (tx, rx) = shutdown_pair();
        tx.send(true).unwrap();

        let geometry = session.query_geometry();
        let mut dispatcher = Dispatcher::new(session, geometry, Axis::Both);
        let result = dispatcher.run(rx).await;

        assert!(result.is_ok());
        let session = dispatcher.session;
        assert!(session.live_segments().is_empty());
        assert_eq!(session.deleted.len(), 4);
    }
}
