//! Scripted display session for unit testing.
//!
//! The real session talks to an X server, which tests cannot assume exists.
//! `MockSession` replaces it with in-memory recording: barrier creations,
//! deletions, relocations and flushes are all pushed into vectors that test
//! assertions can inspect, and `next_notification` pops from a queue the
//! test scripted up front.
//!
//! Failure injection:
//! - `fail_create_at`: the Nth `create_barrier` call (0-based, counted
//!   across the session's lifetime) returns an error.
//! - `fail_relocate`: every `relocate_pointer` call returns an error.
//!
//! When the scripted queue runs dry, `next_notification` reports a lost
//! connection, which ends a dispatcher run deterministically. Set
//! `hang_when_empty` to park forever instead, for shutdown-path tests.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;

use crate::geometry::{EdgeSegment, Point, ScreenGeometry};

use super::{BarrierHandle, DisplaySession, Notification, SessionError, SessionResult};

pub struct MockSession {
    geometry: ScreenGeometry,
    notifications: VecDeque<Notification>,
    live: BTreeMap<u64, EdgeSegment>,
    next_handle: u64,
    create_calls: usize,

    /// Every segment ever passed to `create_barrier`, in call order.
    pub created: Vec<EdgeSegment>,
    /// Every handle ever passed to `delete_barrier`, in call order.
    pub deleted: Vec<BarrierHandle>,
    /// Every target passed to `relocate_pointer`.
    pub relocations: Vec<Point>,
    /// Number of `flush` calls.
    pub flushes: usize,

    pub fail_create_at: Option<usize>,
    pub fail_relocate: bool,
    pub hang_when_empty: bool,
}

impl MockSession {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            geometry: ScreenGeometry::new(width, height),
            notifications: VecDeque::new(),
            live: BTreeMap::new(),
            next_handle: 1,
            create_calls: 0,
            created: Vec::new(),
            deleted: Vec::new(),
            relocations: Vec::new(),
            flushes: 0,
            fail_create_at: None,
            fail_relocate: false,
            hang_when_empty: false,
        }
    }

    /// Script a notification to be delivered in FIFO order.
    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Segments of the barriers currently registered, in handle order.
    pub fn live_segments(&self) -> Vec<EdgeSegment> {
        self.live.values().copied().collect()
    }
}

#[async_trait]
impl DisplaySession for MockSession {
    fn query_geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    fn create_barrier(&mut self, segment: EdgeSegment) -> SessionResult<BarrierHandle> {
        let call = self.create_calls;
        self.create_calls += 1;
        if self.fail_create_at == Some(call) {
            return Err(SessionError::BarrierCreation {
                edge: segment.edge,
                reason: "mock failure".into(),
            });
        }
        let handle = BarrierHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle.0, segment);
        self.created.push(segment);
        Ok(handle)
    }

    fn delete_barrier(&mut self, handle: BarrierHandle) -> SessionResult<()> {
        if self.live.remove(&handle.0).is_none() {
            return Err(SessionError::Connection(format!(
                "deleting unknown barrier handle {}",
                handle.0
            )));
        }
        self.deleted.push(handle);
        Ok(())
    }

    fn relocate_pointer(&mut self, target: Point) -> SessionResult<()> {
        if self.fail_relocate {
            return Err(SessionError::Relocation("mock failure".into()));
        }
        self.relocations.push(target);
        Ok(())
    }

    async fn next_notification(&mut self) -> SessionResult<Notification> {
        match self.notifications.pop_front() {
            Some(notification) => Ok(notification),
            None if self.hang_when_empty => std::future::pending().await,
            None => Err(SessionError::Connection("scripted queue exhausted".into())),
        }
    }

    fn flush(&mut self) -> SessionResult<()> {
        self.flushes += 1;
        Ok(())
    }
}
