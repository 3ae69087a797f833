//! Display session module
//!
//! Abstracts the display server behind the [`DisplaySession`] trait so the
//! wrap core can be driven by:
//! - A real X11 connection (`X11Session`)
//! - A scripted mock in tests (`MockSession`)
//!
//! Raw display events are decoded into the [`Notification`] sum type once,
//! at the session boundary; everything above it handles typed variants.

#[cfg(test)]
mod mock;
#[cfg(target_os = "linux")]
mod x11;

#[cfg(test)]
pub use mock::MockSession;
#[cfg(target_os = "linux")]
pub use x11::X11Session;

use async_trait::async_trait;
use thiserror::Error;

use crate::geometry::{Edge, EdgeSegment, Point, ScreenGeometry};

/// Errors that can occur while talking to the display server.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("display connection error: {0}")]
    Connection(String),

    #[error("missing required display capability: {0}")]
    CapabilityMissing(String),

    #[error("failed to create barrier on {edge:?} edge: {reason}")]
    BarrierCreation { edge: Edge, reason: String },

    #[error("pointer relocation failed: {0}")]
    Relocation(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Opaque handle to a barrier registered with the display server.
///
/// The session never owns the barrier; the handle is held by the barrier
/// set and passed back for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BarrierHandle(pub u64);

/// A notification delivered by the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The pointer crossed a barrier at `position` (logical pixels).
    Crossing { position: Point },
    /// The screen was reconfigured to a new extent.
    GeometryChanged { width: u32, height: u32 },
    /// An event the session does not recognize; carries the raw event tag.
    Unknown { tag: u8 },
}

/// A connection to the display server.
///
/// All mutation goes through the session; the wrap core holds no display
/// resources of its own beyond [`BarrierHandle`]s.
#[async_trait]
pub trait DisplaySession: Send {
    /// The screen extent as reported at connection time.
    fn query_geometry(&self) -> ScreenGeometry;

    /// Register a barrier along the given edge segment.
    fn create_barrier(&mut self, segment: EdgeSegment) -> SessionResult<BarrierHandle>;

    /// Delete a previously created barrier.
    fn delete_barrier(&mut self, handle: BarrierHandle) -> SessionResult<()>;

    /// Teleport the pointer to an absolute position.
    fn relocate_pointer(&mut self, target: Point) -> SessionResult<()>;

    /// Wait for the next notification. Blocks until one arrives or the
    /// connection fails.
    async fn next_notification(&mut self) -> SessionResult<Notification>;

    /// Flush pending requests to the server.
    fn flush(&mut self) -> SessionResult<()>;
}
