//! Cursor wrap core
//!
//! Handles:
//! - Tracking the current screen extent
//! - Keeping the barrier set in sync with geometry and axis selection
//! - Mapping edge crossings to the opposite edge
//! - The reconciliation loop driving it all

mod barriers;
mod dispatcher;
mod mapper;
mod store;

pub use barriers::BarrierSet;
pub use dispatcher::Dispatcher;
pub use mapper::map_crossing;
pub use store::GeometryStore;
