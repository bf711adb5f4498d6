//! Activity table engine
//!
//! Turns raw records into display rows and keeps the visible view in step
//! with the host's filter and sort events.
//!
//! - [`RowProjector`] - derives `OwnerName` and `LinkUrl` for each record
//! - [`FilterEngine`] - substring filtering on one field or any field
//! - [`SortEngine`] - stable single-key sort in either direction
//! - [`TableController`] - load lifecycle and event handling

mod column;
mod config;
mod controller;
mod filter;
mod project;
mod sort;
mod state;

pub use column::*;
pub use config::*;
pub use controller::*;
pub use filter::*;
pub use project::*;
pub use sort::*;
pub use state::*;
