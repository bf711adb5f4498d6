//! Activity table library
//!
//! Loads the activity records related to one parent record, projects them into
//! display rows, and serves a filtered and sorted view of them.

pub mod builder;
pub mod error;
pub mod model;
pub mod sink;
pub mod source;
pub mod table;

pub use sink::ErrorReport;
pub use sink::ErrorSink;
pub use source::RecordSource;
pub use table::TableController;
