//! Error types

mod fetch;
mod field;
mod record;

pub use fetch::*;
pub use field::*;
pub use record::*;
