//! Record and row models

mod field;
mod record;
mod record_serde;
mod row;
mod value;

pub use field::*;
pub use record::*;
pub use row::*;
pub use value::*;
