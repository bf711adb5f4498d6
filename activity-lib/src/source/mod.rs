//! Record sources
//!
//! A [`RecordSource`] is the only network-facing boundary of the table: the
//! controller asks it for the records of one scope and never looks behind it.
//!
//! - [`HttpRecordSource`] - GETs a JSON list of records from a REST endpoint
//! - [`StaticRecordSource`] - serves records (or a failure) from memory

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::Record;

/// Asynchronous provider of raw records.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use activity_lib::error::FetchError;
/// use activity_lib::model::Record;
/// use activity_lib::source::RecordSource;
///
/// struct MySource;
///
/// #[async_trait]
/// impl RecordSource for MySource {
///     async fn fetch(&self, scope_id: &str) -> Result<Vec<Record>, FetchError> {
///         Ok(vec![Record::with_id("Event", scope_id)])
///     }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches every record belonging to `scope_id`.
    ///
    /// Succeeds with zero or more records, or fails with a [`FetchError`]
    /// carrying a message and, when the backend sends one, a trace.
    async fn fetch(&self, scope_id: &str) -> Result<Vec<Record>, FetchError>;
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for Arc<T> {
    async fn fetch(&self, scope_id: &str) -> Result<Vec<Record>, FetchError> {
        (**self).fetch(scope_id).await
    }
}
