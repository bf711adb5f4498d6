//! Table controller
//!
//! Owns the table state, drives the single load, and answers filter and sort
//! events from the host.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use super::ColumnSpec;
use super::Direction;
use super::FilterEngine;
use super::FilterPolicy;
use super::RowProjector;
use super::SortEngine;
use super::TableConfig;
use super::TableState;
use super::ValueKind;
use super::activity_columns;
use crate::builder::Missing;
use crate::builder::Set;
use crate::error::FetchError;
use crate::model::FieldKey;
use crate::model::Row;
use crate::model::Value;
use crate::sink::ErrorReport;
use crate::sink::ErrorSink;
use crate::source::RecordSource;

/// Where the controller is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has started.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load succeeded.
    Ready,
    /// The last load failed or timed out.
    Failed,
}

/// What a call to [`TableController::activate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were loaded; carries the row count.
    Loaded(usize),
    /// Another load was already in flight; no fetch was issued.
    AlreadyLoading,
    /// The load failed and was reported.
    Failed,
    /// The controller was disposed while loading; the result was dropped.
    Discarded,
    /// The controller was already disposed; nothing happened.
    Disposed,
}

/// Drives an activity table.
///
/// Cheap to clone (uses `Arc` internally); clones share state, so one clone
/// can run [`activate`](Self::activate) on a spawned task while another
/// handles filter and sort events.
///
/// # Example
///
/// ```ignore
/// use activity_lib::sink::LogErrorSink;
/// use activity_lib::table::{TableConfig, TableController};
///
/// let controller = TableController::builder()
///     .source(my_source)
///     .sink(LogErrorSink)
///     .config(TableConfig::new().with_scope_id("001A000001"))
///     .build();
///
/// controller.activate().await;
/// controller.on_filter_change("Kickoff");
/// for row in controller.visible_rows() {
///     // render
/// }
/// ```
#[derive(Clone)]
pub struct TableController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    source: Arc<dyn RecordSource>,
    sink: Arc<dyn ErrorSink>,
    projector: RowProjector,
    filter: FilterEngine,
    sorter: SortEngine,
    columns: Vec<ColumnSpec>,
    config: TableConfig,
    shared: RwLock<Shared>,
}

#[derive(Default)]
struct Shared {
    table: TableState,
    load: LoadState,
    generation: u64,
    disposed: bool,
}

impl ControllerInner {
    fn read(&self) -> RwLockReadGuard<'_, Shared> {
        self.shared.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.shared.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Resets the load state if an `activate` future is dropped mid-flight.
struct InFlight<'a> {
    inner: &'a ControllerInner,
    generation: u64,
    previous: LoadState,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut shared = self.inner.write();
        if shared.generation == self.generation && shared.load == LoadState::Loading {
            log::debug!("Load {} cancelled", self.generation);
            shared.load = self.previous;
        }
    }
}

impl std::fmt::Debug for TableController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.inner.read();
        f.debug_struct("TableController")
            .field("scope_id", &self.inner.config.scope_id)
            .field("load", &shared.load)
            .field("rows", &shared.table.all_rows().len())
            .field("disposed", &shared.disposed)
            .finish_non_exhaustive()
    }
}

impl TableController {
    /// Creates a new builder for constructing a controller.
    pub fn builder() -> TableControllerBuilder<Missing, Missing> {
        TableControllerBuilder::new()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Loads the rows for the configured scope.
    ///
    /// At most one load is in flight: a call made while another is pending
    /// returns [`LoadOutcome::AlreadyLoading`] without fetching. The fetch is
    /// bounded by [`TableConfig::fetch_timeout`]. A failure moves the
    /// controller to [`LoadState::Failed`], leaves the rows untouched, and is
    /// reported to the sink exactly once. A result that arrives after
    /// [`dispose`](Self::dispose) is dropped without being reported.
    pub async fn activate(&self) -> LoadOutcome {
        let mut in_flight = {
            let mut shared = self.inner.write();
            if shared.disposed {
                log::debug!("Ignoring activate on disposed table");
                return LoadOutcome::Disposed;
            }
            if shared.load == LoadState::Loading {
                log::debug!("Load already in flight");
                return LoadOutcome::AlreadyLoading;
            }
            let previous = shared.load;
            shared.load = LoadState::Loading;
            shared.generation += 1;
            InFlight {
                inner: &self.inner,
                generation: shared.generation,
                previous,
                settled: false,
            }
        };

        let scope_id = self.inner.config.scope_id.as_str();
        let timeout = self.inner.config.fetch_timeout;
        log::debug!("Loading activities for {:?} (load {})", scope_id, in_flight.generation);

        let result = match tokio::time::timeout(timeout, self.inner.source.fetch(scope_id)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };
        let result = result.map(|records| self.inner.projector.project_all(records));

        let mut shared = self.inner.write();
        in_flight.settled = true;

        if shared.disposed || shared.generation != in_flight.generation {
            log::debug!("Discarding result of load {}", in_flight.generation);
            shared.load = in_flight.previous;
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(rows) => {
                let count = rows.len();
                shared
                    .table
                    .replace_rows(rows, &self.inner.filter, &self.inner.sorter);
                shared.load = LoadState::Ready;
                log::debug!("Loaded {} activities", count);
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                shared.load = LoadState::Failed;
                drop(shared);

                let detail = err.detail();
                log::error!("{}", detail);
                self.inner
                    .sink
                    .report(ErrorReport::error(self.inner.config.error_title.clone(), detail));
                LoadOutcome::Failed
            }
        }
    }

    /// Marks the controller as torn down.
    ///
    /// Any pending load result is discarded and later calls to
    /// [`activate`](Self::activate) do nothing.
    pub fn dispose(&self) {
        let mut shared = self.inner.write();
        if !shared.disposed {
            log::debug!("Disposing table for {:?}", self.inner.config.scope_id);
            shared.disposed = true;
        }
    }

    /// Returns `true` once [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.inner.read().disposed
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Applies a new filter query, keeping the current sort.
    pub fn on_filter_change(&self, query: impl Into<String>) {
        let query = query.into();
        log::trace!("Filter changed to {:?}", query);
        self.inner
            .write()
            .table
            .set_filter(query, &self.inner.filter, &self.inner.sorter);
    }

    /// Applies a new sort, keeping the current filter.
    ///
    /// Returns `false` (and changes nothing) when `field` belongs to a column
    /// marked non-sortable. Fields outside the column set are accepted.
    pub fn on_sort_change(&self, field: FieldKey, direction: Direction) -> bool {
        if let Some(column) = self.column(&field)
            && !column.sortable
        {
            log::warn!("Ignoring sort on non-sortable column {}", field);
            return false;
        }
        log::trace!("Sort changed to {} {}", field, direction);
        self.inner.write().table.set_sort(
            Some((field, direction)),
            &self.inner.filter,
            &self.inner.sorter,
        );
        true
    }

    /// Sorts by `field`, flipping the direction if it is already the sort field.
    ///
    /// A new field starts at [`TableConfig::default_direction`].
    pub fn on_sort_field(&self, field: FieldKey) -> bool {
        let direction = match self.inner.read().table.sort() {
            Some((current, direction)) if *current == field => direction.reversed(),
            _ => self.inner.config.default_direction,
        };
        self.on_sort_change(field, direction)
    }

    /// Drops the sort, showing filtered rows in source order.
    pub fn clear_sort(&self) {
        self.inner
            .write()
            .table
            .set_sort(None, &self.inner.filter, &self.inner.sorter);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the load state.
    pub fn load_state(&self) -> LoadState {
        self.inner.read().load
    }

    /// Returns the rows to display.
    pub fn visible_rows(&self) -> Vec<Row> {
        self.inner.read().table.visible_rows().to_vec()
    }

    /// Returns every loaded row, in source order.
    pub fn all_rows(&self) -> Vec<Row> {
        self.inner.read().table.all_rows().to_vec()
    }

    /// Returns a snapshot of the full table state.
    pub fn table_state(&self) -> TableState {
        self.inner.read().table.clone()
    }

    /// Returns the column set.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.inner.columns
    }

    /// Returns the column for `field`, if the column set has one.
    pub fn column(&self, field: &FieldKey) -> Option<&ColumnSpec> {
        self.inner.columns.iter().find(|c| c.key == *field)
    }

    /// Returns the active sort.
    pub fn sort(&self) -> Option<(FieldKey, Direction)> {
        self.inner
            .read()
            .table
            .sort()
            .map(|(field, direction)| (field.clone(), direction))
    }

    /// Returns the active filter query.
    pub fn filter_query(&self) -> String {
        self.inner.read().table.filter_query().to_string()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Builder for constructing a [`TableController`].
///
/// # Required Fields
///
/// - `source` - A [`RecordSource`] implementation
/// - `sink` - An [`ErrorSink`] implementation
///
/// # Example
///
/// ```
/// use activity_lib::model::FieldKey;
/// use activity_lib::sink::CollectingErrorSink;
/// use activity_lib::source::StaticRecordSource;
/// use activity_lib::table::{FilterPolicy, TableController};
///
/// let controller = TableController::builder()
///     .source(StaticRecordSource::new(vec![]))
///     .sink(CollectingErrorSink::new())
///     .filter_policy(FilterPolicy::AnyField)
///     .build();
///
/// assert_eq!(controller.columns()[0].key, FieldKey::LinkUrl);
/// ```
pub struct TableControllerBuilder<S, K> {
    source: S,
    sink: K,
    projector: RowProjector,
    filter: FilterEngine,
    sorter: SortEngine,
    columns: Vec<ColumnSpec>,
    config: TableConfig,
}

impl TableControllerBuilder<Missing, Missing> {
    /// Creates a new builder with the activity columns and default settings.
    pub fn new() -> Self {
        Self {
            source: Missing,
            sink: Missing,
            projector: RowProjector::new(),
            filter: FilterEngine::default(),
            sorter: SortEngine::new(),
            columns: activity_columns(),
            config: TableConfig::default(),
        }
    }
}

impl Default for TableControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TableControllerBuilder<Missing, K> {
    /// Sets the record source.
    pub fn source<T: RecordSource + 'static>(
        self,
        source: T,
    ) -> TableControllerBuilder<Set<Arc<dyn RecordSource>>, K> {
        TableControllerBuilder {
            source: Set(Arc::new(source) as Arc<dyn RecordSource>),
            sink: self.sink,
            projector: self.projector,
            filter: self.filter,
            sorter: self.sorter,
            columns: self.columns,
            config: self.config,
        }
    }
}

impl<S> TableControllerBuilder<S, Missing> {
    /// Sets the error sink.
    pub fn sink<T: ErrorSink + 'static>(
        self,
        sink: T,
    ) -> TableControllerBuilder<S, Set<Arc<dyn ErrorSink>>> {
        TableControllerBuilder {
            source: self.source,
            sink: Set(Arc::new(sink) as Arc<dyn ErrorSink>),
            projector: self.projector,
            filter: self.filter,
            sorter: self.sorter,
            columns: self.columns,
            config: self.config,
        }
    }
}

impl<S, K> TableControllerBuilder<S, K> {
    /// Sets the row projector.
    pub fn projector(mut self, projector: RowProjector) -> Self {
        self.projector = projector;
        self
    }

    /// Sets the filter policy.
    ///
    /// Defaults to a case-sensitive match on `Subject`.
    pub fn filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter = FilterEngine::new(policy);
        self
    }

    /// Sets a fully configured filter engine.
    pub fn filter_engine(mut self, filter: FilterEngine) -> Self {
        self.filter = filter;
        self
    }

    /// Sets a function applied to field values before they are compared.
    pub fn primer<F>(mut self, primer: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.sorter = self.sorter.with_primer(primer);
        self
    }

    /// Sets the column set.
    ///
    /// Defaults to [`activity_columns`].
    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }
}

impl TableControllerBuilder<Set<Arc<dyn RecordSource>>, Set<Arc<dyn ErrorSink>>> {
    /// Builds the [`TableController`].
    ///
    /// This method is only available when both `source` and `sink` have been set.
    ///
    /// Fields shown in [`ValueKind::DateTime`] columns sort chronologically.
    pub fn build(self) -> TableController {
        let sorter = self
            .columns
            .iter()
            .filter(|column| column.kind == ValueKind::DateTime)
            .fold(self.sorter, |sorter, column| {
                sorter.with_datetime_field(column.key.clone())
            });

        TableController {
            inner: Arc::new(ControllerInner {
                source: self.source.0,
                sink: self.sink.0,
                projector: self.projector,
                filter: self.filter,
                sorter,
                columns: self.columns,
                config: self.config,
                shared: RwLock::new(Shared::default()),
            }),
        }
    }
}
