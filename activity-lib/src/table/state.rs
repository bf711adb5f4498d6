//! Table state snapshot

use super::Direction;
use super::FilterEngine;
use super::SortEngine;
use crate::model::FieldKey;
use crate::model::Row;

/// Rows plus the view parameters applied to them.
///
/// `visible_rows` is always derived from `all_rows` by filtering with the
/// current query and then sorting by the current sort; it is never edited
/// directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    all_rows: Vec<Row>,
    visible_rows: Vec<Row>,
    sort: Option<(FieldKey, Direction)>,
    filter_query: String,
}

impl TableState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every projected row, in source order.
    pub fn all_rows(&self) -> &[Row] {
        &self.all_rows
    }

    /// The rows to display.
    pub fn visible_rows(&self) -> &[Row] {
        &self.visible_rows
    }

    /// The active sort, if any.
    pub fn sort(&self) -> Option<(&FieldKey, Direction)> {
        self.sort.as_ref().map(|(field, direction)| (field, *direction))
    }

    /// The active filter query (empty when unfiltered).
    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    /// Replaces every row and re-derives the view.
    pub(crate) fn replace_rows(&mut self, rows: Vec<Row>, filter: &FilterEngine, sorter: &SortEngine) {
        self.all_rows = rows;
        self.refresh(filter, sorter);
    }

    /// Sets the filter query and re-derives the view.
    pub(crate) fn set_filter(&mut self, query: String, filter: &FilterEngine, sorter: &SortEngine) {
        self.filter_query = query;
        self.refresh(filter, sorter);
    }

    /// Sets the sort and re-derives the view.
    pub(crate) fn set_sort(
        &mut self,
        sort: Option<(FieldKey, Direction)>,
        filter: &FilterEngine,
        sorter: &SortEngine,
    ) {
        self.sort = sort;
        self.refresh(filter, sorter);
    }

    fn refresh(&mut self, filter: &FilterEngine, sorter: &SortEngine) {
        let filtered = filter.filter(&self.all_rows, &self.filter_query);
        self.visible_rows = match &self.sort {
            Some((field, direction)) => sorter.sort(&filtered, field, *direction),
            None => filtered,
        };
    }
}
