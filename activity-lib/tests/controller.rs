//! Integration tests for the table controller lifecycle.
//!
//! Run with: `cargo test -p activity-lib --test controller`

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use activity_lib::error::FetchError;
use activity_lib::model::FieldKey;
use activity_lib::model::Record;
use activity_lib::model::Row;
use activity_lib::sink::CollectingErrorSink;
use activity_lib::sink::Severity;
use activity_lib::source::RecordSource;
use activity_lib::source::StaticRecordSource;
use activity_lib::table::Direction;
use activity_lib::table::FilterPolicy;
use activity_lib::table::LoadOutcome;
use activity_lib::table::LoadState;
use activity_lib::table::TableConfig;
use activity_lib::table::TableController;
use async_trait::async_trait;
use tokio::sync::Notify;

/// A source that blocks each fetch until released.
struct GatedSource {
    started: Notify,
    release: Notify,
    fetches: AtomicUsize,
    fail: bool,
}

impl GatedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            fetches: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            fetches: AtomicUsize::new(0),
            fail: true,
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for GatedSource {
    async fn fetch(&self, _scope_id: &str) -> Result<Vec<Record>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        if self.fail {
            Err(FetchError::backend_with_trace("late failure", "trace"))
        } else {
            Ok(records())
        }
    }
}

fn records() -> Vec<Record> {
    vec![
        Record::with_id("Event", "a1")
            .set("Subject", "Kickoff")
            .set("Owner", Record::new("User").set("Name", "Alice")),
        Record::with_id("Event", "a2")
            .set("Subject", "Review")
            .set("Owner", Record::new("User").set("Name", "Bob")),
    ]
}

fn build<S: RecordSource + 'static>(source: S) -> (TableController, Arc<CollectingErrorSink>) {
    let sink = Arc::new(CollectingErrorSink::new());
    let controller = TableController::builder()
        .source(source)
        .sink(Arc::clone(&sink))
        .config(TableConfig::new().with_scope_id("001A"))
        .build();
    (controller, sink)
}

fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|r| r.record().id().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_scope_id_is_forwarded() {
    let source = Arc::new(StaticRecordSource::new(records()));
    let (controller, _sink) = build(Arc::clone(&source));

    assert_eq!(controller.activate().await, LoadOutcome::Loaded(2));
    assert_eq!(source.last_scope().as_deref(), Some("001A"));
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_failure_reports_message_and_trace() {
    let (controller, sink) = build(StaticRecordSource::failing("x", Some("y".to_string())));

    assert_eq!(controller.activate().await, LoadOutcome::Failed);
    assert_eq!(controller.load_state(), LoadState::Failed);
    assert!(controller.visible_rows().is_empty());

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains('x'));
    assert!(reports[0].message.contains('y'));
    assert_eq!(reports[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_rows() {
    let source = Arc::new(StaticRecordSource::new(records()));
    let (controller, sink) = build(Arc::clone(&source));
    controller.activate().await;
    controller.on_sort_change(FieldKey::Subject, Direction::Desc);
    let before = controller.visible_rows();

    source.set_failure("gone", None);
    assert_eq!(controller.activate().await, LoadOutcome::Failed);
    assert_eq!(controller.visible_rows(), before);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_second_activate_while_pending_does_not_fetch() {
    let source = GatedSource::new();
    let (controller, sink) = build(Arc::clone(&source));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.activate().await }
    });
    source.started.notified().await;
    assert_eq!(controller.load_state(), LoadState::Loading);

    assert_eq!(controller.activate().await, LoadOutcome::AlreadyLoading);
    assert_eq!(source.fetch_count(), 1);

    source.release.notify_one();
    assert_eq!(pending.await.unwrap(), LoadOutcome::Loaded(2));
    assert_eq!(controller.load_state(), LoadState::Ready);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_dispose_discards_late_result() {
    let source = GatedSource::new();
    let (controller, sink) = build(Arc::clone(&source));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.activate().await }
    });
    source.started.notified().await;
    controller.dispose();
    source.release.notify_one();

    assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
    assert_eq!(controller.load_state(), LoadState::Idle);
    assert!(controller.all_rows().is_empty());
    assert!(sink.is_empty());
    assert_eq!(controller.activate().await, LoadOutcome::Disposed);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_dispose_discards_late_error() {
    let source = GatedSource::failing();
    let (controller, sink) = build(Arc::clone(&source));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.activate().await }
    });
    source.started.notified().await;
    controller.dispose();
    source.release.notify_one();

    assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
    assert_ne!(controller.load_state(), LoadState::Loading);
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_and_reports() {
    let source = GatedSource::new();
    let sink = Arc::new(CollectingErrorSink::new());
    let controller = TableController::builder()
        .source(Arc::clone(&source))
        .sink(Arc::clone(&sink))
        .config(
            TableConfig::new()
                .with_fetch_timeout(Duration::from_secs(5))
                .with_error_title("Activities unavailable"),
        )
        .build();

    assert_eq!(controller.activate().await, LoadOutcome::Failed);
    assert_eq!(controller.load_state(), LoadState::Failed);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].title, "Activities unavailable");
    assert!(reports[0].message.contains("Timeout"));
}

#[tokio::test]
async fn test_cancelled_load_can_be_retried() {
    let source = GatedSource::new();
    let (controller, _sink) = build(Arc::clone(&source));

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.activate().await }
    });
    source.started.notified().await;
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());
    assert_eq!(controller.load_state(), LoadState::Idle);

    source.release.notify_one();
    assert_eq!(controller.activate().await, LoadOutcome::Loaded(2));
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_view_parameters_survive_reload() {
    let source = Arc::new(StaticRecordSource::new(records()));
    let sink = Arc::new(CollectingErrorSink::new());
    let controller = TableController::builder()
        .source(Arc::clone(&source))
        .sink(Arc::clone(&sink))
        .filter_policy(FilterPolicy::AnyField)
        .build();

    controller.on_filter_change("o");
    controller.on_sort_change(FieldKey::OwnerName, Direction::Desc);
    controller.activate().await;
    // "Kickoff" and "Bob" both contain "o"
    assert_eq!(ids(&controller.visible_rows()), ["a2", "a1"]);

    let mut more = records();
    more.push(
        Record::with_id("Event", "a3")
            .set("Subject", "Demo")
            .set("Owner", Record::new("User").set("Name", "Carol")),
    );
    source.set_records(more);
    controller.activate().await;

    assert_eq!(ids(&controller.visible_rows()), ["a3", "a2", "a1"]);
    assert_eq!(controller.filter_query(), "o");
    assert_eq!(controller.sort(), Some((FieldKey::OwnerName, Direction::Desc)));
}

#[tokio::test]
async fn test_backend_json_end_to_end() {
    let body = r#"[
        {
            "attributes": {"type": "Event", "url": "/services/data/v59.0/sobjects/Event/00U1"},
            "Id": "00U1",
            "Subject": "Quarterly review",
            "StartDateTime": "2024-03-01T09:05:00.000+0000",
            "EndDateTime": "2024-03-01T10:00:00.000+0000",
            "LastModifiedDate": "2024-02-20T16:30:00.000+0000",
            "Owner": {"attributes": {"type": "Name"}, "Name": "Alice"}
        },
        {
            "attributes": {"type": "Event"},
            "Id": "00U2",
            "Subject": "Kickoff",
            "StartDateTime": "2024-01-15T14:00:00.000+0000",
            "EndDateTime": "2024-01-15T15:00:00.000+0000",
            "LastModifiedDate": "2024-01-10T08:00:00.000+0000",
            "Owner": {"attributes": {"type": "Name"}, "Name": "Bob"}
        }
    ]"#;
    let records: Vec<Record> = serde_json::from_str(body).unwrap();
    let (controller, _sink) = build(StaticRecordSource::new(records));

    controller.activate().await;
    controller.on_sort_field(FieldKey::StartDateTime);

    let rows = controller.visible_rows();
    assert_eq!(ids(&rows), ["00U2", "00U1"]);

    let columns = controller.columns();
    let cells: Vec<String> = columns.iter().map(|c| c.cell_text(&rows[1])).collect();
    assert_eq!(
        cells,
        ["Quarterly review", "2024/3/1 09:05", "2024/3/1 10:00", "2024/2/20 16:30", "Alice"]
    );
    assert_eq!(columns[0].link_target(&rows[1]), Some("/00U1"));
}
