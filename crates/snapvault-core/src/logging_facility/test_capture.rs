//! In-memory event capture for tests
//!
//! Installs a subscriber layer that records every event with its fields so
//! tests can assert on what an operation logged. Fields are looked up by
//! the canonical keys in `snapvault_core_types::schema`.

use crate::core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_ERR_CODE, FIELD_EVENT,
    FIELD_MEDIA_PACKAGE_ID, FIELD_OP,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    /// Every field, rendered as text; `message` holds the format string output
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn media_package_id(&self) -> Option<&str> {
        self.field(FIELD_MEDIA_PACKAGE_ID)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// `end` or `end_error`
    pub fn is_terminal(&self) -> bool {
        matches!(self.event.as_deref(), Some(EVENT_END) | Some(EVENT_END_ERROR))
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl FieldRecorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

/// Subscriber layer appending every event to a shared log
pub struct TestCaptureLayer {
    log: EventLog,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let log = EventLog::default();
        (Self { log: log.clone() }, TestCapture { log })
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let fields = recorder.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };

        if let Ok(mut log) = self.log.lock() {
            log.push(captured);
        }
    }
}

/// Shared handle to the captured events
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Events recorded for one operation name, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.op.as_deref() == Some(op))
    }

    /// Events carrying the given media package id
    pub fn events_for_media_package(&self, media_package_id: &str) -> Vec<CapturedEvent> {
        self.filtered(|e| e.media_package_id() == Some(media_package_id))
    }

    /// Number of events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.filtered(predicate).len()
    }

    /// # Panics
    ///
    /// Panics unless some event has this op and event name.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events
                .iter()
                .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event)),
            "no {}/{} event among {} captured",
            op,
            event,
            events.len()
        );
    }

    /// Check that every start of `op` is followed by exactly one terminal
    /// event, and return the terminal events in order.
    ///
    /// # Panics
    ///
    /// Panics on an unmatched start, a terminal without a start, or no
    /// events at all for `op`.
    pub fn assert_bracketed(&self, op: &str) -> Vec<CapturedEvent> {
        let events = self.events_for_op(op);
        assert!(!events.is_empty(), "no events for op {}", op);

        let mut open = false;
        let mut terminals = Vec::new();
        for e in events {
            if e.event.as_deref() == Some(EVENT_START) {
                assert!(!open, "op {} started twice without ending", op);
                open = true;
            } else if e.is_terminal() {
                assert!(open, "op {} ended without a start", op);
                open = false;
                terminals.push(e);
            }
        }
        assert!(!open, "op {} started but never ended", op);
        terminals
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    fn filtered<F>(&self, keep: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| keep(e)).collect()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer globally (first call) and return its handle
///
/// All tests in one binary share the log; filter by a unique op name or
/// media package id.
///
/// # Panics
///
/// Panics if another global subscriber is already installed.
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}
