use snapvault_core::errors::{ExError, ExErrorKind};
use snapvault_core::logging_facility::test_capture::init_test_capture;
use snapvault_core::{log_op_end, log_op_error, log_op_start};
use snapvault_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, media_package_id = "mp-1");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(
        events[0].fields.get("media_package_id"),
        Some(&"mp-1".to_string())
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].fields.get("duration_ms"), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::Conflict).with_message("duplicate version");
    log_op_error!(op_name, &err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one error event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(
        events[0].fields.get("err_code"),
        Some(&"ERR_CONFLICT".to_string())
    );
}

#[test]
fn test_assert_event_exists_helper() {
    let capture = init_test_capture();
    let op_name = "test_assert_event_exists_unique_4";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 1);

    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
    assert_eq!(
        capture.count_events(|e| e.op.as_deref() == Some(op_name)),
        2
    );
}
