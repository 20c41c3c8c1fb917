// Every store operation emits one start event and exactly one end or end_error event

use snapvault_core::logging_facility::test_capture::init_test_capture;
use snapvault_core::model::{Availability, Version};
use snapvault_core_types::schema::{EVENT_END, EVENT_END_ERROR};
use snapvault_store::Database;

#[test]
fn test_store_operations_are_bracketed_by_events() {
    let capture = init_test_capture();
    let mut db = Database::open_in_memory().unwrap();
    capture.clear();

    db.claim_next_version("mp-1").unwrap();
    db.claim_next_version("mp-1").unwrap();
    let claims = capture.assert_bracketed("claim_next_version");
    assert_eq!(claims.len(), 2);
    assert!(claims.iter().all(|e| e.event.as_deref() == Some(EVENT_END)));

    let err = db
        .set_availability(Version::FIRST, "mp-1", Availability::Offline)
        .unwrap_err();

    let failed = capture.assert_bracketed("set_availability");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(failed[0].err_code(), Some(err.code()));
    assert!(failed[0].fields.contains_key("duration_ms"));
}
