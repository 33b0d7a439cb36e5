use snaptrack_core::logging_facility::test_capture::init_test_capture;
use snaptrack_core::{log_op_end, log_op_error, log_op_start, TrackError};
use snaptrack_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

// Tests share one global capture; each uses a unique op name so parallel
// execution cannot cross-contaminate assertions.

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_detect_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_detect_end_unique_2";

    log_op_end!(op_name, duration_ms = 42u64, dirty_count = 2u64);

    let events = capture.events();
    let end_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .expect("Should have end event");

    assert_eq!(end_event.fields.get("duration_ms"), Some(&"42".to_string()));
    assert_eq!(end_event.fields.get("dirty_count"), Some(&"2".to_string()));
}

#[test]
fn test_log_op_error_includes_stable_code() {
    let capture = init_test_capture();
    let op_name = "test_attach_error_unique_3";

    let err = TrackError::ComparerMissing {
        type_name: "Address".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10u64);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(
        error_event.fields.get("err_code"),
        Some(&"ERR_COMPARER_MISSING".to_string())
    );
}

#[test]
fn test_extra_fields_are_recorded() {
    let capture = init_test_capture();
    let op_name = "test_save_fields_unique_4";

    log_op_start!(op_name, entity_key = "customer:1");

    let events = capture.events();
    let start_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name))
        .expect("Should have start event");

    assert_eq!(
        start_event.fields.get("entity_key"),
        Some(&"customer:1".to_string())
    );
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_unique_5";

    log_op_start!(op_name, entity_key = "customer:1");
    log_op_end!(op_name, duration_ms = 7u64);

    let starts = capture
        .count_events(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START));
    let ends = capture
        .count_events(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END));

    assert_eq!(starts, 1, "Should have exactly one start event");
    assert_eq!(ends, 1, "Should have exactly one end event");
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_assert_event_exists_fails_for_unknown_op() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}
