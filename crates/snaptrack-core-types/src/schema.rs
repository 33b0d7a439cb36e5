//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_ENTITY_KIND: &str = "entity_kind";
pub const FIELD_ENTITY_KEY: &str = "entity_key";
pub const FIELD_PROPERTY: &str = "property";

// Detection and save counters
pub const FIELD_DIRTY_COUNT: &str = "dirty_count";
pub const FIELD_SAVED_COUNT: &str = "saved_count";
pub const FIELD_DELETED_COUNT: &str = "deleted_count";

// Error fields
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR_DISPLAY: &str = "err";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
