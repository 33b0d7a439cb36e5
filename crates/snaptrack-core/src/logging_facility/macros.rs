//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use snaptrack_core::log_op_start;
/// log_op_start!("detect_changes");
/// log_op_start!("save_changes", entity_key = "customer:1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use snaptrack_core::log_op_end;
/// log_op_end!("detect_changes", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Works with any error type exposing a stable `code()` (both `TrackError`
/// and the store-side error type do).
///
/// # Example
///
/// ```ignore
/// # use snaptrack_core::{log_op_error, errors::TrackError};
/// let err = TrackError::EntityNotTracked { key: "customer:1".to_string() };
/// log_op_error!("save_changes", err, duration_ms = 2);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_code = $err.code(),
            err = %$err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = snaptrack_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_code = $err.code(),
            err = %$err,
            $($field)*
        );
    }};
}
