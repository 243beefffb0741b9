//! Response-envelope normalization
//!
//! The backing services answer either with a bare resource object or with
//! the `{ success: boolean, data?: T, error?: string }` envelope. Both are
//! normalized here so fetchers hand the synchronizer a plain payload and a
//! single error shape.

use remsync_core::SyncError;
use serde_json::Value;

/// Unwrap a JSON body into its payload
///
/// - Envelope with `success: true` yields the `data` payload (`null` when
///   the service sent none)
/// - Envelope with `success: false` is a service error carrying the
///   envelope's `error` message
/// - Envelope with a non-boolean `success` is a shape error
/// - Anything else is treated as a bare resource and returned as-is
///
/// # Errors
/// - `Service` or `Shape` per the rules above
pub fn unwrap_envelope(body: Value) -> Result<Value, SyncError> {
    let Some(object) = body.as_object() else {
        return Ok(body);
    };

    match object.get("success") {
        None => Ok(body),
        Some(Value::Bool(true)) => Ok(object.get("data").cloned().unwrap_or(Value::Null)),
        Some(Value::Bool(false)) => {
            let message = object
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("service reported failure");
            Err(SyncError::service(message))
        }
        Some(other) => Err(SyncError::shape(format!(
            "expected boolean 'success' field, got {other}"
        ))),
    }
}
