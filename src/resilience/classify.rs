//! Classify call outcomes for the availability tracker.

use crate::error::DeliveryError;

/// Status codes at or above this mark the server as failing.
pub const SERVER_ERROR_THRESHOLD: u16 = 500;

/// A response with this status is a failed delivery.
pub fn is_server_error(code: u16) -> bool {
    code >= SERVER_ERROR_THRESHOLD
}

/// Whether a failed delivery should push the tracker into (or deeper into) backoff.
///
/// Transport failures always count. Responses count only when they are server errors;
/// 4xx responses reached a working server.
pub fn counts_against_availability(error: &DeliveryError) -> bool {
    match error {
        DeliveryError::Transport(_) => true,
        DeliveryError::Status { code, .. } => is_server_error(*code),
    }
}
