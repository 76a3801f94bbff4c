use super::types::{ErrorKind, FailureCode, FailureRecord};

/// Message carried by failures where no response reached the client
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// Retryable iff no response arrived, the gateway reported 503/504, the
/// request timed out locally, or the failure is a generic network error.
pub fn is_retryable(record: &FailureRecord) -> bool {
    !record.has_response()
        || matches!(record.status, Some(503) | Some(504))
        || record.code == Some(FailureCode::Timeout)
        || record.message == NETWORK_ERROR_MESSAGE
}

/// Map a failure onto the error taxonomy. Agrees with [`is_retryable`].
pub fn classify(record: &FailureRecord) -> ErrorKind {
    if record.code == Some(FailureCode::Timeout) {
        return ErrorKind::Timeout;
    }

    match record.status {
        None => ErrorKind::Network,
        Some(503) | Some(504) => ErrorKind::ServerUnavailable,
        Some(_) if record.message == NETWORK_ERROR_MESSAGE => ErrorKind::Network,
        Some(status) if (400..500).contains(&status) => ErrorKind::ClientError,
        Some(status) if status >= 500 => ErrorKind::ServerError,
        Some(_) => ErrorKind::Application,
    }
}
