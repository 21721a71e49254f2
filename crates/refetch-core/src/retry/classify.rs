//! Classify HTTP status and transport errors into retry policy error kinds.

use super::error::{FetchError, TransportKind};
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        408 => ErrorKind::Timeout,
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Map a curl error onto a transport kind.
pub fn classify_curl_error(e: &curl::Error) -> TransportKind {
    if e.is_operation_timedout() {
        return TransportKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportKind::Connection;
    }
    TransportKind::Other
}

/// Classify an attempt failure into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Transport { kind, .. } => match kind {
            TransportKind::Timeout => ErrorKind::Timeout,
            TransportKind::Connection => ErrorKind::Connection,
            TransportKind::Other => ErrorKind::Other,
        },
        FetchError::Status(code) => classify_http_status(*code),
        FetchError::Decode(_) | FetchError::BodyTooLarge { .. } | FetchError::Cancelled => {
            ErrorKind::Other
        }
    }
}
