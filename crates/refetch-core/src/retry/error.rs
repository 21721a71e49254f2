//! Per-attempt and terminal error types.

/// Coarse kind of a transport failure, used by transient-only retry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connect or total attempt timeout.
    Timeout,
    /// Connection refused/reset, DNS failure, short read, etc.
    Connection,
    /// Anything else the transport reported (bad URL, TLS, ...).
    Other,
}

/// Failure of a single attempt. Absorbed by the retry loop unless it is the last one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The remote call could not complete.
    #[error("{message}")]
    Transport { kind: TransportKind, message: String },
    /// The call completed with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// 2xx response whose body could not be decoded into the requested payload.
    #[error("decode: {0}")]
    Decode(String),
    /// Response body grew past the configured limit; the transfer was aborted.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },
    /// The attempt was aborted through the cancel token. Never retried.
    #[error("attempt cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        FetchError::Transport {
            kind,
            message: message.into(),
        }
    }
}

/// Terminal outcome of a retry sequence that did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    /// No attempt succeeded. `last_error` is the failure of the final attempt only.
    #[error("giving up after {attempts_made} attempt(s): {last_error}")]
    Exhausted { attempts_made: u32, last_error: String },
    /// The cancel token fired; `attempts_made` counts attempts that were started.
    #[error("cancelled after {attempts_made} attempt(s)")]
    Cancelled { attempts_made: u32 },
    /// Empty resource identifier or zero attempt budget.
    #[error("invalid retry request: {0}")]
    InvalidRequest(String),
}

impl RetryError {
    /// Number of attempts made before the sequence stopped (0 for invalid requests).
    pub fn attempts_made(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts_made, .. } | RetryError::Cancelled { attempts_made } => {
                *attempts_made
            }
            RetryError::InvalidRequest(_) => 0,
        }
    }
}
