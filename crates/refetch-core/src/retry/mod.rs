//! Bounded retry of a remote fetch.
//!
//! Attempts run strictly one after another. Failures below the attempt budget
//! are absorbed (logged, not returned); the caller sees either the payload of
//! the first successful attempt or a single terminal [`RetryError`].
//! Classification and backoff are shared through [`RetryPolicy`].

mod classify;
mod error;
mod policy;
mod request;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::{FetchError, RetryError, TransportKind};
pub use policy::{ErrorKind, RetryDecision, RetryMode, RetryPolicy};
pub use request::RetryRequest;
pub use run::{fetch_json, fetch_value, run_with_retry, AttemptOutcome};
