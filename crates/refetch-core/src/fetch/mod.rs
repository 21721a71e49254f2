//! Remote-call collaborator: one attempt = one call.
//!
//! The retry loop only sees the [`Fetcher`] trait. [`CurlFetcher`] is the
//! production implementation (libcurl GET on a blocking thread).

mod easy;

pub use easy::CurlFetcher;

use crate::cancel::CancelToken;
use crate::retry::FetchError;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// A completed call: status plus raw body. Status is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single remote call for a resource identifier.
///
/// Returns `Err` only when the call could not complete (transport failure or
/// cancellation); HTTP error statuses come back as a `FetchResponse`.
pub trait Fetcher {
    fn fetch(
        &self,
        resource: &str,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Transport settings for [`CurlFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Wall-clock limit for one attempt, including the body transfer.
    pub attempt_timeout: Duration,
    /// Extra request headers (name -> value).
    pub headers: HashMap<String, String>,
    /// Largest body accepted from one attempt.
    pub max_body_bytes: u64,
}

/// 16 MiB.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            attempt_timeout: Duration::from_secs(30),
            headers: HashMap::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl CurlOptions {
    /// libcurl reads a zero timeout as "no limit", so zero is refused here.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connect_timeout.is_zero() {
            anyhow::bail!("connect timeout must be non-zero");
        }
        if self.attempt_timeout.is_zero() {
            anyhow::bail!("attempt timeout must be non-zero");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("max body size must be at least 1 byte");
        }
        Ok(())
    }
}
