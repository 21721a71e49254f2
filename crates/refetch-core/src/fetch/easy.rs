//! libcurl-backed fetcher (Easy handle, one GET per attempt).

use std::cell::Cell;

use super::{CurlOptions, FetchResponse, Fetcher};
use crate::cancel::CancelToken;
use crate::retry::{classify_curl_error, FetchError, TransportKind};

/// Production fetcher. Each call runs a blocking curl transfer on tokio's
/// blocking pool; the cancel token aborts the transfer from curl's progress callback.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: CurlOptions,
}

impl CurlFetcher {
    /// Fails if a timeout or the body limit is zero.
    pub fn new(options: CurlOptions) -> anyhow::Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &CurlOptions {
        &self.options
    }
}

impl Fetcher for CurlFetcher {
    async fn fetch(
        &self,
        resource: &str,
        cancel: &CancelToken,
    ) -> Result<FetchResponse, FetchError> {
        let url = resource.to_string();
        let options = self.options.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || perform_get(&url, &options, &cancel))
            .await
            .map_err(|e| FetchError::transport(TransportKind::Other, format!("fetch task join: {}", e)))?
    }
}

fn transport(e: curl::Error) -> FetchError {
    FetchError::transport(classify_curl_error(&e), e.to_string())
}

/// One GET. Follows redirects. Runs in the current thread.
fn perform_get(
    url: &str,
    options: &CurlOptions,
    cancel: &CancelToken,
) -> Result<FetchResponse, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let too_large = Cell::new(false);
    let limit = options.max_body_bytes;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.max_redirections(10).map_err(transport)?;
    easy.connect_timeout(options.connect_timeout)
        .map_err(transport)?;
    easy.timeout(options.attempt_timeout).map_err(transport)?;
    // Needed for the progress callback to fire.
    easy.progress(true).map_err(transport)?;

    let mut list = curl::easy::List::new();
    for (k, v) in &options.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(transport)?;
    }
    if !options.headers.is_empty() {
        easy.http_headers(list).map_err(transport)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if body.len() as u64 + data.len() as u64 > limit {
                    too_large.set(true);
                    return Ok(0); // abort transfer
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(transport)?;
        if let Err(e) = transfer.perform() {
            if e.is_aborted_by_callback() && cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if e.is_write_error() && too_large.get() {
                return Err(FetchError::BodyTooLarge { limit });
            }
            return Err(transport(e));
        }
    }

    let status = easy.response_code().map_err(transport)?;
    tracing::debug!(url, status, bytes = body.len(), "GET completed");
    Ok(FetchResponse { status, body })
}
