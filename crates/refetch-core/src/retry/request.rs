//! Retry request: what to fetch and how many attempts it may take.

use super::error::RetryError;
use super::policy::RetryPolicy;

/// Immutable descriptor for one retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    resource: String,
    policy: RetryPolicy,
}

impl RetryRequest {
    /// `retries` is the total attempt budget (not additional retries after the first).
    pub fn new(resource: impl Into<String>, retries: u32) -> Result<Self, RetryError> {
        Self::with_policy(resource, RetryPolicy::immediate(retries))
    }

    /// Build a request with a full policy (backoff, retry mode).
    pub fn with_policy(resource: impl Into<String>, policy: RetryPolicy) -> Result<Self, RetryError> {
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err(RetryError::InvalidRequest(
                "resource identifier is empty".into(),
            ));
        }
        if policy.max_attempts == 0 {
            return Err(RetryError::InvalidRequest(
                "attempt budget must be at least 1".into(),
            ));
        }
        Ok(Self { resource, policy })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn retries(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
