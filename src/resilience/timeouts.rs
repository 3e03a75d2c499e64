//! Deadline enforcement.
//!
//! # Responsibilities
//! - Bound a single awaited operation with a fixed deadline
//!
//! The breaker and cache add no deadline of their own. Outbound Maps calls
//! carry the HTTP client's request timeout; store connects go through
//! [`with_deadline`].

use std::future::Future;
use std::time::Duration;
use tokio::time::{error::Elapsed, timeout};

/// Await `fut`, giving up after `secs` seconds.
pub async fn with_deadline<F>(secs: u64, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    timeout(Duration::from_secs(secs), fut).await
}
