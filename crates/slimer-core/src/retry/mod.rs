//! Retry and backoff for the archive download.
//!
//! Failures are classified (timeouts, throttling, connection errors, 5xx)
//! and fed to an exponential backoff policy; anything else fails at once.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
