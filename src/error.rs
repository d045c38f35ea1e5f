use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// The error type producers report failures with.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// An error returned by [`Cache::get`](crate::Cache::get).
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The producer failed for this key.
    ///
    /// The same error is shared by every caller waiting on the key, and under
    /// [`FailurePolicy::CacheFailures`](crate::FailurePolicy::CacheFailures)
    /// it is replayed to later callers as well. The producer's own error is
    /// reachable through [`source`](StdError::source).
    #[error("producer failed: {0}")]
    Producer(#[source] Arc<dyn StdError + Send + Sync>),

    /// The computation was abandoned before an outcome was published.
    ///
    /// Surfaced when the producer task died without completing, for example
    /// because the producer panicked or the runtime shut down. Only this
    /// key's current waiters see it; the key itself stays usable.
    #[error("computation was cancelled before it completed")]
    Cancelled,
}

impl From<BoxError> for CacheError {
    fn from(err: BoxError) -> Self {
        CacheError::Producer(Arc::from(err))
    }
}

impl CacheError {
    /// Whether this is a cancelled wait rather than a producer failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CacheError::Cancelled)
    }
}
