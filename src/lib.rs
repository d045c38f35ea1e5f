//! A concurrent, in-memory memoizing cache with single-flight computation
//!
//! This crate provides a [`Cache`] that runs a caller-supplied producer at
//! most once per key: concurrent callers for the same key share the
//! in-flight computation and receive the same outcome (value or failure),
//! while callers for different keys proceed independently.

pub mod cache;
pub mod error;

pub use cache::{Cache, CacheConfig, FailurePolicy, ProducerFuture};
pub use error::{BoxError, CacheError};
