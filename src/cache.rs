use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::error::{BoxError, CacheError};

/// The boxed future a producer returns for a key.
pub type ProducerFuture<V> = BoxFuture<'static, Result<V, BoxError>>;

// `Shared` hands every waiter its own clone of the published outcome. A
// dropped sender resolves the receiver to `Canceled` instead, which `get`
// maps to `CacheError::Cancelled`.
type ComputationChannel<V> = Shared<oneshot::Receiver<Result<V, CacheError>>>;

type SlotMap<K, V> = Arc<Mutex<HashMap<K, ComputationChannel<V>>>>;

/// What happens to a key after its producer has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the failed slot; later calls for the key replay the same error
    /// without re-running the producer.
    #[default]
    CacheFailures,
    /// Drop the failed slot once the error is published; the next call for
    /// the key runs the producer again.
    Retry,
}

/// Configuration for the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    pub failure_policy: FailurePolicy,
}

/// A concurrent, in-memory memoizing cache.
///
/// The cache owns a producer function supplied at construction and runs it at
/// most once per key. Concurrent callers of [`get`](Cache::get) for the same
/// key share the in-flight computation and receive the same outcome; callers
/// for different keys never wait on each other. Values are memoized for the
/// lifetime of the cache, which never evicts.
///
/// Every waiter receives its own clone of the produced value, so values that
/// are expensive to clone are best wrapped in [`Arc`] by the producer.
pub struct Cache<K, V, F>
where
    F: Fn(K) -> ProducerFuture<V>,
{
    slots: SlotMap<K, V>,
    producer: F,
    config: CacheConfig,
}

/// Result of the find-or-create step: either a slot another caller already
/// registered, or a fresh one this caller must start the producer for.
enum Slot<V> {
    Existing(ComputationChannel<V>),
    Created(ComputationChannel<V>, oneshot::Sender<Result<V, CacheError>>),
}

impl<K, V, F> Cache<K, V, F>
where
    K: Clone + Eq + Hash + Send + 'static,
    V: Clone + Send + Sync + 'static,
    F: Fn(K) -> ProducerFuture<V>,
{
    /// Creates a cache that memoizes `producer`, with failures cached.
    pub fn new(producer: F) -> Self {
        Self::with_config(producer, CacheConfig::default())
    }

    /// Creates a cache with an explicit configuration.
    pub fn with_config(producer: F, config: CacheConfig) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            producer,
            config,
        }
    }

    /// Gets the value for `key`, running the producer if this is the first
    /// request for it.
    ///
    /// The producer runs on a spawned task, so dropping this future (for
    /// example by racing it against `tokio::time::timeout`) abandons only
    /// this caller's wait; the computation keeps running for everyone else.
    /// Must be called from within a tokio runtime.
    ///
    /// A producer must not call `get` for its own key on the same cache; that
    /// waits on a slot only the producer itself can complete and deadlocks.
    pub async fn get(&self, key: K) -> Result<V, CacheError> {
        let channel = match self.find_or_create_slot(&key) {
            Slot::Existing(channel) => {
                tracing::trace!("computation slot hit");
                channel
            }
            Slot::Created(channel, tx) => {
                tracing::trace!("computation slot miss, starting producer");
                self.spawn_producer(key, tx);
                channel
            }
        };

        match channel.await {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(CacheError::Cancelled),
        }
    }

    /// The configuration this cache was created with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of slots in the cache, in-flight computations included.
    pub fn size(&self) -> usize {
        self.slots.lock().len()
    }

    /// Looks the key up and registers a new slot if none exists, under a
    /// single lock acquisition. Two callers racing on an absent key can
    /// never both create a slot.
    fn find_or_create_slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock();
        match slots.entry(key.clone()) {
            Entry::Occupied(entry) => Slot::Existing(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = oneshot::channel();
                let channel = rx.shared();
                entry.insert(channel.clone());
                Slot::Created(channel, tx)
            }
        }
    }

    /// Dispatches the producer for `key` onto the runtime and completes the
    /// slot with its outcome. The slot map lock is never held while the
    /// producer runs.
    fn spawn_producer(&self, key: K, tx: oneshot::Sender<Result<V, CacheError>>) {
        let fut = (self.producer)(key.clone());
        let slots = Arc::clone(&self.slots);
        let failure_policy = self.config.failure_policy;

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(CacheError::from(err)),
                Err(_panic) => {
                    // There is no outcome to publish. Removing the slot and
                    // dropping `tx` resolves every current waiter to
                    // `Cancelled` and lets a later call start over.
                    tracing::error!("producer panicked, abandoning computation slot");
                    slots.lock().remove(&key);
                    return;
                }
            };

            if let Err(err) = &outcome {
                match failure_policy {
                    FailurePolicy::CacheFailures => {
                        tracing::debug!(error = %err, "producer failed, caching the failure");
                    }
                    FailurePolicy::Retry => {
                        tracing::debug!(error = %err, "producer failed, dropping slot for retry");
                        slots.lock().remove(&key);
                    }
                }
            }

            // All waiters may have gone away already; nothing to do then.
            let _ = tx.send(outcome);
        });
    }
}

impl<K, V, F> fmt::Debug for Cache<K, V, F>
where
    F: Fn(K) -> ProducerFuture<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.try_lock().map(|s| s.len()).unwrap_or_default();
        f.debug_struct("Cache")
            .field("slots", &slots)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
