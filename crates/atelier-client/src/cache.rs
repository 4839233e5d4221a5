use anyhow::{anyhow, Result};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 64;

/// Anything that can produce the value for a key, e.g., the brands of a ticker.
pub trait KeyedFetch: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    fn fetch(&self, key: &str) -> impl Future<Output = Result<Self::Value>> + Send;
}

/// `NotRequested -> Pending -> Ready`. A failed fetch returns the entry to
/// `NotRequested`; nothing ever leaves `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotRequested,
    Pending,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: Option<V>,
    pub status: Status,
}

impl<V> CacheEntry<V> {
    fn not_requested(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            status: Status::NotRequested,
        }
    }
}

/// What [`LazyCache::activate()`] did with the request.
#[derive(Debug)]
pub enum Activation {
    /// Already fetched; render from the cache.
    Cached,
    /// A fetch for this key is outstanding; nothing new was dispatched.
    InFlight,
    /// A fetch was dispatched; the handle resolves once the entry is updated.
    Dispatched(JoinHandle<()>),
}

/// State changes, broadcast to whoever renders the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Pending(String),
    Ready(String),
    Failed { key: String, reason: String },
}

struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    displayed: Option<String>,
}

fn lock<V>(inner: &Mutex<Inner<V>>) -> MutexGuard<'_, Inner<V>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

/// Fetch once per key, keep forever.
///
/// Entries are never evicted: the key space (tickers) is small, and a key
/// seen once re-renders without touching the network. A second `activate`
/// while a fetch is outstanding is always a no-op.
///
/// Separately tracks the *displayed* key (e.g., the hovered ticker); clearing
/// it never touches the entries.
pub struct LazyCache<F: KeyedFetch> {
    fetcher: Arc<F>,
    inner: Arc<Mutex<Inner<F::Value>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<F: KeyedFetch> Clone for LazyCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            inner: self.inner.clone(),
            events: self.events.clone(),
        }
    }
}

impl<F: KeyedFetch> LazyCache<F> {
    pub fn new(fetcher: F) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            fetcher: Arc::new(fetcher),
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                displayed: None,
            })),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Ensure `key` is fetched, dispatching at most one fetch for it at a time.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&self, key: &str) -> Activation {
        {
            let mut inner = lock(&self.inner);
            let entry = inner
                .entries
                .entry(key.to_string())
                .or_insert_with(|| CacheEntry::not_requested(key));
            match entry.status {
                Status::Ready => return Activation::Cached,
                Status::Pending => return Activation::InFlight,
                Status::NotRequested => entry.status = Status::Pending,
            }
        }
        log::debug!("[{key}] cache miss; fetching");
        self.emit(CacheEvent::Pending(key.to_string()));

        let fetcher = self.fetcher.clone();
        let inner = self.inner.clone();
        let events = self.events.clone();
        let key = key.to_string();
        let handle = tokio::spawn(async move {
            // a panicking fetch fails like any other, so the key stays retryable
            let result = match AssertUnwindSafe(fetcher.fetch(&key)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(anyhow!("fetch panicked: {}", panic_message(&*panic))),
            };
            let event = {
                let mut inner = lock(&inner);
                let entry = inner
                    .entries
                    .entry(key.clone())
                    .or_insert_with(|| CacheEntry::not_requested(&key));
                match result {
                    Ok(value) => {
                        entry.value = Some(value);
                        entry.status = Status::Ready;
                        CacheEvent::Ready(key)
                    }
                    Err(e) => {
                        log::error!("Error fetching [{key}]: {e:#}");
                        entry.value = None;
                        entry.status = Status::NotRequested;
                        CacheEvent::Failed {
                            key,
                            reason: format!("{e:#}"),
                        }
                    }
                }
            };
            // no subscribers is fine
            let _ = events.send(event);
        });

        Activation::Dispatched(handle)
    }

    /// Current state of `key`; never triggers a fetch.
    pub fn get(&self, key: &str) -> CacheEntry<F::Value> {
        lock(&self.inner)
            .entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| CacheEntry::not_requested(key))
    }

    pub fn status(&self, key: &str) -> Status {
        lock(&self.inner)
            .entries
            .get(key)
            .map(|e| e.status)
            .unwrap_or(Status::NotRequested)
    }

    /// Point the display at `key` and make sure it is (being) fetched.
    pub fn show(&self, key: &str) -> Activation {
        lock(&self.inner).displayed = Some(key.to_string());
        self.activate(key)
    }

    /// Forget which key is displayed; cached values stay.
    pub fn hide(&self) {
        lock(&self.inner).displayed = None;
    }

    pub fn displayed(&self) -> Option<CacheEntry<F::Value>> {
        let inner = lock(&self.inner);
        let key = inner.displayed.as_ref()?;
        Some(
            inner
                .entries
                .get(key)
                .cloned()
                .unwrap_or_else(|| CacheEntry::not_requested(key)),
        )
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn emit(&self, event: CacheEvent) {
        let _ = self.events.send(event);
    }
}
