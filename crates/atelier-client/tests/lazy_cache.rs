use anyhow::{anyhow, Result};
use atelier_client::cache::{Activation, CacheEvent, KeyedFetch, LazyCache, Status};
use atelier_common::schema::BrandRecord;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Counts fetches per call; each fetch waits for a permit on `gate`, and the
/// first `failures` fetches fail.
struct Brands {
    calls: Arc<AtomicUsize>,
    gate: Arc<Semaphore>,
    failures: usize,
}

impl Brands {
    fn open() -> (Self, Arc<AtomicUsize>) {
        Self::gated(Semaphore::MAX_PERMITS, 0)
    }

    fn gated(permits: usize, failures: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = Self {
            calls: calls.clone(),
            gate: Arc::new(Semaphore::new(permits)),
            failures,
        };
        (fetcher, calls)
    }
}

impl KeyedFetch for Brands {
    type Value = Vec<BrandRecord>;

    async fn fetch(&self, key: &str) -> Result<Self::Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await?;
        if call < self.failures {
            return Err(anyhow!("backend unavailable"));
        }
        let brand_name = match key {
            "LV" => "Louis Vuitton".to_string(),
            other => format!("{other} House"),
        };
        Ok(vec![BrandRecord { brand_name }])
    }
}

async fn settle(activation: Activation) {
    match activation {
        Activation::Dispatched(handle) => handle.await.unwrap(),
        other => panic!("expected a dispatched fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn first_activation_fetches_and_caches() {
    let (fetcher, calls) = Brands::open();
    let cache = LazyCache::new(fetcher);

    assert_eq!(cache.get("LV").status, Status::NotRequested);
    settle(cache.activate("LV")).await;

    let entry = cache.get("LV");
    assert_eq!(entry.status, Status::Ready);
    assert_eq!(
        entry.value,
        Some(vec![BrandRecord {
            brand_name: "Louis Vuitton".into()
        }])
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(matches!(cache.activate("LV"), Activation::Cached));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_activation_while_pending_dispatches_once() {
    let (fetcher, calls) = Brands::gated(0, 0);
    let gate = fetcher.gate.clone();
    let cache = LazyCache::new(fetcher);

    let first = cache.activate("KER");
    for _ in 0..10 {
        assert!(matches!(cache.activate("KER"), Activation::InFlight));
    }
    assert_eq!(cache.status("KER"), Status::Pending);

    gate.add_permits(1);
    settle(first).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.status("KER"), Status::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_activation_from_many_tasks_dispatches_once() {
    let (fetcher, calls) = Brands::gated(0, 0);
    let gate = fetcher.gate.clone();
    let cache = LazyCache::new(fetcher);

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.activate("RMS") })
        })
        .collect();

    let mut dispatched = Vec::new();
    for task in tasks {
        if let Activation::Dispatched(handle) = task.await.unwrap() {
            dispatched.push(handle);
        }
    }
    assert_eq!(dispatched.len(), 1);

    gate.add_permits(1);
    for handle in dispatched {
        handle.await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ready_entries_are_stable() {
    let (fetcher, calls) = Brands::open();
    let cache = LazyCache::new(fetcher);
    settle(cache.activate("LV")).await;
    let before = cache.get("LV");

    for _ in 0..100 {
        assert!(matches!(cache.activate("LV"), Activation::Cached));
    }
    assert_eq!(cache.get("LV"), before);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failure_reverts_to_retryable() {
    let (fetcher, calls) = Brands::gated(Semaphore::MAX_PERMITS, 1);
    let cache = LazyCache::new(fetcher);
    let mut events = cache.subscribe();

    settle(cache.activate("LV")).await;
    let entry = cache.get("LV");
    assert_eq!(entry.status, Status::NotRequested);
    assert_eq!(entry.value, None);

    assert_eq!(events.recv().await.unwrap(), CacheEvent::Pending("LV".into()));
    match events.recv().await.unwrap() {
        CacheEvent::Failed { key, reason } => {
            assert_eq!(key, "LV");
            assert!(reason.contains("backend unavailable"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }

    // user-driven retry
    settle(cache.activate("LV")).await;
    assert_eq!(cache.status("LV"), Status::Ready);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(events.recv().await.unwrap(), CacheEvent::Pending("LV".into()));
    assert_eq!(events.recv().await.unwrap(), CacheEvent::Ready("LV".into()));
}

#[tokio::test]
async fn hiding_keeps_cached_values() {
    let (fetcher, calls) = Brands::open();
    let cache = LazyCache::new(fetcher);

    assert!(cache.displayed().is_none());
    settle(cache.show("LV")).await;
    assert_eq!(cache.displayed().unwrap().status, Status::Ready);

    cache.hide();
    assert!(cache.displayed().is_none());
    assert_eq!(cache.status("LV"), Status::Ready);

    assert!(matches!(cache.show("LV"), Activation::Cached));
    assert_eq!(cache.displayed().unwrap().key, "LV");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn late_resolution_still_fills_the_cache() {
    let (fetcher, _calls) = Brands::gated(0, 0);
    let gate = fetcher.gate.clone();
    let cache = LazyCache::new(fetcher);

    let pending = cache.show("CHN");
    cache.hide();
    let _ = cache.show("LV");
    assert_eq!(cache.displayed().unwrap().key, "LV");

    gate.add_permits(2);
    settle(pending).await;
    assert_eq!(cache.status("CHN"), Status::Ready);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn reads_never_fetch() {
    let (fetcher, calls) = Brands::open();
    let cache = LazyCache::new(fetcher);
    for _ in 0..5 {
        assert_eq!(cache.get("LV").status, Status::NotRequested);
        assert_eq!(cache.status("LV"), Status::NotRequested);
    }
    assert!(cache.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Panics on the first fetch, then behaves.
#[derive(Default)]
struct Flaky {
    calls: AtomicUsize,
}

impl KeyedFetch for Flaky {
    type Value = Vec<BrandRecord>;

    async fn fetch(&self, key: &str) -> Result<Self::Value> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("brand lookup blew up for {key}");
        }
        Ok(vec![BrandRecord {
            brand_name: format!("{key} House"),
        }])
    }
}

#[tokio::test]
async fn panicking_fetch_reverts_to_retryable() {
    let cache = LazyCache::new(Flaky::default());
    let mut events = cache.subscribe();

    settle(cache.activate("KER")).await;
    assert_eq!(cache.status("KER"), Status::NotRequested);
    assert_eq!(cache.get("KER").value, None);

    assert_eq!(events.recv().await.unwrap(), CacheEvent::Pending("KER".into()));
    match events.recv().await.unwrap() {
        CacheEvent::Failed { key, reason } => {
            assert_eq!(key, "KER");
            assert!(reason.contains("brand lookup blew up for KER"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }

    settle(cache.activate("KER")).await;
    assert_eq!(cache.status("KER"), Status::Ready);
}
