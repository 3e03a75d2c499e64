//! Breaker and cache behavior over a shared in-process store.

mod common;

use common::FlakyStore;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use guarded_maps::cache::{CacheAside, CacheConfig, KeyPart};
use guarded_maps::resilience::{BreakerConfig, BreakerError, BreakerState, CircuitBreaker};
use guarded_maps::store::{KeyValueStore, MemoryStore};

#[derive(Debug, PartialEq)]
struct Timeout;

impl std::fmt::Display for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timed out")
    }
}

fn breaker(store: Arc<dyn KeyValueStore>) -> CircuitBreaker {
    CircuitBreaker::new(store, BreakerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_trips_after_five_failures_then_recovers() {
    let store = MemoryStore::new();
    let breaker = breaker(Arc::new(store.clone()));
    let invoked = AtomicU32::new(0);

    for _ in 0..5 {
        let result: Result<(), _> = breaker
            .execute("svc", || async {
                invoked.fetch_add(1, Ordering::SeqCst);
                Err(Timeout)
            })
            .await;
        assert_eq!(result.unwrap_err().into_remote(), Some(Timeout));
    }

    let sixth: Result<(), _> = breaker
        .execute("svc", || async {
            invoked.fetch_add(1, Ordering::SeqCst);
            Err(Timeout)
        })
        .await;
    match sixth {
        Err(BreakerError::Open { operation }) => assert_eq!(operation, "svc"),
        other => panic!("expected open circuit, got {:?}", other),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 5);

    tokio::time::advance(Duration::from_secs(30)).await;

    let value = breaker
        .execute("svc", || async { Ok::<_, Timeout>("fresh") })
        .await
        .unwrap();
    assert_eq!(value, "fresh");

    let status = breaker.status("svc").await.unwrap();
    assert_eq!(status.state, BreakerState::Closed);
    assert_eq!(status.failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_still_open_just_before_reset_timeout() {
    let store = MemoryStore::new();
    let breaker = breaker(Arc::new(store.clone()));

    for _ in 0..5 {
        let _: Result<(), _> = breaker.execute("svc", || async { Err(Timeout) }).await;
    }

    tokio::time::advance(Duration::from_secs(29)).await;
    let result: Result<(), _> = breaker.execute("svc", || async { Ok::<_, Timeout>(()) }).await;
    assert!(result.unwrap_err().is_open());
}

#[tokio::test]
async fn test_concurrent_failures_open_the_circuit() {
    let store = MemoryStore::new();
    let breaker = breaker(Arc::new(store.clone()));

    let calls = (0..20).map(|_| {
        let breaker = breaker.clone();
        async move {
            let r: Result<(), _> = breaker.execute("svc", || async { Err(Timeout) }).await;
            r
        }
    });
    let results = join_all(calls).await;
    assert!(results.iter().all(|r| r.is_err()));

    let status = breaker.status("svc").await.unwrap();
    assert_eq!(status.state, BreakerState::Open);

    let after: Result<(), _> = breaker.execute("svc", || async { Ok::<_, Timeout>(()) }).await;
    assert!(after.unwrap_err().is_open());
}

#[tokio::test]
async fn test_near_duplicate_coordinates_share_cache_entry() {
    let store = MemoryStore::new();
    let cache = CacheAside::new(Arc::new(store.clone()), CacheConfig::default());
    let second_computed = AtomicU32::new(0);

    let first: Result<u64, Timeout> = cache
        .get_or_compute(
            "distance_from_home",
            &[
                KeyPart::from("user@x.com"),
                KeyPart::from(12.9716),
                KeyPart::from(77.5946),
            ],
            3600,
            || async { Ok(1250) },
        )
        .await;
    assert_eq!(first.unwrap(), 1250);

    let second: Result<u64, Timeout> = cache
        .get_or_compute(
            "distance_from_home",
            &[
                KeyPart::from("user@x.com"),
                KeyPart::from(12.97161),
                KeyPart::from(77.59459),
            ],
            3600,
            || async {
                second_computed.fetch_add(1, Ordering::SeqCst);
                Ok(9999)
            },
        )
        .await;
    assert_eq!(second.unwrap(), 1250);
    assert_eq!(second_computed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_hit_bypasses_open_circuit() {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let breaker = breaker(shared.clone());
    let cache = CacheAside::new(shared, CacheConfig::default());
    let parts = [KeyPart::from("place-1")];

    let primed: Result<String, BreakerError<Timeout>> = cache
        .get_or_compute_default("place_details", &parts, || {
            breaker.execute("op", || async { Ok("MG Road".to_string()) })
        })
        .await;
    assert_eq!(primed.unwrap(), "MG Road");

    for _ in 0..5 {
        let _: Result<(), _> = breaker.execute("op", || async { Err(Timeout) }).await;
    }
    assert_eq!(breaker.status("op").await.unwrap().state, BreakerState::Open);

    let cached: Result<String, BreakerError<Timeout>> = cache
        .get_or_compute_default("place_details", &parts, || {
            breaker.execute("op", || async { Ok("never".to_string()) })
        })
        .await;
    assert_eq!(cached.unwrap(), "MG Road");

    let status = breaker.status("op").await.unwrap();
    assert_eq!(status.state, BreakerState::Open);
    assert_eq!(status.failure_count, 0);
}

#[tokio::test]
async fn test_cache_hit_leaves_failure_count_alone() {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let config = BreakerConfig::default();
    let breaker = CircuitBreaker::new(shared.clone(), config);
    let cache = CacheAside::new(shared, CacheConfig::default());
    let parts = [KeyPart::from("place-1")];

    let primed: Result<String, BreakerError<Timeout>> = cache
        .get_or_compute_default("place_details", &parts, || {
            breaker.execute("op", || async { Ok("MG Road".to_string()) })
        })
        .await;
    assert_eq!(primed.unwrap(), "MG Road");

    let failures = config.fail_max - 2;
    for _ in 0..failures {
        let _: Result<(), _> = breaker.execute("op", || async { Err(Timeout) }).await;
    }

    for _ in 0..2 {
        let hit: Result<String, BreakerError<Timeout>> = cache
            .get_or_compute_default("place_details", &parts, || {
                breaker.execute("op", || async { Err(Timeout) })
            })
            .await;
        assert_eq!(hit.unwrap(), "MG Road");
    }

    let status = breaker.status("op").await.unwrap();
    assert_eq!(status.state, BreakerState::Closed);
    assert_eq!(status.failure_count, failures as i64);
}

#[tokio::test]
async fn test_open_circuit_result_is_not_cached() {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let breaker = CircuitBreaker::new(
        shared.clone(),
        BreakerConfig {
            fail_max: 1,
            reset_timeout_secs: 30,
        },
    );
    let cache = CacheAside::new(shared, CacheConfig::default());

    let _: Result<(), _> = breaker.execute("op", || async { Err(Timeout) }).await;

    let result: Result<String, BreakerError<Timeout>> = cache
        .get_or_compute_default("ns", &[KeyPart::from("k")], || {
            breaker.execute("op", || async { Ok("value".to_string()) })
        })
        .await;
    assert!(result.unwrap_err().is_open());
    assert_eq!(store.get("cache:ns:k").await.unwrap(), None);
}

#[tokio::test]
async fn test_store_read_outage_still_computes() {
    let store = FlakyStore::new();
    store.fail_reads(true);
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let breaker = breaker(shared.clone());
    let cache = CacheAside::new(shared, CacheConfig::default());
    let computed = AtomicU32::new(0);

    for _ in 0..2 {
        let result: Result<u64, BreakerError<Timeout>> = cache
            .get_or_compute_default("ns", &[KeyPart::from("k")], || {
                breaker.execute("op", || async {
                    computed.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
            })
            .await;
        assert_eq!(result.unwrap(), 7);
    }

    // Reads keep failing, but each computed value is still written.
    assert_eq!(computed.load(Ordering::SeqCst), 2);
    assert_eq!(store.inner.get("cache:ns:k").await.unwrap().as_deref(), Some("7"));

    store.fail_reads(false);
    let cached: Result<u64, BreakerError<Timeout>> = cache
        .get_or_compute_default("ns", &[KeyPart::from("k")], || {
            breaker.execute("op", || async {
                computed.fetch_add(1, Ordering::SeqCst);
                Ok(8)
            })
        })
        .await;
    assert_eq!(cached.unwrap(), 7);
    assert_eq!(computed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_store_write_outage_never_blocks_calls() {
    let store = FlakyStore::new();
    store.fail_writes(true);
    let breaker = breaker(Arc::new(store.clone()));

    for _ in 0..10 {
        let result: Result<(), _> = breaker.execute("op", || async { Err(Timeout) }).await;
        assert_eq!(result.unwrap_err().into_remote(), Some(Timeout));
    }

    store.fail_writes(false);
    let ok = breaker.execute("op", || async { Ok::<_, Timeout>(1) }).await;
    assert_eq!(ok.unwrap(), 1);
}
