//! Integration tests for CacheStore admission and concurrency.

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use cachestore::{CacheStore, StoreError, StoreLimits, DEFAULT_CAPACITY};

#[test]
fn test_fill_to_capacity_then_reject() {
    let store = CacheStore::with_capacity(5);
    for i in 0..5 {
        store.set(&format!("key{}", i), format!("value{}", i)).unwrap();
    }

    assert_eq!(
        store.set("one-too-many", "value"),
        Err(StoreError::Full { capacity: 5 })
    );

    // Prior entries untouched, rejected key absent.
    for i in 0..5 {
        assert_eq!(
            store.get(&format!("key{}", i)),
            Some(Bytes::from(format!("value{}", i)))
        );
    }
    assert_eq!(store.get("one-too-many"), None);
    assert_eq!(store.len(), 5);
}

#[test]
fn test_default_limits() {
    let store = CacheStore::default();
    assert_eq!(store.capacity(), DEFAULT_CAPACITY);
    assert_eq!(store.limits(), &StoreLimits::default());

    let key = "k".repeat(50);
    let value = vec![b'v'; 256];
    store.set(&key, value.clone()).unwrap();
    assert_eq!(store.get(&key), Some(Bytes::from(value)));

    assert!(matches!(
        store.set(&"k".repeat(51), "v"),
        Err(StoreError::KeyTooLong { len: 51, max: 50 })
    ));
    assert!(matches!(
        store.set("k", vec![b'v'; 257]),
        Err(StoreError::ValueTooLong { len: 257, max: 256 })
    ));
}

#[test]
fn test_concurrent_writers_never_exceed_capacity() {
    let store = CacheStore::with_capacity(50);
    let accepted = AtomicUsize::new(0);

    crossbeam::scope(|s| {
        for writer in 0..8 {
            let store = &store;
            let accepted = &accepted;
            s.spawn(move |_| {
                for i in 0..20 {
                    if store.set(&format!("w{}-{}", writer, i), "x").is_ok() {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    })
    .unwrap();

    assert_eq!(accepted.load(Ordering::Relaxed), 50);
    assert_eq!(store.len(), 50);
    assert_eq!(store.stats().rejections(), 160 - 50);
}

#[test]
fn test_stats_track_reads() {
    let store = CacheStore::default();
    store.set("k", "v").unwrap();

    store.get("k");
    store.get("k");
    store.get("nope");

    assert_eq!(store.stats().hits(), 2);
    assert_eq!(store.stats().misses(), 1);
    assert_eq!(store.stats().inserts(), 1);
}
