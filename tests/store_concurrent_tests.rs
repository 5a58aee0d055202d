// Concurrent access through the Store's reader-writer lock.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skipstore::skiplist::InsertOutcome;
use skipstore::store::{Options, Store};

// =============================================================================
// Test 1: Concurrent readers don't block each other
// =============================================================================
#[test]
fn concurrent_readers_dont_block() {
    let store: Arc<Store<String, String>> = Arc::new(Store::new(Options::default()));

    store.insert("key1".into(), "value1".into());
    store.insert("key2".into(), "value2".into());

    let mut handles = vec![];

    // Spawn 10 reader threads
    for _ in 0..10 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let _ = store.get(&"key1".to_string());
                let _ = store.contains(&"key2".to_string());
                let _ = store.len();
            }
        }));
    }

    // All threads should complete without deadlock
    for h in handles {
        h.join().unwrap();
    }
}

// =============================================================================
// Test 2: Writer and readers work together
// =============================================================================
#[test]
fn writer_and_readers_concurrent() {
    let store: Arc<Store<String, String>> = Arc::new(Store::new(Options::default()));

    let writer_store = Arc::clone(&store);
    let writer = thread::spawn(move || {
        for i in 0..100 {
            writer_store.insert(format!("key{i}"), format!("val{i}"));
        }
    });

    let mut readers = vec![];
    for _ in 0..5 {
        let store = Arc::clone(&store);
        readers.push(thread::spawn(move || {
            for _ in 0..100 {
                // May or may not find the key depending on timing — that's OK
                let _ = store.get(&"key50".to_string());
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    // After all threads done, the key should exist
    assert!(store.get(&"key50".to_string()).is_some());
}

// =============================================================================
// Test 3: Concurrent writers — every acknowledged insert lands
// =============================================================================
// Each thread counts its Inserted outcomes; the final size must equal the
// sum even when threads race on overlapping keys.
#[test]
fn concurrent_writers_size_matches_acknowledged_inserts() {
    const NUM_THREADS: u64 = 4;
    const PER_THREAD: usize = 2500;

    let store: Arc<Store<u32, &'static str>> = Arc::new(Store::new(Options {
        max_level: 18,
        ..Options::default()
    }));

    let mut handles = vec![];
    for tid in 0..NUM_THREADS {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(tid);
            let mut inserted = 0usize;
            for _ in 0..PER_THREAD {
                let key = rng.gen_range(0..10_000u32);
                if store.insert(key, "a") == InsertOutcome::Inserted {
                    inserted += 1;
                }
            }
            inserted
        }));
    }

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(store.len(), total);
}

// =============================================================================
// Test 4: Writers and deleters keep the count consistent
// =============================================================================
#[test]
fn inserts_and_deletes_balance() {
    let store: Arc<Store<u32, u32>> = Arc::new(Store::new(Options::default()));

    // Two writers over disjoint ranges.
    let mut handles = vec![];
    for range in [0..500u32, 500..1000u32] {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in range {
                store.insert(i, i);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.len(), 1000);

    // Concurrent deleters over disjoint halves.
    let mut handles = vec![];
    for range in [0..250u32, 750..1000u32] {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in range {
                store.delete(&i);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 500);
    assert!(store.contains(&250));
    assert!(!store.contains(&100));
    assert!(!store.contains(&900));
}

// =============================================================================
// Test 5: Stats under concurrent mutation stay in bounds
// =============================================================================
#[test]
fn stats_snapshot_is_internally_consistent() {
    let store: Arc<Store<u32, u32>> = Arc::new(Store::new(Options::default()));

    let writer_store = Arc::clone(&store);
    let writer = thread::spawn(move || {
        for i in 0..2000u32 {
            writer_store.insert(i, i);
        }
    });

    for _ in 0..100 {
        let stats = store.stats();
        assert!(stats.level <= stats.max_level);
    }
    writer.join().unwrap();

    let stats = store.stats();
    assert_eq!(stats.entries, 2000);
}
