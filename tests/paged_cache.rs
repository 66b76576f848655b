//! Purpose: Exercise windowed fetch, prefetch, and in-flight dedup rules.
//! Exports: Integration tests only (no runtime exports).
//! Role: Validate the one-fetch-per-window guarantees under concurrency.
//! Invariants: Bounded waits avoid test flakiness; no unbounded sleeps.
//! Invariants: Each test installs the env-filtered subscriber so fetch and
//! Invariants: prefetch logging is observable under `RUST_LOG`.

use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tabulite::api::{Error, ErrorKind, PagedCache, Record, RowSource, RowsPage};

struct SlowSource {
    total: usize,
    delay: Duration,
    fetches: Arc<AtomicUsize>,
}

impl SlowSource {
    fn new(total: usize, delay_ms: u64) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            Self {
                total,
                delay: Duration::from_millis(delay_ms),
                fetches: fetches.clone(),
            },
            fetches,
        )
    }
}

fn row(index: usize) -> Record {
    let mut record = Record::new();
    record.insert("i".to_string(), json!(index));
    record
}

impl RowSource for SlowSource {
    fn fetch_rows(&self, offset: usize, length: usize) -> Result<RowsPage, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        let end = (offset + length).min(self.total);
        Ok(RowsPage {
            total: self.total,
            rows: (offset..end).map(row).collect(),
        })
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn wait_until(deadline_ms: u64, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(deadline_ms);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn prefetch_inside_a_fresh_window_issues_no_request() {
    init_tracing();
    let (source, fetches) = SlowSource::new(100, 0);
    let cache = PagedCache::with_window(Box::new(source), 100, 20);
    cache.ensure(5).expect("ensure");
    cache.prefetch(6);
    // The ensure window [5, 25) already covers 6; give any stray thread a
    // moment and confirm no second request happened.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn prefetch_past_the_window_warms_the_next_one() {
    init_tracing();
    let (source, fetches) = SlowSource::new(100, 0);
    let cache = PagedCache::with_window(Box::new(source), 100, 20);
    cache.ensure(0).expect("ensure");
    cache.prefetch(20);
    assert!(
        wait_until(2_000, || cache.contains(20)),
        "prefetch should have warmed index 20"
    );
    assert!(cache.contains(39));
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_ensure_calls_for_one_index_collapse_to_one_fetch() {
    init_tracing();
    let (source, fetches) = SlowSource::new(100, 30);
    let cache = PagedCache::with_window(Box::new(source), 100, 20);

    let mut handles = Vec::new();
    for _ in 0..2 {
        let cache = cache.clone();
        handles.push(thread::spawn(move || cache.ensure(3)));
    }
    for handle in handles {
        let record = handle.join().expect("join").expect("ensure");
        assert_eq!(record["i"], json!(3));
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn prefetch_racing_explicit_navigation_does_not_double_fetch() {
    init_tracing();
    let (source, fetches) = SlowSource::new(100, 30);
    let cache = PagedCache::with_window(Box::new(source), 100, 20);

    cache.prefetch(40);
    let record = cache.ensure(40).expect("ensure");
    assert_eq!(record["i"], json!(40));
    // Wait out the prefetch thread (it either deduped or was never spawned).
    assert!(wait_until(2_000, || fetches.load(Ordering::SeqCst) >= 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn rejected_fetch_leaves_previous_entries_intact() {
    init_tracing();
    struct Flaky {
        total: usize,
        fetches: Arc<AtomicUsize>,
    }
    impl RowSource for Flaky {
        fn fetch_rows(&self, offset: usize, length: usize) -> Result<RowsPage, Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if offset >= 20 {
                return Err(Error::new(ErrorKind::Fetch).with_message("simulated outage"));
            }
            let end = (offset + length).min(self.total);
            Ok(RowsPage {
                total: self.total,
                rows: (offset..end).map(row).collect(),
            })
        }
    }

    let fetches = Arc::new(AtomicUsize::new(0));
    let cache = PagedCache::with_window(
        Box::new(Flaky {
            total: 100,
            fetches: fetches.clone(),
        }),
        100,
        20,
    );

    cache.ensure(0).expect("first window");
    let err = cache.ensure(25).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(err.index(), Some(25));

    // Previously cached indices survive and resolve without a new request.
    let before = fetches.load(Ordering::SeqCst);
    for index in [0usize, 7, 19] {
        assert!(cache.contains(index));
        cache.ensure(index).expect("cached row");
    }
    assert_eq!(fetches.load(Ordering::SeqCst), before);
}
