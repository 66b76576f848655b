//! Purpose: Serve random-access row reads over a remote paged source.
//! Exports: `RowSource`, `RowsPage`, `PagedCache`, `DEFAULT_WINDOW`.
//! Role: Sparse index-to-record cache with windowed fetch and prefetch.
//! Invariants: Entries are immutable once set; the cache only ever grows.
//! Invariants: Two outstanding fetches never cover the same index; the
//! Invariants: cached/in-flight check and registration share one lock scope.
//! Notes: Unbounded growth is accepted; sessions are interactive and bounded.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;

/// Rows fetched per round-trip when a miss occurs.
pub const DEFAULT_WINDOW: usize = 20;

/// One page of a remote ordered sequence: the server-reported total row
/// count plus up to `length` records starting at the requested offset.
#[derive(Debug)]
pub struct RowsPage {
    pub total: usize,
    pub rows: Vec<Record>,
}

/// A remote paged-rows endpoint bound to one concrete sequence.
pub trait RowSource: Send + Sync {
    fn fetch_rows(&self, offset: usize, length: usize) -> Result<RowsPage, Error>;
}

/// Cheap-to-clone handle over the shared cache state for one dataset.
#[derive(Clone)]
pub struct PagedCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for PagedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCache")
            .field("window", &self.inner.window)
            .field("total", &self.inner.total)
            .finish_non_exhaustive()
    }
}

struct CacheInner {
    source: Box<dyn RowSource>,
    window: usize,
    total: usize,
    state: Mutex<CacheState>,
    settled: Condvar,
}

#[derive(Default)]
struct CacheState {
    rows: HashMap<usize, Record>,
    // [start, end) windows with an outstanding fetch.
    in_flight: Vec<(usize, usize)>,
}

impl PagedCache {
    pub fn new(source: Box<dyn RowSource>, total: usize) -> Self {
        Self::with_window(source, total, DEFAULT_WINDOW)
    }

    pub fn with_window(source: Box<dyn RowSource>, total: usize, window: usize) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                window: window.max(1),
                total,
                state: Mutex::new(CacheState::default()),
                settled: Condvar::new(),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.inner.total
    }

    pub fn window(&self) -> usize {
        self.inner.window
    }

    pub fn contains(&self, index: usize) -> bool {
        self.inner
            .lock()
            .map(|state| state.rows.contains_key(&index))
            .unwrap_or(false)
    }

    /// Prime the cache with a row obtained out of band (the discovery probe).
    pub fn seed(&self, index: usize, record: Record) {
        if let Ok(mut state) = self.inner.lock() {
            state.rows.entry(index).or_insert(record);
        }
    }

    /// Resolve the record at `index`, fetching the covering window on a miss.
    /// A row absent from an otherwise successful response is a fetch failure
    /// for that index only; previously cached entries are never invalidated.
    pub fn ensure(&self, index: usize) -> Result<Record, Error> {
        let inner = &self.inner;
        if index >= inner.total {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("index is past the reported total")
                .with_index(index));
        }

        let (start, end) = {
            let mut state = inner.lock()?;
            loop {
                if let Some(record) = state.rows.get(&index) {
                    tracing::trace!(index, "row cache hit");
                    return Ok(record.clone());
                }
                if covered(&state.in_flight, index) {
                    state = inner
                        .settled
                        .wait(state)
                        .map_err(|_| poisoned())?;
                    continue;
                }
                let end = (index + inner.window).min(inner.total);
                state.in_flight.push((index, end));
                break (index, end);
            }
        };

        tracing::debug!(start, end, "fetching row window");
        let fetched = inner.source.fetch_rows(start, end - start);

        let mut state = inner.lock()?;
        state.in_flight.retain(|span| *span != (start, end));
        let result = match fetched {
            Ok(page) => {
                for (offset, record) in page.rows.into_iter().enumerate() {
                    // First writer wins; row values are idempotent per index.
                    state.rows.entry(start + offset).or_insert(record);
                }
                state.rows.get(&index).cloned().ok_or_else(|| {
                    Error::new(ErrorKind::Fetch)
                        .with_message("row missing from response window")
                        .with_index(index)
                })
            }
            Err(err) => Err(if err.index().is_some() {
                err
            } else {
                err.with_index(index)
            }),
        };
        inner.settled.notify_all();
        result
    }

    /// Fire-and-forget window warming. Returns without a request (and
    /// without a thread) when `index` is already cached or in flight;
    /// otherwise a background thread runs `ensure` and swallows the outcome.
    pub fn prefetch(&self, index: usize) {
        if index >= self.inner.total {
            return;
        }
        {
            let Ok(state) = self.inner.lock() else {
                return;
            };
            if state.rows.contains_key(&index) || covered(&state.in_flight, index) {
                return;
            }
        }
        let cache = self.clone();
        let spawned = std::thread::Builder::new()
            .name("tabulite-prefetch".to_string())
            .spawn(move || {
                if let Err(err) = cache.ensure(index) {
                    tracing::debug!(index, %err, "prefetch failed; ignored");
                }
            });
        if spawned.is_err() {
            tracing::debug!(index, "prefetch thread unavailable; skipped");
        }
    }
}

impl CacheInner {
    fn lock(&self) -> Result<MutexGuard<'_, CacheState>, Error> {
        self.state.lock().map_err(|_| poisoned())
    }
}

fn covered(in_flight: &[(usize, usize)], index: usize) -> bool {
    in_flight
        .iter()
        .any(|(start, end)| index >= *start && index < *end)
}

fn poisoned() -> Error {
    Error::new(ErrorKind::Internal).with_message("row cache lock poisoned")
}
