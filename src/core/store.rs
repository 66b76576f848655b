//! Purpose: Unify local, streaming, and absent datasets behind random access.
//! Exports: `RecordStore`, `Lookup`.
//! Role: Cursor owner; all navigation is clamped here, never surfaced as errors.
//! Invariants: `0 <= cursor < total` whenever `total > 0`; cursor stays 0 otherwise.
//! Invariants: Out-of-range navigation is a no-op and never triggers a fetch.

use crate::core::cache::PagedCache;
use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;

/// Outcome of resolving one index. `NoData` (nothing loaded yet) is distinct
/// from `Unavailable` (a specific record failed to resolve).
#[derive(Debug)]
pub enum Lookup {
    Ready(Record),
    Unavailable { index: usize, error: Error },
    NoData,
}

enum Backing {
    Empty,
    Local(Vec<Record>),
    Streaming(PagedCache),
}

pub struct RecordStore {
    backing: Backing,
    cursor: usize,
}

impl RecordStore {
    pub fn empty() -> Self {
        Self {
            backing: Backing::Empty,
            cursor: 0,
        }
    }

    /// Wrap a fully materialized dataset; `get` is synchronous and succeeds
    /// for every valid index.
    pub fn local(records: Vec<Record>) -> Self {
        Self {
            backing: Backing::Local(records),
            cursor: 0,
        }
    }

    /// Wrap a connected remote source; `get` may block on a window fetch.
    pub fn streaming(cache: PagedCache) -> Self {
        Self {
            backing: Backing::Streaming(cache),
            cursor: 0,
        }
    }

    pub fn total(&self) -> usize {
        match &self.backing {
            Backing::Empty => 0,
            Backing::Local(records) => records.len(),
            Backing::Streaming(cache) => cache.total(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Advance the cursor. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.total() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Step the cursor back. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        if self.cursor > 0 && self.total() > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Reposition the cursor. Out-of-range requests leave it unchanged.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.total() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Resolve the record at `index`. In streaming mode a success also warms
    /// the next index so sequential paging stays ahead of the user.
    pub fn get(&self, index: usize) -> Lookup {
        match &self.backing {
            Backing::Empty => Lookup::NoData,
            Backing::Local(records) => match records.get(index) {
                Some(record) => Lookup::Ready(record.clone()),
                None => Lookup::Unavailable {
                    index,
                    error: Error::new(ErrorKind::Usage)
                        .with_message("index is past the loaded dataset")
                        .with_index(index),
                },
            },
            Backing::Streaming(cache) => match cache.ensure(index) {
                Ok(record) => {
                    if index + 1 < cache.total() {
                        cache.prefetch(index + 1);
                    }
                    Lookup::Ready(record)
                }
                Err(error) => Lookup::Unavailable { index, error },
            },
        }
    }

    /// Resolve the record under the cursor.
    pub fn current(&self) -> Lookup {
        if self.total() == 0 {
            return Lookup::NoData;
        }
        self.get(self.cursor)
    }
}
