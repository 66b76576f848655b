//! Purpose: Wire cursor navigation to the external render callbacks.
//! Exports: `Session`, `RecordSink`.
//! Role: Owns the active dataset; one sink callback per accepted navigation.
//! Invariants: Out-of-range navigation invokes nothing and fetches nothing.
//! Invariants: Replacing the dataset discards the previous store and cache.

use crate::core::error::Error;
use crate::core::record::Record;
use crate::core::store::{Lookup, RecordStore};

/// Render interface consumed by the session. `on_record_ready` fires once
/// per successful navigation; `on_record_unavailable` when the record under
/// the cursor failed to resolve. An empty dataset fires neither.
pub trait RecordSink {
    fn on_record_ready(&mut self, record: &Record, index: usize, total: usize);
    fn on_record_unavailable(&mut self, index: usize, error: &Error);
}

pub struct Session {
    store: RecordStore,
}

impl Session {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Swap in a freshly loaded dataset; the old one is torn down here.
    pub fn replace(&mut self, store: RecordStore) {
        self.store = store;
    }

    pub fn total(&self) -> usize {
        self.store.total()
    }

    pub fn current_index(&self) -> usize {
        self.store.current_index()
    }

    pub fn next(&mut self, sink: &mut dyn RecordSink) {
        if self.store.next() {
            self.notify(sink);
        }
    }

    pub fn previous(&mut self, sink: &mut dyn RecordSink) {
        if self.store.previous() {
            self.notify(sink);
        }
    }

    pub fn jump_to(&mut self, index: usize, sink: &mut dyn RecordSink) {
        if self.store.jump_to(index) {
            self.notify(sink);
        }
    }

    /// Emit the record under the cursor without moving it; the initial
    /// render after a load goes through here.
    pub fn show(&self, sink: &mut dyn RecordSink) {
        self.notify(sink);
    }

    fn notify(&self, sink: &mut dyn RecordSink) {
        match self.store.current() {
            Lookup::Ready(record) => {
                sink.on_record_ready(&record, self.store.current_index(), self.store.total());
            }
            Lookup::Unavailable { index, error } => {
                sink.on_record_unavailable(index, &error);
            }
            Lookup::NoData => {}
        }
    }
}
