//! Purpose: Shared core library for record-at-a-time dataset browsing.
//! Exports: `core` (parsers, paged cache, record store, errors) and `api`
//! Exports: (public boundary: remote rows client, upload, session wiring).
//! Role: Internal library backing UI hosts; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
