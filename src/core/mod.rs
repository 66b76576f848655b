//! Purpose: Engine modules for parsing, caching, and random record access.
//! Exports: `error`, `record`, `jsonl`, `table`, `cache`, `store`.
//! Role: Private engine behind `api`; no transport or UI concerns here.
//! Invariants: Parsers are pure functions over in-memory text.
//! Invariants: The only shared mutable state lives inside `cache::PagedCache`.
pub mod cache;
pub mod error;
pub mod jsonl;
pub mod record;
pub mod store;
pub mod table;
