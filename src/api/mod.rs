//! Purpose: Define the stable public boundary for dataset browsing hosts.
//! Exports: Errors, records, parsers, store, cache, remote client, session.
//! Role: Public, additive-only surface; hides engine module layout.
//! Invariants: This module is the only public path UI hosts should import.
//! Invariants: Navigation is silent on out-of-range requests by contract.

mod remote;
mod session;
mod upload;

pub type ApiResult<T> = Result<T, Error>;

pub use crate::core::cache::{DEFAULT_WINDOW, PagedCache, RowSource, RowsPage};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::{jsonl, table};
pub use crate::core::record::Record;
pub use crate::core::store::{Lookup, RecordStore};
pub use remote::{Connected, RemoteSource, RowsClient, SourceSpec, connect};
pub use session::{RecordSink, Session};
pub use upload::{UploadFormat, parse_upload};
