//! Purpose: Define the record representation shared by parsers and stores.
//! Exports: `Record`, `decode_record`.
//! Role: Decode boundary that centralizes serde_json usage for records.
//! Invariants: A record is an open field map; the core never validates shape.
//! Invariants: Decode failures map to `ErrorKind::Decode` here, once, so
//! Invariants: parsers stay skip-only and stores never see raw serde errors.

use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};

/// One dataset entry: an open-ended field-name to value mapping.
pub type Record = Map<String, Value>;

/// Decode one independent record from a text fragment. Non-object JSON
/// (bare numbers, arrays) is rejected: downstream consumers key by field.
pub(crate) fn decode_record(input: &str) -> Result<Record, Error> {
    serde_json::from_str(input).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid record json")
            .with_source(err)
    })
}
