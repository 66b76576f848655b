//! Purpose: Turn uploaded raw bytes into a materialized dataset.
//! Exports: `UploadFormat`, `parse_upload`.
//! Role: Format dispatch for the external I/O collaborator.
//! Invariants: Decoding is lossy-tolerant; malformed bytes never fail the upload.

use bstr::ByteSlice;

use crate::core::record::Record;
use crate::core::{jsonl, table};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UploadFormat {
    /// Line-delimited JSON records.
    Jsonl,
    /// Delimited table text with a header row.
    Csv,
}

/// Parse uploaded content with the declared format. Invalid UTF-8 sequences
/// are replaced rather than rejected; record-level recovery is then the
/// parser's business.
pub fn parse_upload(bytes: &[u8], format: UploadFormat) -> Vec<Record> {
    let text = bytes.to_str_lossy();
    match format {
        UploadFormat::Jsonl => jsonl::parse(&text),
        UploadFormat::Csv => table::parse(&text),
    }
}
