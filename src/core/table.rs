//! Purpose: Parse a full delimited-text (CSV) document into keyed records.
//! Exports: `parse`.
//! Role: Table parser for local uploads; header row names the fields.
//! Invariants: Single left-to-right scan with one in-quotes state bit.
//! Invariants: Width mismatches are handled leniently by design: missing
//! Invariants: cells become empty strings, extra cells are dropped.

use serde_json::Value;

use crate::core::record::Record;

/// Parse comma-delimited text with double-quote quoting. The first row is
/// the header (names trimmed); data rows are keyed field-by-field to header
/// names, values untrimmed. Inside quotes, `""` is a literal quote and
/// commas/newlines are data. Blank data rows are skipped and trailing blank
/// rows are dropped; header-only or empty input yields an empty sequence.
pub fn parse(text: &str) -> Vec<Record> {
    let mut rows = scan_rows(text);
    while rows
        .last()
        .is_some_and(|row| row.len() == 1 && row[0].is_empty())
    {
        rows.pop();
    }
    if rows.len() < 2 {
        return Vec::new();
    }

    let mut rows = rows.into_iter();
    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in rows {
        if row.len() == 1 && row[0].is_empty() {
            continue;
        }
        let mut record = Record::new();
        for (col, name) in headers.iter().enumerate() {
            let value = row.get(col).cloned().unwrap_or_default();
            record.insert(name.clone(), Value::String(value));
        }
        records.push(record);
    }
    records
}

fn scan_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            // CRLF ends a row only outside quotes; a lone CR is data.
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
