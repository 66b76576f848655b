//! Purpose: Parse line-delimited JSON text into an ordered record sequence.
//! Exports: `parse`.
//! Role: Strict-but-tolerant JSONL parser for local uploads.
//! Invariants: A decode failure affects only that one line; order is kept.
//! Invariants: Pure function over in-memory text; no I/O, no partial records.

use crate::core::record::{decode_record, Record};

/// Split on newline boundaries, trim each line, decode each non-empty line
/// as one independent record, and silently drop lines that fail to decode.
pub fn parse(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match decode_record(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                tracing::trace!(line = line_no + 1, %err, "skipping undecodable jsonl line");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(kept = records.len(), skipped, "jsonl parse dropped malformed lines");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::parse;
    use serde_json::json;

    #[test]
    fn one_malformed_line_among_three_is_skipped_in_order() {
        let input = "{\"a\":1}\nnot-json\n{\"b\":2}\n";
        let records = parse(input);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["a"], json!(1));
        assert_eq!(records[1]["b"], json!(2));
    }

    #[test]
    fn blank_and_whitespace_lines_are_ignored() {
        let input = "\n   \n{\"x\":true}\n\t\n";
        let records = parse(input);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["x"], json!(true));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_decode() {
        let input = "  {\"k\":\"v\"}  \r\n";
        let records = parse(input);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["k"], json!("v"));
    }

    #[test]
    fn non_object_lines_count_as_decode_failures() {
        let input = "5\n[1,2]\n\"str\"\n{\"ok\":1}\n";
        let records = parse(input);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["ok"], json!(1));
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn nested_values_pass_through_unvalidated() {
        let input = r#"{"messages":[{"role":"user","content":"hi"}],"meta":{"n":3}}"#;
        let records = parse(input);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["messages"][0]["role"], json!("user"));
        assert_eq!(records[0]["meta"]["n"], json!(3));
    }
}
