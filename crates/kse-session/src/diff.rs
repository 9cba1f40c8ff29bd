//! Text diff for showing what an edit changed.
//!
//! Valid UTF-8 inputs are diffed per character. If either side is not
//! valid UTF-8 both are diffed per byte, so every differing byte lands in
//! an insert or delete span. Bytes that do not form UTF-8 are shown as
//! `\xNN` escapes.

use std::fmt::Write;

use similar::{capture_diff_slices, Algorithm, ChangeTag, TextDiff};

/// Classification of a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Equal,
    Insert,
    Delete,
}

/// A maximal run of bytes sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSpan {
    pub op: DiffOp,
    pub bytes: Vec<u8>,
}

impl DiffSpan {
    /// Printable form of the span's bytes.
    pub fn text(&self) -> String {
        escape_bytes(&self.bytes)
    }
}

/// Ordered spans covering the whole of both inputs.
///
/// Concatenating the `Equal` and `Delete` spans yields the original bytes;
/// concatenating the `Equal` and `Insert` spans yields the edited bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    spans: Vec<DiffSpan>,
}

impl DiffResult {
    /// Diff `original` against `edited`.
    pub fn compute(original: &[u8], edited: &[u8]) -> Self {
        let mut result = Self::default();

        match (std::str::from_utf8(original), std::str::from_utf8(edited)) {
            (Ok(old), Ok(new)) => {
                let diff = TextDiff::configure()
                    .algorithm(Algorithm::Myers)
                    .diff_chars(old, new);
                for change in diff.iter_all_changes() {
                    result.push(change.tag(), change.value().as_bytes());
                }
            }
            _ => {
                for op in capture_diff_slices(Algorithm::Myers, original, edited) {
                    for change in op.iter_changes(original, edited) {
                        result.push(change.tag(), &[change.value()]);
                    }
                }
            }
        }

        result
    }

    fn push(&mut self, tag: ChangeTag, bytes: &[u8]) {
        let op = match tag {
            ChangeTag::Equal => DiffOp::Equal,
            ChangeTag::Insert => DiffOp::Insert,
            ChangeTag::Delete => DiffOp::Delete,
        };
        match self.spans.last_mut() {
            Some(last) if last.op == op => last.bytes.extend_from_slice(bytes),
            _ => self.spans.push(DiffSpan {
                op,
                bytes: bytes.to_vec(),
            }),
        }
    }

    pub fn spans(&self) -> &[DiffSpan] {
        &self.spans
    }

    /// Whether any span is an insertion or deletion.
    pub fn has_changes(&self) -> bool {
        self.spans.iter().any(|s| s.op != DiffOp::Equal)
    }

    /// Render as plain text, marking deletions `[-like this-]` and
    /// insertions `{+like this+}`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let text = span.text();
            match span.op {
                DiffOp::Equal => out.push_str(&text),
                DiffOp::Delete => {
                    out.push_str("[-");
                    out.push_str(&text);
                    out.push_str("-]");
                }
                DiffOp::Insert => {
                    out.push_str("{+");
                    out.push_str(&text);
                    out.push_str("+}");
                }
            }
        }
        out
    }
}

/// Valid UTF-8 passes through; every other byte becomes `\xNN`.
fn escape_bytes(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                let bad = e.error_len().unwrap_or(rest.len());
                for b in &rest[..bad] {
                    let _ = write!(out, "\\x{b:02x}");
                }
                bytes = &rest[bad..];
            }
        }
    }
}
