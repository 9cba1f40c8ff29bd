//! Terminal rendering utilities.

use console::style;
use kse_session::{DiffOp, DiffResult};

/// Render a diff for the terminal.
///
/// Deletions are red and insertions green. The `[-..-]` and `{+..+}`
/// markers are kept so the output stays readable without color.
pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();
    for span in diff.spans() {
        let text = span.text();
        match span.op {
            DiffOp::Equal => out.push_str(&text),
            DiffOp::Delete => {
                let marked = format!("[-{text}-]");
                out.push_str(&style(marked).red().for_stderr().to_string());
            }
            DiffOp::Insert => {
                let marked = format!("{{+{text}+}}");
                out.push_str(&style(marked).green().for_stderr().to_string());
            }
        }
    }
    out
}

/// Render a status line.
pub fn render_status(message: &str) -> String {
    format!("{} {}", style("::").cyan().for_stderr(), message)
}
