//! Shared fixtures for the integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use kse_session::{DiffResult, Prompter};

/// Prompter answering from a fixed script.
pub struct ScriptedPrompter {
    choices: RefCell<VecDeque<String>>,
    confirm: bool,
    pub diffs: RefCell<Vec<String>>,
    pub notices: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(choices: &[&str], confirm: bool) -> Self {
        Self {
            choices: RefCell::new(choices.iter().map(|c| c.to_string()).collect()),
            confirm,
            diffs: RefCell::new(Vec::new()),
            notices: RefCell::new(Vec::new()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, _label: &str, options: &[String]) -> io::Result<String> {
        let choice = self
            .choices
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))?;
        assert!(options.contains(&choice), "{choice} not offered in {options:?}");
        Ok(choice)
    }

    fn confirm(&self, _label: &str) -> io::Result<bool> {
        Ok(self.confirm)
    }

    fn show_diff(&self, diff: &DiffResult) {
        self.diffs.borrow_mut().push(diff.render());
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

/// Secret value that, when the buffer holding it is run by `/bin/sh`,
/// records the buffer's path in `record` and replaces the buffer with
/// `replacement`.
///
/// This lets `/bin/sh` stand in for an interactive editor.
pub fn self_editing_value(record: &std::path::Path, replacement: &str) -> String {
    format!(
        "printf '%s' \"$0\" > '{}'; printf '%s' '{}' > \"$0\"",
        record.display(),
        replacement
    )
}

/// Secret value that records the buffer's path and leaves it unchanged.
pub fn recording_value(record: &std::path::Path) -> String {
    format!("printf '%s' \"$0\" > '{}'", record.display())
}
