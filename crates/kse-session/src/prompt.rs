//! User interaction seam.

use std::io;

use crate::diff::DiffResult;

/// Interactive collaborator used by an edit session.
///
/// All calls block until the user answers; there is no input timeout.
pub trait Prompter {
    /// Ask the user to pick exactly one of `options`.
    ///
    /// An error means the input mechanism failed and ends the session.
    fn select(&self, label: &str, options: &[String]) -> io::Result<String>;

    /// Ask a yes/no question.
    ///
    /// The session treats an error the same as "no".
    fn confirm(&self, label: &str) -> io::Result<bool>;

    /// Display the difference between the stored and edited value.
    fn show_diff(&self, diff: &DiffResult);

    /// Display a progress or status line.
    fn notify(&self, message: &str);
}
