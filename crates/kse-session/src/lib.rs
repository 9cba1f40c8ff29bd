//! Edit session workflow for k8s-secret-editor.
//!
//! Chains the pieces of one edit: pick a secret key, materialize its value
//! in a private scratch file, hand that file to an external editor, diff
//! the result, and write it back after explicit confirmation.

pub mod buffer;
pub mod diff;
pub mod editor;
pub mod prompt;
pub mod session;

pub use buffer::TransientBuffer;
pub use diff::{DiffOp, DiffResult, DiffSpan};
pub use editor::{Editor, ExternalEditor};
pub use prompt::Prompter;
pub use session::{EditSession, SessionOutcome, SessionRunner};
