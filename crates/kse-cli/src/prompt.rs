//! Line-oriented terminal prompts.
//!
//! Prompts and lists are written to stderr so stdout carries only the
//! final result line.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use console::style;
use kse_session::{DiffResult, Prompter};

use crate::render;

/// Prompter reading answers line by line.
pub struct TerminalPrompter {
    input: RefCell<Box<dyn BufRead>>,
    output: RefCell<Box<dyn Write>>,
}

impl TerminalPrompter {
    /// Prompter on the process's stdin and stderr.
    pub fn new() -> Self {
        Self::with_io(io::BufReader::new(io::stdin()), io::stderr())
    }

    pub fn with_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: RefCell::new(Box::new(input)),
            output: RefCell::new(Box::new(output)),
        }
    }

    fn ask(&self, prompt: &str) -> io::Result<String> {
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn say(&self, line: impl std::fmt::Display) {
        // Nothing sensible to do if stderr is gone.
        let _ = writeln!(self.output.borrow_mut(), "{line}");
    }

    fn list(&self, options: &[String]) {
        for (i, option) in options.iter().enumerate() {
            self.say(format_args!(
                "  {} {}",
                style(format!("[{}]", i + 1)).cyan().for_stderr(),
                option
            ));
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

/// How a typed answer relates to the option list.
#[derive(Debug, PartialEq, Eq)]
enum Choice<'a> {
    One(&'a str),
    Ambiguous(Vec<&'a String>),
    NoMatch,
}

/// Interpret an answer as a 1-based index, an exact name, or a unique
/// case-insensitive prefix.
fn match_choice<'a>(answer: &str, options: &'a [String]) -> Choice<'a> {
    if let Ok(n) = answer.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Choice::One(&options[n - 1]);
        }
    }
    if let Some(exact) = options.iter().find(|o| o.as_str() == answer) {
        return Choice::One(exact);
    }

    let needle = answer.to_lowercase();
    let matches: Vec<&String> = options
        .iter()
        .filter(|o| o.to_lowercase().starts_with(&needle))
        .collect();
    match matches.len() {
        0 => Choice::NoMatch,
        1 => Choice::One(matches[0]),
        _ => Choice::Ambiguous(matches),
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, label: &str, options: &[String]) -> io::Result<String> {
        self.say(style(label).bold().for_stderr());
        self.list(options);

        loop {
            let answer = self.ask(&format!("{} ", style(">").cyan().for_stderr()))?;
            if answer.is_empty() {
                continue;
            }
            match match_choice(&answer, options) {
                Choice::One(choice) => return Ok(choice.to_string()),
                Choice::Ambiguous(matches) => {
                    self.say(format_args!("'{answer}' matches several entries:"));
                    for m in matches {
                        self.say(format_args!("  {m}"));
                    }
                }
                Choice::NoMatch => {
                    self.say(style(format!("No entry matches '{answer}'.")).yellow().for_stderr());
                }
            }
        }
    }

    fn confirm(&self, label: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} [y/N]: ", style(label).bold().for_stderr()))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn show_diff(&self, diff: &DiffResult) {
        self.say("");
        self.say(render::render_diff(diff));
        self.say("");
    }

    fn notify(&self, message: &str) {
        self.say(render::render_status(message));
    }
}
