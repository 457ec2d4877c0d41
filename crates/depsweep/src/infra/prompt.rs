//! Reading the user's answer to the removal prompt.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

/// Source of one line of user input.
pub trait Prompt {
    /// Ask `question` and return the answer, or `None` if the user aborted or input ended.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// Interactive prompt: a line editor on a terminal, a plain stdin line otherwise.
#[derive(Debug, Default)]
pub struct LinePrompt;

impl Prompt for LinePrompt {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        if io::stdin().is_terminal() {
            read_with_editor(question)
        } else {
            println!("{question}");
            read_plain_line(io::stdin().lock())
        }
    }
}

fn read_with_editor(question: &str) -> Result<Option<String>> {
    println!("{question}");
    let mut editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("remove".into()),
        DefaultPromptSegment::Empty,
    );
    match editor.read_line(&prompt).context("failed to read from terminal")? {
        Signal::Success(line) => Ok(Some(line)),
        _ => Ok(None),
    }
}

fn read_plain_line(mut reader: impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// Pre-supplied answer, used for `--select` and tests.
#[derive(Debug, Clone)]
pub struct FixedAnswer(Option<String>);

impl FixedAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self(Some(answer.into()))
    }

    /// Behaves like a closed stdin.
    pub fn none() -> Self {
        Self(None)
    }
}

impl Prompt for FixedAnswer {
    fn ask(&mut self, _question: &str) -> Result<Option<String>> {
        Ok(self.0.take())
    }
}
