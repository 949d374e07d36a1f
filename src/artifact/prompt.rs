//! Interactive questions asked after a build.
//!
//! The finalizer only talks to a [`Prompter`], so it runs the same against a
//! terminal, in CI, or under test with canned answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Ask a question and return the trimmed answer. Empty means "skip".
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Reads answers from stdin.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", question)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

/// Answers every question with an empty string.
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        log::debug!("non-interactive, skipping: {}", question);
        Ok(String::new())
    }
}

/// Replays fixed answers in order, then answers empty. Records the questions.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .map(|a| a.trim().to_string())
            .unwrap_or_default())
    }
}

/// Pick a prompter: none when disabled or when stdin isn't a terminal.
pub fn for_session(non_interactive: bool) -> Box<dyn Prompter> {
    use std::io::IsTerminal;

    if non_interactive || !io::stdin().is_terminal() {
        Box::new(NoPrompt)
    } else {
        Box::new(TerminalPrompter)
    }
}
