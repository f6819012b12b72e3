//! Line-based operator prompts.
//!
//! Every yes/no question defaults to yes: only `n` / `no` (any case) is a
//! negative answer. `None` from a prompt means standard input is closed.

use console::{style, Term};
use std::collections::VecDeque;
use std::io::{self, BufRead};

/// True for the only answers that decline a default-yes prompt.
pub fn is_negative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}

pub trait Prompter {
    /// Show `prompt` and read one line, without the trailing newline.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Yes/no question where empty input means yes.
    fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        Ok(self
            .ask(&format!("{} (Y/n): ", prompt))?
            .map(|answer| !is_negative(&answer)))
    }
}

/// Prompts on the terminal, answers from stdin.
pub struct ConsolePrompter {
    term: Term,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.term.write_str(&style(prompt).bold().to_string())?;
        self.term.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays canned answers; reports end of input once they run out.
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

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
