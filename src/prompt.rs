use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Asks the user to confirm a step.
pub trait Prompter {
    /// Ask `question`; an empty answer means `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Answers yes to everything. Used with `--silent`.
pub struct AutoConfirm;

impl Prompter for AutoConfirm {
    fn confirm(&mut self, _question: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }
}

/// Prompts on a writer and reads one answer line per question.
///
/// - `y` / `Y` confirms.
/// - An empty line takes the default.
/// - Anything else, or end of input, declines.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        let n = self
            .input
            .read_line(&mut answer)
            .context("failed to read answer")?;
        if n == 0 {
            return Ok(false);
        }
        Ok(match answer.trim() {
            "" => default,
            "y" | "Y" => true,
            _ => false,
        })
    }
}
