//! Console prompt with a countdown.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::application::ports::{InputPrompt, PromptOutcome};

/// Reads one line from a buffered async reader, racing a timeout.
pub struct TerminalPrompt<R = BufReader<Stdin>> {
    reader: Mutex<R>,
}

impl TerminalPrompt {
    /// Prompt on the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> TerminalPrompt<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

impl<R: AsyncBufRead + Unpin> InputPrompt for TerminalPrompt<R> {
    async fn ask(&self, prompt: &str, timeout: Duration) -> Result<PromptOutcome> {
        {
            let mut out = std::io::stdout().lock();
            write!(out, "{prompt}").context("writing prompt")?;
            out.flush().context("flushing prompt")?;
        }

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        let outcome = tokio::select! {
            read = reader.read_line(&mut line) => {
                match read.context("reading console input")? {
                    0 => PromptOutcome::Closed,
                    _ => PromptOutcome::Answered(line.trim().to_string()),
                }
            }
            () = tokio::time::sleep(timeout) => PromptOutcome::TimedOut,
        };
        if outcome == PromptOutcome::TimedOut {
            // The cursor is still on the prompt line.
            let mut out = std::io::stdout().lock();
            writeln!(out).context("writing newline")?;
        }
        Ok(outcome)
    }
}
