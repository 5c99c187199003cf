//! User commands and where they come from.

use std::collections::VecDeque;
use std::io::BufRead;
use std::str::FromStr;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::error::{Error, Result};

/// An action the user can take on the current scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Run the audit for the current scenario.
    Audit,
    /// Move to the next scenario, wrapping after the last.
    Next,
    /// End the session.
    Quit,
}

impl FromStr for UserCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        match input.to_ascii_lowercase().as_str() {
            "a" | "audit" | "run" => Ok(Self::Audit),
            "n" | "next" => Ok(Self::Next),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            _ => Err(Error::unknown_command(input)),
        }
    }
}

impl std::fmt::Display for UserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audit => write!(f, "audit"),
            Self::Next => write!(f, "next"),
            Self::Quit => write!(f, "quit"),
        }
    }
}

/// A source of user commands.
///
/// `None` means the source is exhausted and the session should end.
#[async_trait::async_trait]
pub trait CommandSource: Send {
    /// Wait for the next command.
    async fn next_command(&mut self) -> Option<UserCommand>;
}

#[async_trait::async_trait]
impl<S: CommandSource + ?Sized> CommandSource for Box<S> {
    async fn next_command(&mut self) -> Option<UserCommand> {
        (**self).next_command().await
    }
}

/// Commands typed on stdin, one per line.
///
/// Lines are read on a dedicated thread so a read still blocked when the
/// session ends does not hold up runtime shutdown.
#[derive(Debug)]
pub struct StdinSource {
    lines: mpsc::UnboundedReceiver<String>,
}

impl StdinSource {
    /// Start reading commands from the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn spawn() -> Result<Self> {
        let (tx, lines) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to read stdin");
                            break;
                        }
                    }
                }
            })?;
        Ok(Self::from_lines(lines))
    }

    /// Read commands from lines already being fed into `lines`.
    pub(crate) fn from_lines(lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self { lines }
    }
}

#[async_trait::async_trait]
impl CommandSource for StdinSource {
    async fn next_command(&mut self) -> Option<UserCommand> {
        loop {
            let line = self.lines.recv().await?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse() {
                Ok(command) => {
                    trace!(%command, "read command");
                    return Some(command);
                }
                Err(e) => warn!("{e}"),
            }
        }
    }
}

/// A fixed queue of commands.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    commands: VecDeque<UserCommand>,
}

impl ScriptedSource {
    /// Replay `commands` in order.
    #[must_use]
    pub fn new(commands: impl IntoIterator<Item = UserCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// Audit and advance through `scenarios` cards, then quit.
    ///
    /// With `scenarios` equal to the deck length this walks one full cycle,
    /// ending back on the first card.
    #[must_use]
    pub fn tour(scenarios: usize) -> Self {
        let steps = (0..scenarios).flat_map(|_| [UserCommand::Audit, UserCommand::Next]);
        Self::new(steps.chain(std::iter::once(UserCommand::Quit)))
    }

    /// Commands not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

#[async_trait::async_trait]
impl CommandSource for ScriptedSource {
    async fn next_command(&mut self) -> Option<UserCommand> {
        self.commands.pop_front()
    }
}
