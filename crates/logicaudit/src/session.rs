//! The interactive loop.
//!
//! A [`Session`] is the single control task: it owns the [`Navigator`], waits
//! on user commands and pending reveals, and applies both in arrival order.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::input::{CommandSource, UserCommand};
use crate::navigator::{AuditPhase, Navigator, RevealTicket};
use crate::presenter::Presenter;
use crate::scenario::Dataset;

const ALREADY_AUDITED: &str = "This scenario has already been audited; type 'next' to continue.";
const AUDIT_FIRST: &str = "Run the audit before moving on (or set session.allow_skip).";

/// Knobs for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Accept `next` before the current card has been audited.
    pub allow_skip: bool,
}

impl From<&crate::config::SessionConfig> for SessionOptions {
    fn from(config: &crate::config::SessionConfig) -> Self {
        Self {
            allow_skip: config.allow_skip,
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The user asked to quit.
    Quit,
    /// The command source ran dry (EOF on stdin, end of script).
    InputClosed,
    /// The shutdown future resolved (Ctrl-C).
    Interrupted,
}

/// What happened during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended.
    pub finished_at: DateTime<Utc>,
    /// Audits whose result was shown.
    pub scenarios_revealed: usize,
    /// Wraps from the last card back to the first.
    pub cycles_completed: usize,
    /// Cursor when the session ended.
    pub final_cursor: usize,
    /// Why the session ended.
    pub end_reason: EndReason,
}

/// Drives a navigator from a command source.
#[derive(Debug)]
pub struct Session<P: Presenter, S: CommandSource> {
    navigator: Navigator<P>,
    reveals: mpsc::UnboundedReceiver<RevealTicket>,
    source: S,
    options: SessionOptions,
}

impl<P: Presenter, S: CommandSource> Session<P, S> {
    /// Create a session; the first scenario is shown immediately.
    pub fn new(dataset: Dataset, presenter: P, source: S, options: SessionOptions) -> Self {
        let (navigator, reveals) = Navigator::new(dataset, presenter);
        Self {
            navigator,
            reveals,
            source,
            options,
        }
    }

    /// The navigator being driven.
    #[must_use]
    pub fn navigator(&self) -> &Navigator<P> {
        &self.navigator
    }

    /// Run until the user quits, input ends, or Ctrl-C.
    pub async fn run(&mut self) -> SessionSummary {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the user quits, input ends, or `shutdown` resolves.
    ///
    /// Commands are not read while an audit is in flight, matching a
    /// disabled audit control; they are picked up once the result is shown.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> SessionSummary {
        let started_at = Utc::now();
        tokio::pin!(shutdown);

        let end_reason = loop {
            let analyzing = self.navigator.phase() == AuditPhase::Analyzing;
            tokio::select! {
                Some(ticket) = self.reveals.recv() => {
                    self.navigator.complete_audit(ticket);
                }
                command = self.source.next_command(), if !analyzing => {
                    match command {
                        None => break EndReason::InputClosed,
                        Some(UserCommand::Quit) => break EndReason::Quit,
                        Some(command) => self.handle(command),
                    }
                }
                () = &mut shutdown => break EndReason::Interrupted,
            }
        };

        let state = self.navigator.state();
        info!(
            reason = ?end_reason,
            revealed = self.navigator.revealed_count(),
            cycles = self.navigator.cycles_completed(),
            "session ended"
        );
        SessionSummary {
            started_at,
            finished_at: Utc::now(),
            scenarios_revealed: self.navigator.revealed_count(),
            cycles_completed: self.navigator.cycles_completed(),
            final_cursor: state.cursor,
            end_reason,
        }
    }

    fn handle(&mut self, command: UserCommand) {
        debug!(%command, phase = %self.navigator.phase(), "handling command");
        match command {
            UserCommand::Audit => {
                if !self.navigator.run_audit() {
                    self.notice(ALREADY_AUDITED);
                }
            }
            UserCommand::Next => {
                if self.navigator.phase() == AuditPhase::Revealed || self.options.allow_skip {
                    self.navigator.advance();
                } else {
                    self.notice(AUDIT_FIRST);
                }
            }
            UserCommand::Quit => {}
        }
    }

    fn notice(&mut self, message: &str) {
        debug!(message, "command ignored");
        self.navigator.presenter_mut().show_notice(message);
    }
}
