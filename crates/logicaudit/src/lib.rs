//! `logicaudit` - code review flashcards for the terminal
//!
//! This library walks a fixed deck of flawed code snippets. Each card is shown
//! first as a problem; on request, after a short simulated analysis, its
//! critique, corrected code and reasoning are revealed.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod navigator;
pub mod presenter;
pub mod report;
pub mod scenario;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use input::{CommandSource, ScriptedSource, StdinSource, UserCommand};
pub use logging::init_logging;
pub use navigator::{AuditPhase, Navigator, NavigatorState, RevealTicket, REVEAL_DELAY};
pub use presenter::{JsonPresenter, Presenter, Progress, TerminalPresenter};
pub use scenario::{Dataset, ScenarioRecord};
pub use session::{EndReason, Session, SessionOptions, SessionSummary};
