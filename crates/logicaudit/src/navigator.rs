//! Scenario navigation and reveal sequencing.
//!
//! The [`Navigator`] owns the cursor into the deck and the audit state of the
//! current card:
//!
//! ```text
//!   load/advance ──► Idle ──run_audit──► Analyzing ──(REVEAL_DELAY)──► Revealed
//!                     ▲                                                   │
//!                     └───────────────────── advance ─────────────────────┘
//! ```
//!
//! The delay runs on a spawned task which, when it fires, sends a
//! [`RevealTicket`] back over a channel. The owner of the navigator feeds that
//! ticket to [`Navigator::complete_audit`], which applies it only if no
//! `load_scenario` happened in between. Every load bumps a generation
//! counter, so a ticket minted for an earlier card is discarded on arrival.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::presenter::{Presenter, Progress};
use crate::scenario::{Dataset, ScenarioRecord};

/// Simulated analysis latency between an audit request and its result.
pub const REVEAL_DELAY: Duration = Duration::from_millis(600);

/// Where the current scenario is in its audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    /// Problem shown, audit not requested.
    Idle,
    /// Audit requested, result not yet shown.
    Analyzing,
    /// Result shown. Only `advance` leaves this phase.
    Revealed,
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Revealed => write!(f, "revealed"),
        }
    }
}

/// Mutable navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigatorState {
    /// Index of the scenario currently shown.
    pub cursor: usize,
    /// Whether the current scenario's audit result is visible.
    pub revealed: bool,
    /// Whether an audit is in flight.
    pub pending: bool,
}

impl NavigatorState {
    /// Collapse the flags into a phase.
    #[must_use]
    pub fn phase(&self) -> AuditPhase {
        if self.pending {
            AuditPhase::Analyzing
        } else if self.revealed {
            AuditPhase::Revealed
        } else {
            AuditPhase::Idle
        }
    }
}

/// Proof that an audit's delay has elapsed.
///
/// Only meaningful to the navigator that issued it, and only until its next
/// `load_scenario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTicket {
    generation: u64,
    cursor: usize,
}

impl RevealTicket {
    /// The cursor the audit was requested for.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Owns the cursor and mediates every transition.
#[derive(Debug)]
pub struct Navigator<P: Presenter> {
    dataset: Dataset,
    presenter: P,
    state: NavigatorState,
    generation: u64,
    reveal_tx: mpsc::UnboundedSender<RevealTicket>,
    revealed_count: usize,
    cycles_completed: usize,
}

impl<P: Presenter> Navigator<P> {
    /// Create a navigator on the first scenario.
    ///
    /// Returns the receiving end of the reveal channel; tickets arriving on it
    /// must be passed to [`Navigator::complete_audit`].
    pub fn new(dataset: Dataset, presenter: P) -> (Self, mpsc::UnboundedReceiver<RevealTicket>) {
        let (reveal_tx, reveal_rx) = mpsc::unbounded_channel();
        let mut navigator = Self {
            dataset,
            presenter,
            state: NavigatorState::default(),
            generation: 0,
            reveal_tx,
            revealed_count: 0,
            cycles_completed: 0,
        };
        navigator.load_scenario(0);
        (navigator, reveal_rx)
    }

    /// Show scenario `index` in the `Idle` phase.
    ///
    /// Any audit still in flight for the previous card is superseded.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the deck.
    pub fn load_scenario(&mut self, index: usize) {
        assert!(
            index < self.dataset.len(),
            "load_scenario({index}) out of range for deck of {}",
            self.dataset.len()
        );

        if self.state.pending {
            debug!(
                cursor = self.state.cursor,
                "superseding audit in flight"
            );
        }

        self.generation = self.generation.wrapping_add(1);
        self.state = NavigatorState {
            cursor: index,
            revealed: false,
            pending: false,
        };
        debug!(cursor = index, generation = self.generation, "loaded scenario");

        let progress = self.progress();
        self.presenter
            .show_problem(progress, self.dataset.get(index));
    }

    /// Request the audit of the current scenario.
    ///
    /// Moves to `Analyzing` and schedules the reveal after [`REVEAL_DELAY`].
    /// Returns `false` without side effects unless the phase is `Idle`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn run_audit(&mut self) -> bool {
        let phase = self.phase();
        if phase != AuditPhase::Idle {
            debug!(cursor = self.state.cursor, %phase, "audit ignored");
            return false;
        }

        self.state.pending = true;
        self.presenter.show_analyzing();

        let ticket = RevealTicket {
            generation: self.generation,
            cursor: self.state.cursor,
        };
        let deadline = tokio::time::Instant::now() + REVEAL_DELAY;
        let tx = self.reveal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // A closed channel means the session is gone; nothing to reveal to
            let _ = tx.send(ticket);
        });

        debug!(cursor = ticket.cursor, "audit scheduled");
        true
    }

    /// Apply a reveal whose delay has elapsed.
    ///
    /// Returns `true` if the result was shown. Tickets from before the latest
    /// `load_scenario`, or arriving outside `Analyzing`, are discarded.
    pub fn complete_audit(&mut self, ticket: RevealTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket_cursor = ticket.cursor,
                cursor = self.state.cursor,
                "discarding stale reveal"
            );
            return false;
        }
        if !self.state.pending {
            debug!(cursor = self.state.cursor, "no audit in flight; reveal dropped");
            return false;
        }

        self.state.pending = false;
        self.state.revealed = true;
        self.revealed_count += 1;
        debug!(cursor = self.state.cursor, "audit revealed");

        let progress = self.progress();
        self.presenter
            .show_result(progress, self.dataset.get(self.state.cursor));
        true
    }

    /// Move to the next scenario, wrapping to the first after the last.
    ///
    /// The wrap is preceded by a cycle-complete notification.
    pub fn advance(&mut self) {
        let last = self.dataset.len() - 1;
        if self.state.cursor == last {
            self.cycles_completed += 1;
            info!(cycles = self.cycles_completed, "deck complete; wrapping");
            self.presenter.notify_cycle_complete();
            self.load_scenario(0);
        } else {
            self.load_scenario(self.state.cursor + 1);
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NavigatorState {
        self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AuditPhase {
        self.state.phase()
    }

    /// The scenario under the cursor.
    #[must_use]
    pub fn current(&self) -> &ScenarioRecord {
        self.dataset.get(self.state.cursor)
    }

    /// Cursor position and deck length.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            index: self.state.cursor,
            total: self.dataset.len(),
        }
    }

    /// The deck being walked.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The presenter receiving notifications.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The presenter, for output outside the navigator's own transitions.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Number of audits revealed so far.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Number of wraps from the last scenario back to the first.
    #[must_use]
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{RecordingPresenter, Shown};
    use crate::scenario::sample;

    fn small_deck(n: u32) -> Dataset {
        Dataset::new((1..=n).map(sample).collect()).unwrap()
    }

    fn navigator(n: u32) -> (Navigator<RecordingPresenter>, mpsc::UnboundedReceiver<RevealTicket>) {
        Navigator::new(small_deck(n), RecordingPresenter::default())
    }

    fn results(nav: &Navigator<RecordingPresenter>) -> usize {
        nav.presenter()
            .count(|s| matches!(s, Shown::Result(..)))
    }

    fn analyzing(nav: &Navigator<RecordingPresenter>) -> usize {
        nav.presenter().count(|s| matches!(s, Shown::Analyzing))
    }

    fn cycles(nav: &Navigator<RecordingPresenter>) -> usize {
        nav.presenter().count(|s| matches!(s, Shown::CycleComplete))
    }

    #[test]
    fn test_new_shows_first_problem() {
        let (nav, _rx) = navigator(3);

        assert_eq!(nav.state(), NavigatorState::default());
        assert_eq!(nav.phase(), AuditPhase::Idle);
        assert_eq!(nav.current(), &sample(1));
        assert_eq!(nav.progress(), Progress { index: 0, total: 3 });
        assert_eq!(nav.presenter().shown, vec![Shown::Problem(0, sample(1))]);
    }

    #[test]
    fn test_load_scenario_shows_problem_never_result() {
        let (mut nav, _rx) = navigator(5);

        for i in 0..5 {
            nav.load_scenario(i);
            assert_eq!(
                nav.presenter().shown.last(),
                Some(&Shown::Problem(i, nav.dataset().get(i).clone()))
            );
            assert_eq!(nav.state().cursor, i);
            assert_eq!(nav.phase(), AuditPhase::Idle);
        }
        assert_eq!(results(&nav), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_load_scenario_out_of_range_panics() {
        let (mut nav, _rx) = navigator(3);
        nav.load_scenario(3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_audit_reveals_after_delay() {
        let (mut nav, mut rx) = navigator(3);
        let start = tokio::time::Instant::now();

        assert!(nav.run_audit());
        assert_eq!(nav.phase(), AuditPhase::Analyzing);
        assert_eq!(nav.presenter().shown.last(), Some(&Shown::Analyzing));

        let ticket = rx.recv().await.unwrap();
        assert!(start.elapsed() >= REVEAL_DELAY);
        assert_eq!(ticket.cursor(), 0);

        assert!(nav.complete_audit(ticket));
        assert_eq!(nav.phase(), AuditPhase::Revealed);
        assert_eq!(
            nav.presenter().shown.last(),
            Some(&Shown::Result(0, sample(1)))
        );
        assert_eq!(nav.revealed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_not_sent_before_delay() {
        let (mut nav, mut rx) = navigator(3);
        nav.run_audit();

        tokio::time::advance(REVEAL_DELAY - Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        assert!(rx.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_audit_is_not_reentrant() {
        let (mut nav, mut rx) = navigator(3);

        assert!(nav.run_audit());
        assert!(!nav.run_audit());
        assert!(!nav.run_audit());
        assert_eq!(analyzing(&nav), 1);

        let ticket = rx.recv().await.unwrap();
        assert!(nav.complete_audit(ticket));

        // Revealed is terminal until advance
        assert!(!nav.run_audit());
        assert_eq!(analyzing(&nav), 1);
        assert_eq!(results(&nav), 1);

        tokio::time::sleep(REVEAL_DELAY * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_ticket_applies_once() {
        let (mut nav, mut rx) = navigator(2);
        nav.run_audit();
        let ticket = rx.recv().await.unwrap();

        assert!(nav.complete_audit(ticket));
        assert!(!nav.complete_audit(ticket));
        assert_eq!(results(&nav), 1);
    }

    #[test]
    fn test_advance_through_deck_without_cycle() {
        let (mut nav, _rx) = navigator(4);

        for _ in 0..3 {
            nav.advance();
        }
        assert_eq!(nav.state().cursor, 3);
        assert_eq!(cycles(&nav), 0);
        assert_eq!(nav.cycles_completed(), 0);
    }

    #[test]
    fn test_advance_from_last_wraps_with_notification() {
        let (mut nav, _rx) = navigator(4);
        nav.load_scenario(3);

        nav.advance();

        assert_eq!(nav.state().cursor, 0);
        assert_eq!(nav.phase(), AuditPhase::Idle);
        assert_eq!(cycles(&nav), 1);
        assert_eq!(nav.cycles_completed(), 1);

        let tail = &nav.presenter().shown[nav.presenter().shown.len() - 2..];
        assert_eq!(tail, &[Shown::CycleComplete, Shown::Problem(0, sample(1))]);
    }

    #[test]
    fn test_single_card_deck_wraps_every_advance() {
        let (mut nav, _rx) = navigator(1);
        nav.advance();
        nav.advance();
        assert_eq!(nav.state().cursor, 0);
        assert_eq!(cycles(&nav), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_reveal_discarded_after_load() {
        let (mut nav, mut rx) = navigator(5);
        nav.run_audit();

        nav.load_scenario(3);
        let stale = rx.recv().await.unwrap();

        assert!(!nav.complete_audit(stale));
        assert_eq!(nav.phase(), AuditPhase::Idle);
        assert_eq!(results(&nav), 0);
        assert_eq!(
            nav.presenter().shown.last(),
            Some(&Shown::Problem(3, sample(4)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_reveal_does_not_hijack_new_audit() {
        let (mut nav, mut rx) = navigator(5);
        nav.run_audit();

        // Same card reloaded, then audited again before the first reveal lands
        tokio::time::advance(Duration::from_millis(300)).await;
        nav.load_scenario(0);
        assert!(nav.run_audit());

        let first = rx.recv().await.unwrap();
        assert!(!nav.complete_audit(first));
        assert_eq!(nav.phase(), AuditPhase::Analyzing);

        let second = rx.recv().await.unwrap();
        assert!(nav.complete_audit(second));
        assert_eq!(results(&nav), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_mid_audit_supersedes() {
        let (mut nav, mut rx) = navigator(3);
        nav.run_audit();
        nav.advance();

        let stale = rx.recv().await.unwrap();
        assert_eq!(stale.cursor(), 0);
        assert!(!nav.complete_audit(stale));
        assert_eq!(nav.state().cursor, 1);
        assert_eq!(
            nav.presenter().shown.last(),
            Some(&Shown::Problem(1, sample(2)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_builtin_first_card_audit() {
        let deck = Dataset::builtin().unwrap();
        let (mut nav, mut rx) = Navigator::new(deck, RecordingPresenter::default());

        match nav.presenter().shown.first() {
            Some(Shown::Problem(0, record)) => {
                assert_eq!(record.category, "Time Complexity");
                assert!(record.prompt.contains("two numbers"));
            }
            other => panic!("unexpected first notification: {other:?}"),
        }

        nav.run_audit();
        let ticket = rx.recv().await.unwrap();
        nav.complete_audit(ticket);

        match nav.presenter().shown.last() {
            Some(Shown::Result(0, record)) => assert!(record.critique.contains("O(n²)")),
            other => panic!("unexpected last notification: {other:?}"),
        }
    }

    #[test]
    fn test_phase_from_flags() {
        let mut state = NavigatorState::default();
        assert_eq!(state.phase(), AuditPhase::Idle);
        state.pending = true;
        assert_eq!(state.phase(), AuditPhase::Analyzing);
        state.pending = false;
        state.revealed = true;
        assert_eq!(state.phase(), AuditPhase::Revealed);
    }

    #[test]
    fn test_audit_phase_display() {
        assert_eq!(AuditPhase::Idle.to_string(), "idle");
        assert_eq!(AuditPhase::Analyzing.to_string(), "analyzing");
        assert_eq!(AuditPhase::Revealed.to_string(), "revealed");
    }
}
