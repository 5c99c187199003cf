//! Presentation sinks driven by the navigator.
//!
//! A [`Presenter`] turns navigator notifications into something the user can
//! see. It owns no state the navigator depends on, and nothing it returns is
//! consumed: a presenter that fails to write logs the failure and moves on.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::scenario::ScenarioRecord;

/// Position of the current scenario within the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based cursor.
    pub index: usize,
    /// Deck length.
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.index + 1, self.total)
    }
}

/// The four notifications a navigator emits.
///
/// Calls arrive in the order the navigator performs its transitions, always
/// from the session's single control task.
pub trait Presenter: fmt::Debug {
    /// Show the task and flawed code; hide any previous result.
    fn show_problem(&mut self, progress: Progress, record: &ScenarioRecord);

    /// Show the in-progress indicator; the audit control is now disabled.
    fn show_analyzing(&mut self);

    /// Show the critique, corrected code and reasoning, plus the
    /// navigation controls.
    fn show_result(&mut self, progress: Progress, record: &ScenarioRecord);

    /// One-shot acknowledgement that the whole deck has been walked, sent
    /// right before the wrap back to the first scenario.
    fn notify_cycle_complete(&mut self);

    /// Tell the user a command had no effect, and why.
    fn show_notice(&mut self, message: &str);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show_problem(&mut self, progress: Progress, record: &ScenarioRecord) {
        (**self).show_problem(progress, record);
    }

    fn show_analyzing(&mut self) {
        (**self).show_analyzing();
    }

    fn show_result(&mut self, progress: Progress, record: &ScenarioRecord) {
        (**self).show_result(progress, record);
    }

    fn notify_cycle_complete(&mut self) {
        (**self).notify_cycle_complete();
    }

    fn show_notice(&mut self, message: &str) {
        (**self).show_notice(message);
    }
}

/// Message shown before the wrap to the first scenario.
pub const CYCLE_COMPLETE_MESSAGE: &str =
    "Simulation complete! You have audited all scenarios.";

/// Plain-text panels for a terminal.
#[derive(Debug)]
pub struct TerminalPresenter<W: Write> {
    out: W,
    rule_width: usize,
}

impl<W: Write> TerminalPresenter<W> {
    /// Create a presenter writing to `out` with rules `rule_width` wide.
    #[must_use]
    pub fn new(out: W, rule_width: usize) -> Self {
        Self { out, rule_width }
    }

    /// Consume the presenter and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&self, ch: char) -> String {
        ch.to_string().repeat(self.rule_width)
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write panel");
        }
    }
}

/// Indent every line of a snippet so it stands apart from prose.
fn indent_code(code: &str) -> String {
    code.lines()
        .map(|line| format!("    {line}\n"))
        .collect()
}

impl<W: Write + fmt::Debug> Presenter for TerminalPresenter<W> {
    fn show_problem(&mut self, progress: Progress, record: &ScenarioRecord) {
        let heavy = self.rule('=');
        let text = format!(
            "\n{heavy}\n [{progress}]  {category}\n{heavy}\n\
             Task: {prompt}\n\n\
             Flawed code:\n{code}\n\
             Waiting for audit...   [a]udit  [q]uit\n",
            category = record.category,
            prompt = record.prompt,
            code = indent_code(&record.bad_code),
        );
        self.emit(&text);
    }

    fn show_analyzing(&mut self) {
        self.emit("Analyzing...\n");
    }

    fn show_result(&mut self, _progress: Progress, record: &ScenarioRecord) {
        let light = self.rule('-');
        let text = format!(
            "{light}\n\
             Critique:\n  {critique}\n\n\
             Corrected code:\n{code}\n\
             Reasoning:\n  {reasoning}\n\
             {light}\n\
             Audit complete ✓   [n]ext  [q]uit\n",
            critique = record.critique,
            code = indent_code(&record.good_code),
            reasoning = record.reasoning,
        );
        self.emit(&text);
    }

    fn notify_cycle_complete(&mut self) {
        let text = format!("\n*** {CYCLE_COMPLETE_MESSAGE} ***\n");
        self.emit(&text);
    }

    fn show_notice(&mut self, message: &str) {
        self.emit(&format!("! {message}\n"));
    }
}

/// A notification as written by [`JsonPresenter`].
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum PanelEvent<'a> {
    Problem {
        index: usize,
        total: usize,
        id: u32,
        category: &'a str,
        prompt: &'a str,
        bad_code: &'a str,
    },
    Analyzing,
    Result {
        index: usize,
        total: usize,
        id: u32,
        critique: &'a str,
        good_code: &'a str,
        reasoning: &'a str,
    },
    CycleComplete {
        message: &'a str,
    },
    Notice {
        message: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: PanelEvent<'a>,
}

/// Newline-delimited JSON, one object per notification.
#[derive(Debug)]
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    /// Create a presenter writing JSON lines to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Borrow the writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the presenter and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: PanelEvent<'_>) {
        let envelope = Envelope {
            timestamp: Utc::now(),
            event,
        };
        let result = serde_json::to_writer(&mut self.out, &envelope)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write panel event");
        }
    }
}

impl<W: Write + fmt::Debug> Presenter for JsonPresenter<W> {
    fn show_problem(&mut self, progress: Progress, record: &ScenarioRecord) {
        self.emit(PanelEvent::Problem {
            index: progress.index,
            total: progress.total,
            id: record.id,
            category: &record.category,
            prompt: &record.prompt,
            bad_code: &record.bad_code,
        });
    }

    fn show_analyzing(&mut self) {
        self.emit(PanelEvent::Analyzing);
    }

    fn show_result(&mut self, progress: Progress, record: &ScenarioRecord) {
        self.emit(PanelEvent::Result {
            index: progress.index,
            total: progress.total,
            id: record.id,
            critique: &record.critique,
            good_code: &record.good_code,
            reasoning: &record.reasoning,
        });
    }

    fn notify_cycle_complete(&mut self) {
        self.emit(PanelEvent::CycleComplete {
            message: CYCLE_COMPLETE_MESSAGE,
        });
    }

    fn show_notice(&mut self, message: &str) {
        self.emit(PanelEvent::Notice { message });
    }
}

/// What a [`RecordingPresenter`] saw.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shown {
    Problem(usize, ScenarioRecord),
    Analyzing,
    Result(usize, ScenarioRecord),
    CycleComplete,
    Notice(String),
}

/// Captures the notification sequence for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub(crate) shown: Vec<Shown>,
}

#[cfg(test)]
impl RecordingPresenter {
    pub(crate) fn count(&self, pred: impl Fn(&Shown) -> bool) -> usize {
        self.shown.iter().filter(|s| pred(s)).count()
    }
}

#[cfg(test)]
impl Presenter for RecordingPresenter {
    fn show_problem(&mut self, progress: Progress, record: &ScenarioRecord) {
        self.shown.push(Shown::Problem(progress.index, record.clone()));
    }

    fn show_analyzing(&mut self) {
        self.shown.push(Shown::Analyzing);
    }

    fn show_result(&mut self, progress: Progress, record: &ScenarioRecord) {
        self.shown.push(Shown::Result(progress.index, record.clone()));
    }

    fn notify_cycle_complete(&mut self) {
        self.shown.push(Shown::CycleComplete);
    }

    fn show_notice(&mut self, message: &str) {
        self.shown.push(Shown::Notice(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::sample;

    fn progress(index: usize) -> Progress {
        Progress { index, total: 20 }
    }

    fn terminal_output(f: impl FnOnce(&mut TerminalPresenter<Vec<u8>>)) -> String {
        let mut presenter = TerminalPresenter::new(Vec::new(), 30);
        f(&mut presenter);
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_progress_display_is_one_based() {
        assert_eq!(progress(0).to_string(), "1 / 20");
        assert_eq!(progress(19).to_string(), "20 / 20");
    }

    #[test]
    fn test_terminal_problem_panel() {
        let record = sample(3);
        let out = terminal_output(|p| p.show_problem(progress(2), &record));

        assert!(out.contains("[3 / 20]"));
        assert!(out.contains("Category 3"));
        assert!(out.contains("Task: Prompt 3"));
        assert!(out.contains("    bad(3)\n"));
        assert!(out.contains("Waiting for audit..."));
        assert!(!out.contains("Critique 3"));
        assert!(out.contains(&"=".repeat(30)));
    }

    #[test]
    fn test_terminal_result_panel() {
        let record = sample(4);
        let out = terminal_output(|p| p.show_result(progress(3), &record));

        assert!(out.contains("Critique 4"));
        assert!(out.contains("    good(4)\n"));
        assert!(out.contains("Reasoning 4"));
        assert!(out.contains("Audit complete"));
        assert!(!out.contains("bad(4)"));
    }

    #[test]
    fn test_terminal_analyzing_and_cycle() {
        let out = terminal_output(|p| {
            p.show_analyzing();
            p.notify_cycle_complete();
            p.show_notice("audit first");
        });
        assert!(out.starts_with("Analyzing...\n"));
        assert!(out.contains(CYCLE_COMPLETE_MESSAGE));
        assert!(out.ends_with("! audit first\n"));
    }

    #[test]
    fn test_indent_code_multiline() {
        assert_eq!(indent_code("a\n  b"), "    a\n      b\n");
    }

    #[test]
    fn test_json_presenter_lines() {
        let record = sample(1);
        let mut presenter = JsonPresenter::new(Vec::new());
        presenter.show_problem(progress(0), &record);
        presenter.show_analyzing();
        presenter.show_result(progress(0), &record);
        presenter.notify_cycle_complete();
        presenter.show_notice("audit first");

        let out = String::from_utf8(presenter.into_inner()).unwrap();
        let events: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0]["event"], "problem");
        assert_eq!(events[0]["index"], 0);
        assert_eq!(events[0]["total"], 20);
        assert_eq!(events[0]["bad_code"], "bad(1)");
        assert!(events[0]["timestamp"].is_string());
        assert_eq!(events[1]["event"], "analyzing");
        assert_eq!(events[2]["event"], "result");
        assert_eq!(events[2]["critique"], "Critique 1");
        assert_eq!(events[3]["event"], "cycle_complete");
        assert_eq!(events[3]["message"], CYCLE_COMPLETE_MESSAGE);
        assert_eq!(events[4]["event"], "notice");
        assert_eq!(events[4]["message"], "audit first");
    }

    #[derive(Debug)]
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        crate::logging::init_test_logging();
        let record = sample(1);

        let mut terminal = TerminalPresenter::new(BrokenPipe, 40);
        terminal.show_problem(progress(0), &record);
        terminal.show_analyzing();

        let mut json = JsonPresenter::new(BrokenPipe);
        json.show_result(progress(0), &record);
    }
}
