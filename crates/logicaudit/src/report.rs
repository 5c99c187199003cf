//! Text rendering for the non-interactive commands.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::scenario::{Dataset, ScenarioRecord};
use crate::session::SessionSummary;

/// Render the deck as a listing of id, category and prompt.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn listing(dataset: &Dataset, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Plain => {
            for record in dataset.iter() {
                let _ = writeln!(out, "{}\t{}\t{}", record.id, record.category, record.prompt);
            }
        }
        OutputFormat::Table => {
            let width = dataset
                .iter()
                .map(|r| r.category.chars().count())
                .max()
                .unwrap_or(0)
                .max("CATEGORY".len());
            let _ = writeln!(out, "{:>3}  {:<width$}  PROMPT", "ID", "CATEGORY");
            for record in dataset.iter() {
                let _ = writeln!(
                    out,
                    "{:>3}  {:<width$}  {}",
                    record.id, record.category, record.prompt
                );
            }
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = dataset
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "category": r.category,
                        "prompt": r.prompt,
                    })
                })
                .collect();
            out = serde_json::to_string_pretty(&rows)?;
            out.push('\n');
        }
    }
    Ok(out)
}

/// Render one scenario in full, audit included.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn scenario_detail(record: &ScenarioRecord, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(record)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", record.id, record.category);
    let _ = writeln!(out, "Task: {}", record.prompt);
    let _ = writeln!(out);
    let _ = writeln!(out, "Flawed code:");
    for line in record.bad_code.lines() {
        let _ = writeln!(out, "    {line}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Critique: {}", record.critique);
    let _ = writeln!(out);
    let _ = writeln!(out, "Corrected code:");
    for line in record.good_code.lines() {
        let _ = writeln!(out, "    {line}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Reasoning: {}", record.reasoning);
    Ok(out)
}

/// One-paragraph summary printed after `run`.
#[must_use]
pub fn summary_text(summary: &SessionSummary) -> String {
    let elapsed = summary.finished_at - summary.started_at;
    format!(
        "Session over: {} audited, {} full cycle(s), stopped at scenario {} after {}s.\n",
        summary.scenarios_revealed,
        summary.cycles_completed,
        summary.final_cursor + 1,
        elapsed.num_seconds(),
    )
}

/// The run summary as one JSON line, tagged like the panel events.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn summary_json(summary: &SessionSummary) -> Result<String> {
    #[derive(Serialize)]
    struct Tagged<'a> {
        event: &'static str,
        #[serde(flatten)]
        summary: &'a SessionSummary,
    }

    Ok(serde_json::to_string(&Tagged {
        event: "summary",
        summary,
    })?)
}

/// Outcome of `config validate` for one file, ready to print.
#[must_use]
pub fn validation(path: &Path) -> String {
    let mut out = format!("Validating configuration: {}\n", path.display());
    match Config::load_from(Some(path.to_path_buf())) {
        Ok(_) => out.push_str("Configuration is valid.\n"),
        Err(e) => {
            let _ = writeln!(out, "Configuration error: {e}");
        }
    }
    out
}
