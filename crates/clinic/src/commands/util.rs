//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use clinic_api::{Attachment, Paginated, Record};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    read_json_as(path)
}

/// Read a JSON file into a typed request body.
pub fn read_json_as<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Read a file for a multipart upload, named after its last path segment.
pub fn read_attachment(path: &Path) -> Result<Attachment, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
    Ok(Attachment::new(file_name, bytes))
}

/// Run `fut` behind a stderr spinner (hidden when quiet or not a terminal).
pub async fn with_spinner<F: Future>(message: &str, global: &GlobalOpts, fut: F) -> F::Output {
    if global.quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    spinner.finish_and_clear();
    out
}

/// Report a completed write on stderr unless quiet.
pub fn done(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("✓ {message}");
    }
}

/// Informational message on stderr unless quiet.
pub fn note(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

// ── Record field access ─────────────────────────────────────────────

/// Render a scalar field as text; objects collapse to their display name.
pub fn text(record: &Record, key: &str) -> String {
    record.get(key).map(scalar).unwrap_or_default()
}

/// First non-empty field among `keys`.
pub fn first_text(record: &Record, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text(record, key))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) => {
            let name = full_name(value);
            if name.is_empty() { text(value, "id") } else { name }
        }
        Value::Array(items) => items.len().to_string(),
        other => other.to_string(),
    }
}

/// `first_name last_name`, falling back to `name`, then the nested user.
pub fn full_name(record: &Record) -> String {
    let first = record.get("first_name").and_then(Value::as_str).unwrap_or("");
    let last = record.get("last_name").and_then(Value::as_str).unwrap_or("");
    let joined = format!("{first} {last}").trim().to_owned();
    if !joined.is_empty() {
        return joined;
    }
    if let Some(name) = record.get("name").and_then(Value::as_str) {
        return name.to_owned();
    }
    record.get("user").map(full_name).unwrap_or_default()
}

/// The record's `id`, for plain output.
pub fn id_of(record: &Record) -> String {
    text(record, "id")
}

/// `key: value` lines for every top-level field of a record.
pub fn detail(record: &Record, color: bool) -> String {
    let Some(map) = record.as_object() else {
        return scalar(record);
    };
    let width = map.keys().map(String::len).max().unwrap_or(0);
    map.iter()
        .map(|(key, value)| {
            let label = output::paint_label(&format!("{key:<width$}"), color);
            let value = if key == "status" {
                output::paint_status(&scalar(value), color)
            } else {
                scalar(value)
            };
            format!("{label}  {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rendering shortcuts ─────────────────────────────────────────────

/// Print one page of records, with a page footer on stderr for tables.
pub fn print_page<R: tabled::Tabled>(
    global: &GlobalOpts,
    page: &Paginated<Record>,
    to_row: impl Fn(&Record) -> R,
) {
    let out = output::render_list(&global.output, &page.results, to_row, id_of);
    output::print_output(&out, global.quiet);
    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        let more = if page.has_next() { ", more available" } else { "" };
        eprintln!("{} of {} shown{more}", page.results.len(), page.count);
    }
}

/// Print one record as a detail view.
pub fn print_record(global: &GlobalOpts, record: &Record) {
    let color = output::color_for(global);
    let out = output::render_single(&global.output, record, |r| detail(r, color), id_of);
    output::print_output(&out, global.quiet);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn names_fall_back_through_nested_user() {
        assert_eq!(full_name(&json!({ "first_name": "Ann", "last_name": "Lee" })), "Ann Lee");
        assert_eq!(full_name(&json!({ "name": "Cardiology" })), "Cardiology");
        assert_eq!(
            full_name(&json!({ "user": { "first_name": "Sam", "last_name": "Ng" } })),
            "Sam Ng"
        );
        assert_eq!(full_name(&json!({ "id": 3 })), "");
    }

    #[test]
    fn text_collapses_nested_objects() {
        let appt = json!({
            "id": 7,
            "patient": { "id": 3, "first_name": "Ann", "last_name": "Lee" },
            "doctor": 5,
            "notes": null,
        });
        assert_eq!(text(&appt, "patient"), "Ann Lee");
        assert_eq!(text(&appt, "doctor"), "5");
        assert_eq!(text(&appt, "notes"), "");
        assert_eq!(first_text(&appt, &["patient_name", "patient"]), "Ann Lee");
    }

    #[test]
    fn detail_lists_every_field() {
        let out = detail(&json!({ "id": 1, "status": "in_queue" }), false);
        assert_eq!(out, "id      1\nstatus  in_queue");
    }
}
