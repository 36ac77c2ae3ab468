//! Output formatting: table, JSON, YAML, plain, CSV.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line, and
//! CSV writes the table's columns through `csv`.

use std::borrow::Cow;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color applies to table output only; other formats are for machines.
pub fn color_for(global: &GlobalOpts) -> bool {
    matches!(global.output, OutputFormat::Table) && should_color(&global.color)
}

/// Color an appointment or availability status by its meaning.
pub fn paint_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match status {
        "completed" | "available" => status.green().to_string(),
        "in_queue" | "scheduled" | "busy" => status.yellow().to_string(),
        "cancelled" | "no_show" | "off_duty" => status.red().to_string(),
        _ => status.to_owned(),
    }
}

/// Emphasize a label in detail views.
pub fn paint_label(label: &str, color: bool) -> String {
    if color {
        label.bold().to_string()
    } else {
        label.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: maps each item through `to_row` and builds a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
/// - `csv`: the table's headers and cells as CSV
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
        OutputFormat::Csv => {
            let header = R::headers().into_iter().map(Cow::into_owned);
            let cells = data.iter().map(|item| {
                let row = to_row(item);
                row.fields().into_iter().map(Cow::into_owned).collect::<Vec<_>>()
            });
            render_csv(to_csv(header, cells))
        }
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
        OutputFormat::Csv => render_csv(record_csv(data)),
    }
}

/// Write a header row and records as CSV.
pub fn to_csv<H, I, F>(header: H, records: I) -> Result<String, csv::Error>
where
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    I: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_csv(rendered: Result<String, csv::Error>) -> String {
    match rendered {
        Ok(text) => text.trim_end().to_owned(),
        Err(e) => format!("# csv export failed: {e}"),
    }
}

/// A single item as `field,value` rows.
fn record_csv<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, csv::Error> {
    let value = serde_json::to_value(data).map_err(std::io::Error::other)?;
    let cell = |v: &serde_json::Value| match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let rows: Vec<[String; 2]> = match &value {
        serde_json::Value::Object(map) => {
            map.iter().map(|(key, v)| [key.clone(), cell(v)]).collect()
        }
        other => vec![[String::new(), cell(other)]],
    };
    to_csv(["field", "value"], rows)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("# serialization failed: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<serde_json::Value> {
        vec![json!({ "id": 1, "name": "Ann" }), json!({ "id": 2, "name": "Bob" })]
    }

    fn row(v: &serde_json::Value) -> Row {
        Row {
            name: v["name"].as_str().unwrap_or_default().to_owned(),
        }
    }

    #[test]
    fn plain_lists_one_identifier_per_line() {
        let out = render_list(&OutputFormat::Plain, &items(), row, |v| v["id"].to_string());
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn table_renders_headers_and_rows() {
        let out = render_list(&OutputFormat::Table, &items(), row, |v| v["id"].to_string());
        assert!(out.contains("Name"));
        assert!(out.contains("Ann"));
        assert!(out.contains("Bob"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(&OutputFormat::JsonCompact, &items(), row, |v| v["id"].to_string());
        assert!(!out.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[1]["name"], "Bob");
    }

    #[test]
    fn csv_uses_table_headers_and_quotes_cells() {
        let data = vec![json!({ "id": 1, "name": "Lee, Ann" }), json!({ "id": 2, "name": "Bob" })];
        let out = render_list(&OutputFormat::Csv, &data, row, |v| v["id"].to_string());
        assert_eq!(out, "Name\n\"Lee, Ann\"\nBob");
    }

    #[test]
    fn single_record_csv_lists_fields() {
        let record = json!({ "id": 3, "notes": null, "status": "completed" });
        let out = render_single(&OutputFormat::Csv, &record, |_| String::new(), |_| String::new());
        assert_eq!(out, "field,value\nid,3\nnotes,\nstatus,completed");
    }

    #[test]
    fn status_is_uncolored_when_color_is_off() {
        assert_eq!(paint_status("in_queue", false), "in_queue");
        assert_ne!(paint_status("in_queue", true), "in_queue");
    }
}
