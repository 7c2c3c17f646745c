use serde_json::Value;

use metric_common::normalize::{ResultTable, COLUMNS};

use crate::finder::summary_message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Table,
    /// The table as pretty-printed JSON.
    Json,
}

pub fn render(table: &ResultTable, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(table)),
        OutputFormat::Json => serde_json::to_string_pretty(table),
    }
}

/// Summary line followed by an aligned table. Rank-schema tables omit the note column.
pub fn render_table(table: &ResultTable) -> String {
    let mut out = summary_message(table);
    out.push('\n');
    if table.is_empty() {
        return out;
    }

    let width = if table.has_notes() { COLUMNS.len() } else { COLUMNS.len() - 1 };
    let header: Vec<String> = COLUMNS[..width].iter().map(|c| c.to_string()).collect();
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.rank.to_string(), r.metric.clone(), r.mentions.to_string()];
            if width == COLUMNS.len() {
                cells.push(r.note.clone().unwrap_or_default());
            }
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    out.push_str(&format_line(&header, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(&rule, &widths));
    for row in &body {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

/// Debug view of the raw webhook payload.
pub fn render_raw(raw: &Value) -> String {
    match raw {
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
