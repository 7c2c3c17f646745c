use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::coerce::{coerce_number, coerce_str, parse_saturating};
use super::shape::ENVELOPE_KEY;
use super::table::{MetricMapEntry, ResultTable, TableSource};

/// `"15 mentions - durable build"`, with `-`, en dash, em dash or `:` as separator.
static MENTION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s*mentions?\s*[-–—:]\s*(.*)$").expect("valid regex")
});

static MENTION_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmentions?\b").expect("valid regex"));

/// The mapping to read as a metric map, if the payload looks like one.
///
/// The payload must be a mapping (optionally under a `"json"` key) with at least
/// one string value containing the word "mention" or "mentions".
pub fn metric_map_candidate(payload: &Value) -> Option<&Map<String, Value>> {
    let outer = payload.as_object()?;
    let inner = outer.get(ENVELOPE_KEY).unwrap_or(payload).as_object()?;
    inner
        .values()
        .any(|v| v.as_str().is_some_and(|s| MENTION_WORD_RE.is_match(s)))
        .then_some(inner)
}

/// Read every numeric or string value of `map` as a metric entry, in key order.
pub fn extract_metric_entries(map: &Map<String, Value>) -> Vec<MetricMapEntry> {
    map.iter()
        .filter_map(|(key, value)| {
            let metric = key.trim().to_string();
            match value {
                Value::Number(_) => Some(MetricMapEntry {
                    metric,
                    mentions: coerce_number(value),
                    note: String::new(),
                }),
                Value::String(text) => Some(parse_mention_line(metric, text)),
                _ => None,
            }
        })
        .collect()
}

/// Extract a metric map and rank it by descending mentions.
pub fn extract_metric_map(map: &Map<String, Value>) -> ResultTable {
    ResultTable::ranked_by_mentions(TableSource::MetricMap, extract_metric_entries(map))
}

fn parse_mention_line(metric: String, text: &str) -> MetricMapEntry {
    let trimmed = text.trim();
    match MENTION_LINE_RE.captures(trimmed) {
        Some(caps) => MetricMapEntry {
            metric,
            mentions: parse_saturating(&caps[1]),
            note: caps[2].trim().to_string(),
        },
        // No "N mentions - ..." prefix: keep the whole text as the note.
        None => MetricMapEntry {
            metric,
            mentions: coerce_str(trimmed),
            note: trimmed.to_string(),
        },
    }
}
