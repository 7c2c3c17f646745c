//! Response normalizer: turns a loosely-shaped webhook payload into a ranked
//! table of metric → mention count rows.
//!
//! Strategies are tried in a fixed order and the first one yielding rows wins:
//!
//! 1. rank schema (`rankN` / `rankN_mention_#`), direct, wrapped or listed
//! 2. metric map (`{"Metric": "N mentions - note"}`)
//! 3. tally of every numeric-looking value, summed per key
//!
//! Shape mismatches never fail; they fall through to the next strategy and
//! finally to an empty table.

pub mod coerce;
pub mod metric_map;
pub mod rank;
pub mod shape;
pub mod table;
pub mod tally;

use serde_json::Value;
use tracing::debug;

pub use coerce::coerce_number;
pub use metric_map::{extract_metric_map, metric_map_candidate};
pub use rank::extract_rank_rows;
pub use shape::{normalize_to_rank_objects, PayloadShape};
pub use table::{MetricMapEntry, RankEntry, ResultRow, ResultTable, TableSource, COLUMNS};
pub use tally::{extract_tallies, tally_candidates};

/// Decode a webhook body as JSON, keeping the text verbatim as a string value
/// when it is not JSON.
pub fn decode_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Build the ranked table for a payload.
pub fn build_table(payload: &Value) -> ResultTable {
    let entries: Vec<RankEntry> = shape::decode_payload(payload)
        .map(|decoded| {
            shape::collect_rank_objects(&decoded)
                .into_iter()
                .flat_map(extract_rank_rows)
                .collect()
        })
        .unwrap_or_default();
    if !entries.is_empty() {
        debug!(strategy = %TableSource::RankSchema, rows = entries.len(), "payload normalized");
        return ResultTable::from_rank_entries(entries);
    }

    if let Some(map) = metric_map_candidate(payload) {
        let table = extract_metric_map(map);
        if !table.is_empty() {
            debug!(strategy = %table.source, rows = table.len(), "payload normalized");
            return table;
        }
    }

    if let Some(bags) = tally_candidates(payload) {
        let table = extract_tallies(&bags);
        if !table.is_empty() {
            debug!(strategy = %table.source, rows = table.len(), "payload normalized");
            return table;
        }
    }

    debug!("no ranked metrics found in payload");
    ResultTable::empty()
}
