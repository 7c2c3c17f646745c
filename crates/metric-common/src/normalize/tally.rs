use std::collections::HashMap;

use serde_json::{Map, Value};

use super::coerce::{coerce_number, has_digit};
use super::shape::{elements, ENVELOPE_KEY};
use super::table::{MetricMapEntry, ResultTable, TableSource};

/// The mappings to tally, if the payload is a mapping or a sequence.
///
/// Each element contributes its `"json"` sub-value when present, otherwise
/// itself; anything that is not a mapping contributes nothing.
pub fn tally_candidates(payload: &Value) -> Option<Vec<&Map<String, Value>>> {
    if !matches!(payload, Value::Object(_) | Value::Array(_)) {
        return None;
    }
    let bags = elements(payload)
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            map.get(ENVELOPE_KEY).unwrap_or(item).as_object()
        })
        .collect();
    Some(bags)
}

/// Sum coerced counts per trimmed key across every bag, then rank by total.
///
/// Only numbers and strings containing a digit count. Totals keep first-seen key
/// order so that ties rank in document order.
pub fn extract_tallies(bags: &[&Map<String, Value>]) -> ResultTable {
    let mut totals: Vec<(String, i64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for bag in bags {
        for (key, value) in bag.iter() {
            let counts = match value {
                Value::Number(_) => true,
                Value::String(s) => has_digit(s),
                _ => false,
            };
            if !counts {
                continue;
            }
            let metric = key.trim();
            let amount = coerce_number(value);
            match index.get(metric) {
                Some(&slot) => totals[slot].1 = totals[slot].1.saturating_add(amount),
                None => {
                    index.insert(metric.to_string(), totals.len());
                    totals.push((metric.to_string(), amount));
                }
            }
        }
    }

    let entries = totals
        .into_iter()
        .map(|(metric, mentions)| MetricMapEntry {
            metric,
            mentions,
            note: String::new(),
        })
        .collect();
    ResultTable::ranked_by_mentions(TableSource::Tally, entries)
}
