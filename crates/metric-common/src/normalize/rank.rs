//! The `rankN` / `rankN_mention_#` schema.
//!
//! `rankN` carries the metric label and `rankN_mention_#` its mention count, for
//! N = 1, 2, 3... Keys are recognised by a prefix check plus an all-digit suffix.

use serde_json::{Map, Value};

use super::coerce::coerce_number;
use super::table::RankEntry;

const RANK_PREFIX: &str = "rank";
const MENTION_SUFFIX: &str = "_mention_#";

/// Whether `key` is exactly `rank<digits>`.
pub fn is_rank_key(key: &str) -> bool {
    key.strip_prefix(RANK_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// The index digits of a `rank<digits>` key with leading zeros stripped.
fn index_digits(key: &str) -> Option<&str> {
    if !is_rank_key(key) {
        return None;
    }
    let digits = key[RANK_PREFIX.len()..].trim_start_matches('0');
    Some(if digits.is_empty() { "0" } else { digits })
}

/// The declared index of a `rank<digits>` key, saturating at `u64::MAX`.
pub fn parse_rank_key(key: &str) -> Option<u64> {
    index_digits(key).map(|digits| digits.parse().unwrap_or(u64::MAX))
}

pub fn has_rank_keys(map: &Map<String, Value>) -> bool {
    map.keys().any(|k| is_rank_key(k))
}

/// Extract the rank rows of one mapping, in ascending numeric index order.
///
/// The label is the gating field: an index whose `rank<idx>` is absent or blank
/// produces no row even if its mention count is present. A missing count is 0.
/// Indices of any length are ordered; the row's rank saturates at `u64::MAX`.
pub fn extract_rank_rows(map: &Map<String, Value>) -> Vec<RankEntry> {
    let mut indices: Vec<&str> = map.keys().filter_map(|k| index_digits(k)).collect();
    // Canonical digit strings compare numerically by length first.
    indices.sort_unstable_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    indices
        .into_iter()
        .filter_map(|idx| {
            let metric = map
                .get(&format!("{RANK_PREFIX}{idx}"))
                .map(label)
                .unwrap_or_default();
            if metric.is_empty() {
                return None;
            }
            let mentions = map
                .get(&format!("{RANK_PREFIX}{idx}{MENTION_SUFFIX}"))
                .map(coerce_number)
                .unwrap_or(0);
            let rank = idx.parse().unwrap_or(u64::MAX);
            Some(RankEntry { rank, metric, mentions })
        })
        .collect()
}

fn label(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows(value: Value) -> Vec<(u64, String, i64)> {
        let map = value.as_object().cloned().unwrap();
        extract_rank_rows(&map)
            .into_iter()
            .map(|e| (e.rank, e.metric, e.mentions))
            .collect()
    }

    #[test]
    fn rank_key_grammar() {
        assert!(is_rank_key("rank1"));
        assert!(is_rank_key("rank42"));
        assert!(!is_rank_key("rank"));
        assert!(!is_rank_key("rank1_mention_#"));
        assert!(!is_rank_key("Rank1"));
        assert!(!is_rank_key("rank-1"));
        assert!(!is_rank_key("ranks"));
    }

    #[test]
    fn blank_names_are_skipped() {
        let got = rows(json!({
            "rank2": "Price",
            "rank2_mention_#": 3,
            "rank1": "",
            "rank1_mention_#": 9
        }));
        assert_eq!(got, vec![(2, "Price".to_string(), 3)]);
    }

    #[test]
    fn indices_sort_numerically_not_lexically() {
        let got = rows(json!({
            "rank10": "Ten",
            "rank9": "Nine",
            "rank1": "One",
        }));
        let order: Vec<u64> = got.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 9, 10]);
    }

    #[test]
    fn missing_or_loose_counts_are_coerced() {
        let got = rows(json!({
            "rank1": "  Accuracy ",
            "rank1_mention_#": "7 (approx)",
            "rank2": "Durability",
        }));
        assert_eq!(
            got,
            vec![(1, "Accuracy".to_string(), 7), (2, "Durability".to_string(), 0)]
        );
    }

    #[test]
    fn non_string_labels_are_stringified() {
        let got = rows(json!({ "rank1": 42, "rank2": true, "rank1_mention_#": 1.8 }));
        assert_eq!(got, vec![(1, "42".to_string(), 1), (2, "true".to_string(), 0)]);
    }

    #[test]
    fn null_label_keeps_its_row() {
        let got = rows(json!({ "rank1": null, "rank1_mention_#": 4, "rank2": "B" }));
        assert_eq!(
            got,
            vec![(1, "null".to_string(), 4), (2, "B".to_string(), 0)]
        );
    }

    #[test]
    fn oversized_indices_still_yield_rows() {
        let got = rows(json!({
            "rank99999999999999999999": "Huge",
            "rank100000000000000000000": "Huger",
            "rank2": "Two",
        }));
        assert_eq!(
            got,
            vec![
                (2, "Two".to_string(), 0),
                (u64::MAX, "Huge".to_string(), 0),
                (u64::MAX, "Huger".to_string(), 0),
            ]
        );
        assert_eq!(parse_rank_key("rank99999999999999999999"), Some(u64::MAX));
        assert_eq!(parse_rank_key("rank007"), Some(7));
        assert_eq!(parse_rank_key("rank7_mention_#"), None);
    }

    #[test]
    fn zero_padded_index_reads_canonical_key() {
        let got = rows(json!({ "rank01": "Padded", "rank1_mention_#": 4 }));
        assert!(got.is_empty());
    }
}
