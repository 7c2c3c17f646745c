use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Column headings of a rendered [`ResultTable`], in display order.
pub const COLUMNS: [&str; 4] = ["rank", "metric", "Amazon Review Mentions", "note"];

/// One row of the `rankN` / `rankN_mention_#` schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    /// The numeric suffix `N` as declared by the source, not a recomputed position.
    pub rank: u64,
    pub metric: String,
    pub mentions: i64,
}

/// One entry of a metric → "N mentions - note" map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricMapEntry {
    pub metric: String,
    pub mentions: i64,
    pub note: String,
}

/// Which extraction strategy produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Explicit `rankN` keys; rows keep their declared rank.
    RankSchema,
    /// Metric names mapped to "N mentions - note" strings.
    MetricMap,
    /// Numeric values summed per key across every element.
    Tally,
    /// Nothing usable was found.
    Empty,
}

impl std::fmt::Display for TableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSource::RankSchema => write!(f, "rank_schema"),
            TableSource::MetricMap => write!(f, "metric_map"),
            TableSource::Tally => write!(f, "tally"),
            TableSource::Empty => write!(f, "empty"),
        }
    }
}

/// A single ranked metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultRow {
    pub rank: u64,
    pub metric: String,
    #[serde(rename = "Amazon Review Mentions")]
    pub mentions: i64,
    /// `None` for rank-schema rows, which carry no note column.
    #[serde(default)]
    pub note: Option<String>,
}

/// The canonical normalizer output. Built once per webhook response and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultTable {
    pub source: TableSource,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn empty() -> Self {
        Self::new(TableSource::Empty, Vec::new())
    }

    fn new(source: TableSource, rows: Vec<ResultRow>) -> Self {
        Self {
            source,
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Keep declared ranks; order ascending by rank, preserving input order among equal ranks.
    pub fn from_rank_entries(mut entries: Vec<RankEntry>) -> Self {
        if entries.is_empty() {
            return Self::empty();
        }
        entries.sort_by_key(|e| e.rank);
        let rows = entries
            .into_iter()
            .map(|e| ResultRow {
                rank: e.rank,
                metric: e.metric,
                mentions: e.mentions,
                note: None,
            })
            .collect();
        Self::new(TableSource::RankSchema, rows)
    }

    /// Order descending by mentions (stable) and assign dense 1-based ranks.
    pub fn ranked_by_mentions(source: TableSource, mut entries: Vec<MetricMapEntry>) -> Self {
        if entries.is_empty() {
            return Self::empty();
        }
        entries.sort_by(|a, b| b.mentions.cmp(&a.mentions));
        let rows = entries
            .into_iter()
            .zip(1u64..)
            .map(|(e, rank)| ResultRow {
                rank,
                metric: e.metric,
                mentions: e.mentions,
                note: Some(e.note),
            })
            .collect();
        Self::new(source, rows)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the note column carries data for this table's source.
    pub fn has_notes(&self) -> bool {
        !matches!(self.source, TableSource::RankSchema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(metric: &str, mentions: i64) -> MetricMapEntry {
        MetricMapEntry {
            metric: metric.to_string(),
            mentions,
            note: String::new(),
        }
    }

    #[test]
    fn rank_entries_sorted_by_declared_rank_with_ties_kept() {
        let table = ResultTable::from_rank_entries(vec![
            RankEntry { rank: 3, metric: "C".into(), mentions: 1 },
            RankEntry { rank: 1, metric: "A".into(), mentions: 5 },
            RankEntry { rank: 1, metric: "A2".into(), mentions: 9 },
        ]);
        let order: Vec<(u64, &str)> = table.rows.iter().map(|r| (r.rank, r.metric.as_str())).collect();
        assert_eq!(order, vec![(1, "A"), (1, "A2"), (3, "C")]);
        assert_eq!(table.source, TableSource::RankSchema);
        assert!(table.rows.iter().all(|r| r.note.is_none()));
    }

    #[test]
    fn mentions_ranking_is_stable_and_dense() {
        let table = ResultTable::ranked_by_mentions(
            TableSource::Tally,
            vec![entry("low", 1), entry("tie-a", 4), entry("tie-b", 4), entry("top", 9)],
        );
        let order: Vec<(u64, &str)> = table.rows.iter().map(|r| (r.rank, r.metric.as_str())).collect();
        assert_eq!(order, vec![(1, "top"), (2, "tie-a"), (3, "tie-b"), (4, "low")]);
    }

    #[test]
    fn empty_table_keeps_column_schema() {
        let table = ResultTable::ranked_by_mentions(TableSource::MetricMap, Vec::new());
        assert_eq!(table.source, TableSource::Empty);
        assert_eq!(table.columns, COLUMNS.to_vec());
        assert!(table.is_empty());
    }

    #[test]
    fn mentions_column_serializes_under_display_name() {
        let table = ResultTable::ranked_by_mentions(TableSource::MetricMap, vec![entry("Accuracy", 15)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0]["Amazon Review Mentions"], 15);
        assert_eq!(json["source"], "metric_map");
    }
}
