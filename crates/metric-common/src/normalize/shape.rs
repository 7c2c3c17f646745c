//! Payload shape classification for the rank-schema path.
//!
//! Webhook envelopes arrive as a single object or a list of them, optionally
//! nested one level under `"json"`. Each element is classified independently.

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::rank::has_rank_keys;

pub(crate) const ENVELOPE_KEY: &str = "json";
const RANKS_KEY: &str = "ranks";

/// How one payload element contributes rank objects.
#[derive(Debug, PartialEq)]
pub enum PayloadShape<'a> {
    /// The element itself carries `rankN` keys.
    RankObject(&'a Map<String, Value>),
    /// `{"ranks": {...}}`, taken as-is even without `rankN` keys.
    RanksWrapper(&'a Map<String, Value>),
    /// `{"ranks": [...]}`, keeping only entries with `rankN` keys.
    RanksList(Vec<&'a Map<String, Value>>),
    Unrecognized,
}

impl<'a> PayloadShape<'a> {
    fn into_rank_objects(self) -> Vec<&'a Map<String, Value>> {
        match self {
            PayloadShape::RankObject(map) | PayloadShape::RanksWrapper(map) => vec![map],
            PayloadShape::RanksList(maps) => maps,
            PayloadShape::Unrecognized => Vec::new(),
        }
    }
}

/// Decode a string payload as JSON; other payloads pass through borrowed.
///
/// Returns `None` when a string payload is not valid JSON.
pub fn decode_payload(payload: &Value) -> Option<Cow<'_, Value>> {
    match payload {
        Value::String(text) => serde_json::from_str(text).ok().map(Cow::Owned),
        other => Some(Cow::Borrowed(other)),
    }
}

/// View a payload as a sequence of elements, wrapping a non-array in a singleton.
pub fn elements(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Step into a `{"json": {...}}` envelope when the nested value is a mapping.
pub fn unwrap_envelope(value: &Value) -> &Value {
    match value {
        Value::Object(map) => match map.get(ENVELOPE_KEY) {
            Some(inner @ Value::Object(_)) => inner,
            _ => value,
        },
        other => other,
    }
}

/// Classify one unwrapped element, checking in order: own `rankN` keys, a
/// `ranks` mapping, then a `ranks` list.
pub fn classify(value: &Value) -> PayloadShape<'_> {
    let Value::Object(map) = value else {
        return PayloadShape::Unrecognized;
    };
    if has_rank_keys(map) {
        return PayloadShape::RankObject(map);
    }
    match map.get(RANKS_KEY) {
        Some(Value::Object(ranks)) => PayloadShape::RanksWrapper(ranks),
        Some(Value::Array(items)) => PayloadShape::RanksList(
            items
                .iter()
                .filter_map(Value::as_object)
                .filter(|m| has_rank_keys(m))
                .collect(),
        ),
        _ => PayloadShape::Unrecognized,
    }
}

/// All rank objects of an already-decoded payload, in traversal order.
pub fn collect_rank_objects(decoded: &Value) -> Vec<&Map<String, Value>> {
    elements(decoded)
        .iter()
        .flat_map(|elem| classify(unwrap_envelope(elem)).into_rank_objects())
        .collect()
}

/// Decode (if needed) and collect the rank objects of a raw payload.
///
/// A string payload that is not valid JSON yields nothing.
pub fn normalize_to_rank_objects(payload: &Value) -> Vec<Map<String, Value>> {
    decode_payload(payload)
        .map(|decoded| collect_rank_objects(&decoded).into_iter().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn envelope_is_unwrapped_only_for_mappings() {
        let wrapped = json!({"json": {"rank1": "X"}});
        assert_eq!(unwrap_envelope(&wrapped), &json!({"rank1": "X"}));

        let not_a_map = json!({"json": "text", "rank1": "Y"});
        assert_eq!(unwrap_envelope(&not_a_map), &not_a_map);
    }

    #[test]
    fn classification_prefers_own_rank_keys() {
        let value = json!({"rank1": "A", "ranks": {"rank1": "B"}});
        assert!(matches!(classify(&value), PayloadShape::RankObject(_)));
    }

    #[test]
    fn ranks_wrapper_is_taken_as_is() {
        let value = json!({"ranks": {"other": 1}});
        let inner = json!({"other": 1});
        assert_eq!(
            classify(&value),
            PayloadShape::RanksWrapper(inner.as_object().unwrap())
        );
    }

    #[test]
    fn ranks_list_keeps_only_rank_objects() {
        let value = json!({"ranks": [{"rank1": "A"}, {"x": 1}, "noise", {"rank2": "B"}]});
        let PayloadShape::RanksList(maps) = classify(&value) else {
            panic!("expected ranks list");
        };
        assert_eq!(maps.len(), 2);
    }

    #[test]
    fn scalars_are_unrecognized() {
        assert_eq!(classify(&json!(3)), PayloadShape::Unrecognized);
        assert_eq!(classify(&json!({"Accuracy": "3 mentions"})), PayloadShape::Unrecognized);
    }

    #[test]
    fn list_payload_preserves_traversal_order() {
        let payload = json!([
            {"json": {"rank1": "first"}},
            {"ranks": [{"rank1": "second"}, {"rank1": "third"}]},
            {"unrelated": true},
        ]);
        let labels: Vec<&Value> = collect_rank_objects(&payload)
            .into_iter()
            .map(|m| &m["rank1"])
            .collect();
        assert_eq!(labels, vec![&json!("first"), &json!("second"), &json!("third")]);
    }

    #[test]
    fn string_payloads_are_decoded_or_dropped() {
        let encoded = Value::String(r#"{"rank1": "A"}"#.to_string());
        assert_eq!(normalize_to_rank_objects(&encoded).len(), 1);

        let garbage = Value::String("not json".to_string());
        assert!(normalize_to_rank_objects(&garbage).is_empty());
    }
}
