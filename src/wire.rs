//! Wire form of lineage events
//!
//! Converts events into plain JSON mappings: enums become their labels and
//! absent fields are dropped, including nulls nested inside facet payloads.

use serde::ser::Error as _;
use serde_json::{Map, Value};

use crate::event::LineageEvent;

/// Serialize one event into the mapping sent to Correlator
pub fn to_wire_form(event: &LineageEvent) -> Result<Map<String, Value>, serde_json::Error> {
    match strip_nulls(serde_json::to_value(event)?) {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!(
            "lineage event serialized to a non-object value: {}",
            other
        ))),
    }
}

/// Serialize a batch, preserving order
pub fn to_wire_batch(events: &[LineageEvent]) -> Result<Vec<Map<String, Value>>, serde_json::Error> {
    events.iter().map(to_wire_form).collect()
}

/// Remove null-valued object entries at every depth
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
