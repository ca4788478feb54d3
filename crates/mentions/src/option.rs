//! Candidate options: normalisation from raw records and filtering.

use crate::config::FilterFn;
use serde::Serialize;
use serde_json::Value;

/// A candidate entity shown in the dropdown, or a mention found in a value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MentionOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl MentionOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

fn field_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Maps raw records onto options through the configured field names.
///
/// Records that are not objects, or that lack either mapped field, are
/// skipped with a warning.
pub fn normalize_options(records: &[Value], label_field: &str, value_field: &str) -> Vec<MentionOption> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let Some(obj) = record.as_object() else {
                log::warn!(target: "mentions.options", "record {i} is not an object; skipped");
                return None;
            };
            let label = obj.get(label_field).and_then(field_string);
            let value = obj.get(value_field).and_then(field_string);
            match (label, value) {
                (Some(label), Some(value)) => Some(MentionOption {
                    label,
                    value,
                    disabled: obj.get("disabled").and_then(Value::as_bool).unwrap_or(false),
                }),
                _ => {
                    log::warn!(
                        target: "mentions.options",
                        "record {i} lacks `{label_field}` or `{value_field}`; skipped"
                    );
                    None
                }
            }
        })
        .collect()
}

/// The options currently offered for `filter`.
///
/// An empty filter keeps every option. Otherwise the custom predicate decides,
/// or a case-insensitive substring match on the label. Always re-derived from
/// the source list; order is preserved.
pub fn filter_options(
    options: &[MentionOption],
    filter: &str,
    predicate: Option<&FilterFn>,
) -> Vec<MentionOption> {
    if filter.is_empty() {
        return options.to_vec();
    }
    match predicate {
        Some(pred) => options.iter().filter(|o| pred(o, filter)).cloned().collect(),
        None => {
            let needle = filter.to_lowercase();
            options
                .iter()
                .filter(|o| o.label.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }
    }
}
