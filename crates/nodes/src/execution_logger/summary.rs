//! Typed view of the pixel sender's execution summary.
//!
//! The upstream payload is loosely shaped: every section may be missing and
//! counters may arrive as floats. Everything except `execution.script_id`
//! falls back to a default here, so the rest of the node only ever sees
//! [`ExecutionSummary`].

use serde_json::{Map, Value};

use super::LoggerError;

/// The fields of an upstream summary the execution log cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Always positive.
    pub script_id: i64,
    /// `execution.mode`, when it is a non-empty string.
    pub mode: Option<String>,
    pub total_input: i64,
    pub new_items: i64,
    pub exact_duplicates: i64,
    pub updated_items: i64,
    pub pixel_failed: f64,
    pub event_summary: Map<String, Value>,
    /// `details.sent_items.items`.
    pub sent_items: Vec<Value>,
}

impl ExecutionSummary {
    /// Parse the JSON of one input item.
    ///
    /// # Errors
    /// [`LoggerError::InvalidScriptId`] if `execution.script_id` is absent,
    /// not an integer, or not positive. Integral floats such as `42.0` are
    /// accepted; strings must hold nothing but a base-10 integer.
    pub fn parse(input: &Value) -> Result<Self, LoggerError> {
        let execution = section(input, "execution");
        let summary = section(input, "summary");
        let details = section(input, "details");

        let script_id = parse_script_id(execution.get("script_id"))?;

        let mode = execution
            .get("mode")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);

        let event_summary = summary
            .get("event_summary")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let sent_items = details
            .get("sent_items")
            .and_then(|sent| sent.get("items"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            script_id,
            mode,
            total_input: counter(&summary, "total_input"),
            new_items: counter(&summary, "new_items"),
            exact_duplicates: counter(&summary, "exact_duplicates"),
            updated_items: counter(&summary, "updated_items"),
            pixel_failed: summary
                .get("pixel_failed")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            event_summary,
            sent_items,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.pixel_failed > 0.0
    }
}

/// The object at `key`, or an empty one.
fn section(input: &Value, key: &str) -> Map<String, Value> {
    input
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn parse_script_id(raw: Option<&Value>) -> Result<i64, LoggerError> {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(LoggerError::InvalidScriptId(
            raw.map_or_else(|| "missing".to_owned(), Value::to_string),
        )),
    }
}

/// A numeric counter, truncated toward zero; anything else counts as 0.
fn counter(section: &Map<String, Value>, key: &str) -> i64 {
    match section.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_summary_is_extracted() {
        let input = json!({
            "execution": { "script_id": "42", "mode": "monthly" },
            "summary": {
                "total_input": 10,
                "new_items": 3,
                "exact_duplicates": 5,
                "updated_items": 2,
                "event_summary": { "Lead": 3, "Purchase": 1 },
                "pixel_failed": 0
            },
            "details": { "sent_items": { "items": [{ "id": 1 }, { "id": 2 }] } }
        });

        let summary = ExecutionSummary::parse(&input).expect("valid summary");
        assert_eq!(summary.script_id, 42);
        assert_eq!(summary.mode.as_deref(), Some("monthly"));
        assert_eq!(summary.total_input, 10);
        assert_eq!(summary.new_items, 3);
        assert_eq!(summary.exact_duplicates, 5);
        assert_eq!(summary.updated_items, 2);
        assert_eq!(summary.event_summary.len(), 2);
        assert_eq!(summary.sent_items.len(), 2);
        assert!(!summary.has_failures());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let summary = ExecutionSummary::parse(&json!({ "execution": { "script_id": 7 } }))
            .expect("only script_id is required");
        assert_eq!(summary.script_id, 7);
        assert_eq!(summary.mode, None);
        assert_eq!(summary.total_input, 0);
        assert!(summary.event_summary.is_empty());
        assert!(summary.sent_items.is_empty());
        assert_eq!(summary.pixel_failed, 0.0);
    }

    #[test]
    fn script_id_must_be_a_positive_integer() {
        for bad in [
            json!({}),
            json!({ "execution": {} }),
            json!({ "execution": { "script_id": "0" } }),
            json!({ "execution": { "script_id": 0 } }),
            json!({ "execution": { "script_id": "-3" } }),
            json!({ "execution": { "script_id": "abc" } }),
            json!({ "execution": { "script_id": 4.5 } }),
            json!({ "execution": { "script_id": null } }),
            json!([1, 2, 3]),
        ] {
            assert!(
                matches!(ExecutionSummary::parse(&bad), Err(LoggerError::InvalidScriptId(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn integral_float_script_id_is_accepted() {
        let summary = ExecutionSummary::parse(&json!({ "execution": { "script_id": 42.0 } }))
            .expect("42.0 is an integer");
        assert_eq!(summary.script_id, 42);
    }

    #[test]
    fn rejection_names_the_accepted_forms() {
        let err = ExecutionSummary::parse(&json!({ "execution": { "script_id": "42abc" } }))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("decimal string"), "{msg}");
        assert!(msg.contains("\"42abc\""), "{msg}");
    }

    #[test]
    fn script_id_string_may_carry_whitespace() {
        let summary = ExecutionSummary::parse(&json!({ "execution": { "script_id": " 15 " } }))
            .expect("trimmed id parses");
        assert_eq!(summary.script_id, 15);
    }

    #[test]
    fn float_counters_are_truncated_and_junk_is_zero() {
        let summary = ExecutionSummary::parse(&json!({
            "execution": { "script_id": 1 },
            "summary": { "total_input": 9.9, "new_items": "3", "pixel_failed": 0.5 }
        }))
        .expect("valid");
        assert_eq!(summary.total_input, 9);
        assert_eq!(summary.new_items, 0);
        assert!(summary.has_failures());
    }

    #[test]
    fn blank_mode_is_treated_as_absent() {
        let summary = ExecutionSummary::parse(&json!({
            "execution": { "script_id": 1, "mode": "  " }
        }))
        .expect("valid");
        assert_eq!(summary.mode, None);
    }
}
