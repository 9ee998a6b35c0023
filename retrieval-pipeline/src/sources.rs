use common::storage::types::query_result::{NormalizedSource, SourceKind};
use serde_json::{Map, Value};

/// Maps one raw source record from the graph backend onto [`NormalizedSource`].
///
/// Decoding never fails: a missing or non-string `node_type` becomes
/// `document`, and any field that is absent or of an unusable type is left
/// `None`. Numeric strings are accepted for numeric fields.
pub fn normalize_source(raw: &Value) -> NormalizedSource {
    let Some(fields) = raw.as_object() else {
        return NormalizedSource::default();
    };

    let node_type = fields
        .get("node_type")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map_or(SourceKind::Document, SourceKind::from);

    NormalizedSource {
        node_type,
        video_name: string_field(fields, "video_name"),
        start_time: float_field(fields, "start_time"),
        end_time: float_field(fields, "end_time"),
        pdf_name: string_field(fields, "pdf_name"),
        page_num: int_field(fields, "page_num"),
        text: string_field(fields, "text"),
    }
}

pub fn normalize_sources(raw: &[Value]) -> Vec<NormalizedSource> {
    raw.iter().map(normalize_source).collect()
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn float_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int_field(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_node_type_defaults_to_document() {
        let source = normalize_source(&json!({ "pdf_name": "report.pdf", "page_num": 4 }));

        assert_eq!(source.node_type, SourceKind::Document);
        assert_eq!(source.pdf_name.as_deref(), Some("report.pdf"));
        assert_eq!(source.page_num, Some(4));
        assert_eq!(source.video_name, None);
        assert_eq!(source.text, None);
    }

    #[test]
    fn test_video_source_keeps_time_range() {
        let source = normalize_source(&json!({
            "node_type": "video",
            "video_name": "talk.mp4",
            "start_time": 12,
            "end_time": 48.5,
            "text": "the speaker explains ownership"
        }));

        assert_eq!(source.node_type, SourceKind::Video);
        assert_eq!(source.video_name.as_deref(), Some("talk.mp4"));
        assert_eq!(source.start_time, Some(12.0));
        assert_eq!(source.end_time, Some(48.5));
        assert_eq!(source.text.as_deref(), Some("the speaker explains ownership"));
        assert_eq!(source.pdf_name, None);
    }

    #[test]
    fn test_unusable_values_are_dropped_not_errors() {
        let source = normalize_source(&json!({
            "node_type": 7,
            "page_num": "three",
            "start_time": {"seconds": 3},
            "pdf_name": null,
            "unexpected": "ignored"
        }));

        assert_eq!(source.node_type, SourceKind::Document);
        assert_eq!(source.page_num, None);
        assert_eq!(source.start_time, None);
        assert_eq!(source.pdf_name, None);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let source = normalize_source(&json!({ "page_num": "12", "start_time": "3.5", "end_time": 7 }));

        assert_eq!(source.page_num, Some(12));
        assert_eq!(source.start_time, Some(3.5));
        assert_eq!(source.end_time, Some(7.0));
    }

    #[test]
    fn test_non_object_record_becomes_empty_document() {
        let sources = normalize_sources(&[json!("just text"), json!(null)]);

        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| *s == NormalizedSource::default()));
    }

    #[test]
    fn test_absent_fields_serialize_as_null_not_empty_string() {
        let value = serde_json::to_value(normalize_source(&json!({}))).expect("serialize");

        assert_eq!(value["node_type"], json!("document"));
        for key in ["video_name", "start_time", "end_time", "pdf_name", "page_num", "text"] {
            assert_eq!(value[key], Value::Null, "{key}");
        }
    }
}
