//! Page title extraction.

use serde_json::{Map, Value};

/// Title used when no candidate property yields text.
pub const UNTITLED: &str = "Untitled";

/// Extract a page title from its property map.
///
/// Candidates are checked in order; the first one that is a `title` or
/// `rich_text` property with non-empty plain text wins.
pub fn extract_title(properties: &Map<String, Value>, candidates: &[String]) -> String {
    candidates
        .iter()
        .filter_map(|name| properties.get(name))
        .find_map(property_text)
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Plain text of a text-bearing property, if it has any.
fn property_text(property: &Value) -> Option<String> {
    let kind = property.get("type")?.as_str()?;
    if kind != "title" && kind != "rich_text" {
        return None;
    }

    let text = plain_text(property.get(kind)?.as_array()?);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Concatenate the `plain_text` of every rich-text segment.
pub fn plain_text(segments: &[Value]) -> String {
    segments
        .iter()
        .filter_map(|segment| segment.get("plain_text").and_then(Value::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates() -> Vec<String> {
        kbot_core::config::default_title_properties()
    }

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_title_property() {
        let properties = props(json!({
            "Name": {"type": "title", "title": [
                {"plain_text": "Password "},
                {"plain_text": "Policy"}
            ]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Password Policy");
    }

    #[test]
    fn test_rich_text_property() {
        let properties = props(json!({
            "title": {"type": "rich_text", "rich_text": [{"plain_text": "Account Setup"}]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Account Setup");
    }

    #[test]
    fn test_candidate_order() {
        let properties = props(json!({
            "Title": {"type": "title", "title": [{"plain_text": "Third"}]},
            "Name": {"type": "title", "title": [{"plain_text": "Second"}]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Second");
    }

    #[test]
    fn test_absent_field_is_untitled() {
        let properties = props(json!({
            "Status": {"type": "select", "select": {"name": "Draft"}}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Untitled");
    }

    #[test]
    fn test_empty_field_is_untitled() {
        let properties = props(json!({
            "Name": {"type": "title", "title": []},
            "title": {"type": "rich_text", "rich_text": [{"plain_text": "   "}]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Untitled");
    }

    #[test]
    fn test_empty_field_falls_through() {
        let properties = props(json!({
            "title": {"type": "rich_text", "rich_text": []},
            "Name": {"type": "title", "title": [{"plain_text": "Second"}]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Second");
    }

    #[test]
    fn test_unrecognized_shape_is_skipped() {
        let properties = props(json!({
            "Name": {"type": "number", "number": 4},
            "Title": {"type": "title", "title": [{"plain_text": "Fallback"}]}
        }));
        assert_eq!(extract_title(&properties, &candidates()), "Fallback");
    }

    #[test]
    fn test_custom_candidates() {
        let properties = props(json!({
            "Page": {"type": "title", "title": [{"plain_text": "Custom"}]}
        }));
        assert_eq!(extract_title(&properties, &["Page".to_string()]), "Custom");
        assert_eq!(extract_title(&properties, &candidates()), "Untitled");
    }
}
