//! Defensive parsing of LLM JSON-mode output (§9 "Dynamic JSON from LLM").
//!
//! Models asked for `response_format: json_object` occasionally wrap the
//! object in prose or a fenced code block anyway. Rather than trust the
//! envelope, we accept a top-level JSON object or extract the first
//! balanced `{...}` span and parse that; anything else is a `Transient`
//! failure the caller's stage-local fallback should handle.

use serde::de::DeserializeOwned;

use crate::client::ClientError;

/// Parse `raw` as a JSON object, tolerating surrounding prose/code fences.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T, ClientError> {
    let value = extract_json_value(raw)?;
    serde_json::from_value(value)
        .map_err(|e| ClientError::Transient(format!("response did not match expected shape: {e}")))
}

/// Parse `raw` as a generic `serde_json::Value`, same tolerance as above.
pub fn parse_json_value(raw: &str) -> Result<serde_json::Value, ClientError> {
    extract_json_value(raw)
}

fn extract_json_value(raw: &str) -> Result<serde_json::Value, ClientError> {
    let trimmed = raw.trim();

    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if v.is_object() {
            return Ok(v);
        }
    }

    match first_balanced_object(trimmed) {
        Some(candidate) => serde_json::from_str(&candidate)
            .map_err(|e| ClientError::Transient(format!("unparsable JSON object: {e}"))),
        None => Err(ClientError::Transient(
            "no JSON object found in LLM response".to_string(),
        )),
    }
}

/// Scan for the first balanced `{...}` span, respecting string escaping so
/// braces inside quoted values don't unbalance the scan.
fn first_balanced_object(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        let c = b as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Decision {
        ok: bool,
        score: f32,
    }

    #[test]
    fn parses_clean_object() {
        let raw = r#"{"ok": true, "score": 0.9}"#;
        let d: Decision = parse_json_response(raw).unwrap();
        assert_eq!(d, Decision { ok: true, score: 0.9 });
    }

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let raw = "Sure, here you go:\n```json\n{\"ok\": false, \"score\": 0.1}\n```\nHope that helps!";
        let d: Decision = parse_json_response(raw).unwrap();
        assert_eq!(d, Decision { ok: false, score: 0.1 });
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance_scan() {
        let raw = r#"noise { "ok": true, "score": 1.0, "note": "a { b } c" } trailing"#;
        let d: Decision = parse_json_response(raw).unwrap();
        assert_eq!(d, Decision { ok: true, score: 1.0 });
    }

    #[test]
    fn non_json_is_transient() {
        let err = parse_json_value("not json at all").unwrap_err();
        assert!(matches!(err, ClientError::Transient(_)));
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = parse_json_value("[1,2,3]").unwrap_err();
        assert!(matches!(err, ClientError::Transient(_)));
    }
}
