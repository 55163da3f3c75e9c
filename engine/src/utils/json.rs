//! Helpers for decoding JSON out of LLM completions.
//!
//! Chat models frequently wrap JSON payloads in markdown code fences even when
//! instructed not to. Every parse site in the engine goes through
//! [`parse_json_response`], which strips fences first and converts decode
//! failures into [`EngineError::Parse`] so they are classified separately from
//! transport failures.

use serde::de::DeserializeOwned;

use crate::errors::EngineError;

/// Strip a surrounding markdown code fence (``` or ```json) from a completion.
///
/// Returns the inner payload trimmed of whitespace. Input without a fence is
/// returned trimmed but otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The opening fence may carry a language tag, e.g. ```json
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    body.trim()
}

/// Decode a typed value from an LLM completion, tolerating code fences.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T, EngineError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body)
        .map_err(|e| EngineError::Parse(format!("invalid JSON in model response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        topic: String,
    }

    #[test]
    fn test_strip_plain_json() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fenced_json() {
        let raw = "```json\n{\"topic\": \"Solar Energy\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"topic\": \"Solar Energy\"}");
    }

    #[test]
    fn test_strip_fence_without_language_tag() {
        let raw = "```\n{\"topic\": \"AI\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"topic\": \"AI\"}");
    }

    #[test]
    fn test_strip_unterminated_fence() {
        let raw = "```json\n{\"topic\": \"AI\"}";
        assert_eq!(strip_code_fences(raw), "{\"topic\": \"AI\"}");
    }

    #[test]
    fn test_strip_preserves_inner_whitespace_only_at_edges() {
        let raw = "```json\n{\n  \"topic\": \"AI\"\n}\n```";
        assert_eq!(strip_code_fences(raw), "{\n  \"topic\": \"AI\"\n}");
    }

    #[test]
    fn test_parse_json_response_plain() {
        let parsed: Payload = parse_json_response(r#"{"topic": "Solar Energy"}"#).unwrap();
        assert_eq!(parsed.topic, "Solar Energy");
    }

    #[test]
    fn test_parse_json_response_fenced() {
        let parsed: Payload =
            parse_json_response("```json\n{\"topic\": \"Solar Energy\"}\n```").unwrap();
        assert_eq!(parsed.topic, "Solar Energy");
    }

    #[test]
    fn test_parse_json_response_malformed_is_parse_error() {
        let err = parse_json_response::<Payload>("not json at all").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_parse_json_response_missing_field_is_parse_error() {
        let err = parse_json_response::<Payload>(r#"{"keywords": []}"#).unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
