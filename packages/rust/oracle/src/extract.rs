//! JSON extraction from free-form model output.
//!
//! Models frequently wrap JSON in Markdown code fences, with or without a
//! language label. These helpers strip that wrapping before parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use leadenrich_shared::{EnrichError, Result};

/// Matches an opening fence with an optional label: ```` ```json ````, ```` ``` ````.
static OPEN_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+.-]*\s*").expect("open fence regex"));

/// Matches a closing fence at the very end.
static CLOSE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```$").expect("close fence regex"));

/// Strip a leading fence (labeled or not), a trailing fence, and whitespace.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = OPEN_FENCE_RE
        .find(trimmed)
        .map_or(trimmed, |m| &trimmed[m.end()..]);
    let body = CLOSE_FENCE_RE
        .find(body)
        .map_or(body, |m| &body[..m.start()]);
    body.trim()
}

/// Parse model output as JSON after fence stripping.
///
/// Only a fence wrapping the whole answer is removed; JSON embedded in
/// prose is rejected with [`EnrichError::MalformedOracleResponse`].
pub fn parse_json_text(text: &str) -> Result<Value> {
    serde_json::from_str::<Value>(strip_fences(text)).map_err(|e| {
        EnrichError::malformed(format!("invalid JSON format after cleaning: {e}"), text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_labeled_fence() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```JSON\n{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn strips_unlabeled_fence_and_whitespace() {
        assert_eq!(strip_fences("  \n```\n{\"a\":1}\n```  \n"), "{\"a\":1}");
    }

    #[test]
    fn bare_text_is_untouched() {
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fences("  plain  "), "plain");
    }

    #[test]
    fn parses_all_three_shapes() {
        for text in [
            "```json\n{\"a\":1}\n```",
            "```\n{\"a\":1}\n```",
            "{\"a\":1}",
        ] {
            assert_eq!(parse_json_text(text).unwrap(), json!({"a": 1}), "{text}");
        }
    }

    #[test]
    fn block_inside_prose_is_malformed() {
        let text = "I can't verify this person. An answer would look like:\n```json\n{\"a\":2}\n```";
        let err = parse_json_text(text).unwrap_err();
        assert!(matches!(err, EnrichError::MalformedOracleResponse { .. }));
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse_json_text("Sorry, I couldn't find that.").unwrap_err();
        assert!(matches!(err, EnrichError::MalformedOracleResponse { .. }));
        assert!(err.to_string().contains("Sorry"));
    }
}
