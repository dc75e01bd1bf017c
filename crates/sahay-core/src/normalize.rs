//! Structured-output normalization: strip a Markdown code fence, then decode JSON.

use crate::error::ParseError;
use serde::de::DeserializeOwned;

/// Body of a fenced block (```` ```json … ``` ```` or ```` ``` … ``` ````), or the trimmed input
/// when it is not fenced.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Strip fences and decode. Empty bodies are `ParseError::Empty`.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "  ```\n[1, 2]\n```  ";
        assert_eq!(strip_code_fence(raw), "[1, 2]");
    }

    #[test]
    fn strips_single_line_fence() {
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(strip_code_fence(" {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn parse_reports_malformed_and_empty() {
        assert!(matches!(
            parse_structured::<Value>("```json\n```"),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            parse_structured::<Value>("Sure! Here is your advice."),
            Err(ParseError::Malformed(_))
        ));
        let v: Value = parse_structured("```json\n{\"ok\": true}\n```").unwrap();
        assert_eq!(v["ok"], true);
    }
}
