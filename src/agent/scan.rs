//! Locate a JSON directive inside free-form model output.
//!
//! The scanner walks the reply once, tracking string literals and escapes,
//! so braces inside string values do not confuse it. It is deliberately
//! narrow: nesting is capped at [`MAX_DEPTH`], and a reply carrying more than
//! one complete top-level object is rejected instead of guessing which one
//! was meant.

use serde_json::{Map, Value};
use thiserror::Error;

/// Deepest `{`/`[` nesting accepted inside a directive
pub const MAX_DEPTH: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("no JSON object found")]
    NotFound,

    #[error("JSON object starting at byte {0} is never closed")]
    Unterminated(usize),

    #[error("JSON object nests deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("mismatched '{found}' at byte {at}")]
    Mismatched { found: char, at: usize },

    #[error("reply contains more than one JSON object")]
    Ambiguous,

    #[error("invalid JSON object: {0}")]
    Invalid(String),
}

/// Byte range of the first balanced object starting at or after `from`
fn next_object(text: &str, from: usize) -> Result<Option<(usize, usize)>, ScanError> {
    let Some(offset) = text[from..].find('{') else {
        return Ok(None);
    };
    let start = from + offset;

    let mut stack: Vec<char> = Vec::with_capacity(MAX_DEPTH);
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        let at = start + i;

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
            '{' | '[' => {
                if stack.len() == MAX_DEPTH {
                    return Err(ScanError::TooDeep);
                }
                stack.push(c);
            }
            '}' | ']' => {
                let expected = if c == '}' { '{' } else { '[' };
                if stack.pop() != Some(expected) {
                    return Err(ScanError::Mismatched { found: c, at });
                }
                if stack.is_empty() {
                    return Ok(Some((start, at + c.len_utf8())));
                }
            }
            _ => {}
        }
    }

    Err(ScanError::Unterminated(start))
}

/// Slice of `text` holding its single JSON object
pub fn find_object(text: &str) -> Result<&str, ScanError> {
    let (start, end) = next_object(text, 0)?.ok_or(ScanError::NotFound)?;

    // Trailing prose may contain a stray brace; only a second complete
    // object makes the reply ambiguous.
    if let Ok(Some(_)) = next_object(text, end) {
        return Err(ScanError::Ambiguous);
    }

    Ok(&text[start..end])
}

/// Parse the single JSON object embedded in `text`
pub fn extract_object(text: &str) -> Result<Map<String, Value>, ScanError> {
    let raw = find_object(text)?;

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ScanError::Invalid("not an object".to_string())),
        Err(e) => Err(ScanError::Invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let map = extract_object(r#"{"action": "get_weather", "city": "Oslo"}"#).unwrap();
        assert_eq!(map["action"], "get_weather");
        assert_eq!(map["city"], "Oslo");
    }

    #[test]
    fn test_object_inside_prose_and_fences() {
        let reply = "Sure, calling the tool:\n```json\n{\"action\": \"fetch_url\", \"url\": \"https://example.com\"}\n```\nDone.";
        let map = extract_object(reply).unwrap();
        assert_eq!(map["url"], "https://example.com");
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let reply = r#"{"action": "manage_users", "method": "POST", "data": {"user_name": "a}b{c"}}"#;
        let map = extract_object(reply).unwrap();
        assert_eq!(map["data"]["user_name"], "a}b{c");
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let reply = r#"{"action": "get_weather", "city": "say \"}\" please"}"#;
        let map = extract_object(reply).unwrap();
        assert_eq!(map["city"], r#"say "}" please"#);
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_object("It is sunny today."), Err(ScanError::NotFound));
    }

    #[test]
    fn test_unterminated_object() {
        assert_eq!(
            extract_object(r#"ok {"action": "get_weather""#),
            Err(ScanError::Unterminated(3))
        );
    }

    #[test]
    fn test_two_objects_are_ambiguous() {
        let reply = r#"{"action": "get_weather", "city": "A"} or {"action": "get_weather", "city": "B"}"#;
        assert_eq!(extract_object(reply), Err(ScanError::Ambiguous));
    }

    #[test]
    fn test_stray_brace_after_object_is_tolerated() {
        let reply = r#"{"action": "get_weather", "city": "A"} :-}"#;
        assert!(extract_object(reply).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "{\"a\":".repeat(MAX_DEPTH + 1), "}".repeat(MAX_DEPTH + 1));
        assert_eq!(extract_object(&deep), Err(ScanError::TooDeep));

        let ok = format!("{}1{}", "{\"a\":".repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
        assert!(extract_object(&ok).is_ok());
    }

    #[test]
    fn test_mismatched_brackets() {
        assert!(matches!(
            extract_object(r#"{"a": [1, 2}"#),
            Err(ScanError::Mismatched { found: '}', .. })
        ));
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        assert!(matches!(
            extract_object("{action: get_weather}"),
            Err(ScanError::Invalid(_))
        ));
    }
}
