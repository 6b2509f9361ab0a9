//! Tool-call extraction from model output.
//!
//! The model requests capabilities with a mini call syntax embedded in its
//! free-form reply text: `@tool_name(key1: "value1", key2: "value2")`.
//! A hand-written scanner parses it. Inside double quotes, parentheses,
//! commas and colons are literal; `\"` and `\\` are the only escapes; the
//! first unquoted `)` closes the call. An unterminated call is not a match.

use std::collections::HashMap;

/// A parsed, not-yet-executed request to run a named capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// The capability name after the `@`.
    pub name: String,

    /// The parameter text between the parentheses, verbatim.
    pub raw_parameters: String,

    /// Decoded key/value pairs. Values stay strings; coercion is the
    /// tool's job.
    pub parameters: HashMap<String, String>,
}

/// Extract all tool invocations from `text`, in source order.
///
/// Pure and idempotent: the same text always yields the same sequence.
pub fn extract(text: &str) -> Vec<ToolInvocation> {
    let chars: Vec<char> = text.chars().collect();
    let mut invocations = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '@' {
            i += 1;
            continue;
        }

        // Identifier: one or more word characters after the '@'.
        let name_start = i + 1;
        let mut j = name_start;
        while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
            j += 1;
        }
        if j == name_start || j >= chars.len() || chars[j] != '(' {
            i += 1;
            continue;
        }

        match scan_parameters(&chars, j + 1) {
            Some((raw, end)) => {
                let name: String = chars[name_start..j].iter().collect();
                let parameters = parse_parameters(&raw);
                invocations.push(ToolInvocation {
                    name,
                    raw_parameters: raw,
                    parameters,
                });
                i = end + 1;
            }
            // Unterminated call: not a match, keep scanning past the '@'.
            None => i += 1,
        }
    }

    invocations
}

/// Scan from `start` (just past the opening paren) to the first unquoted
/// `)`. Returns the raw parameter text and the index of the closing paren.
fn scan_parameters(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut raw = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];

        if escaped {
            raw.push(c);
            escaped = false;
        } else if in_quotes && c == '\\' {
            raw.push(c);
            escaped = true;
        } else if c == '"' {
            raw.push(c);
            in_quotes = !in_quotes;
        } else if c == ')' && !in_quotes {
            return Some((raw, i));
        } else {
            raw.push(c);
        }

        i += 1;
    }

    None
}

/// Decode the raw parameter text into key/value pairs.
///
/// Splits on top-level (unquoted) commas; each segment splits at its first
/// unquoted colon; both sides are trimmed and one quote layer stripped.
/// Colon-less segments are dropped.
fn parse_parameters(raw: &str) -> HashMap<String, String> {
    let mut parameters = HashMap::new();

    for segment in split_top_level(raw, ',') {
        let Some((key, value)) = split_once_top_level(&segment, ':') else {
            continue;
        };
        let key = unquote(key.trim());
        let value = unquote(value.trim());
        if !key.is_empty() {
            parameters.insert(key, value);
        }
    }

    parameters
}

/// Split on `sep` occurrences that sit outside double quotes.
fn split_top_level(raw: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if in_quotes && c == '\\' {
            current.push(c);
            escaped = true;
        } else if c == '"' {
            current.push(c);
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    parts.push(current);
    parts
}

/// Split at the first `sep` outside quotes, or None if there is none.
fn split_once_top_level(segment: &str, sep: char) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, c) in segment.char_indices() {
        if escaped {
            escaped = false;
        } else if in_quotes && c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            return Some((&segment[..idx], &segment[idx + c.len_utf8()..]));
        }
    }

    None
}

/// Strip one layer of surrounding double quotes and resolve `\"` / `\\`.
fn unquote(s: &str) -> String {
    let inner = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        return s.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_call() {
        let calls = extract(r#"Sure! @file_operations(operation: "read", path: "/tmp/x")"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "file_operations");
        assert_eq!(calls[0].parameters["operation"], "read");
        assert_eq!(calls[0].parameters["path"], "/tmp/x");
    }

    #[test]
    fn extraction_is_order_preserving() {
        let text = "first @a(x: \"1\") some prose @b(y: \"2\") done";
        let calls = extract(text);
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = r#"@tool(k: "v") and @tool(k: "w")"#;
        assert_eq!(extract(text), extract(text));
        assert_eq!(extract(text).len(), 2);
    }

    #[test]
    fn empty_parameters_are_allowed() {
        let calls = extract("@ping()");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "ping");
        assert!(calls[0].raw_parameters.is_empty());
        assert!(calls[0].parameters.is_empty());
    }

    #[test]
    fn quoted_values_may_contain_parens_commas_and_colons() {
        let calls = extract(r#"@note(text: "see (figure 2), then: retry")"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parameters["text"], "see (figure 2), then: retry");
    }

    #[test]
    fn escaped_quotes_inside_values() {
        let calls = extract(r#"@say(msg: "she said \"hi\"")"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parameters["msg"], r#"she said "hi""#);
    }

    #[test]
    fn escaped_backslash_inside_values() {
        let calls = extract(r#"@path(dir: "C:\\temp")"#);
        assert_eq!(calls[0].parameters["dir"], r"C:\temp");
    }

    #[test]
    fn unterminated_call_is_not_a_match() {
        assert!(extract("@broken(operation: \"read\"").is_empty());
        assert!(extract("@broken(never closes...").is_empty());
    }

    #[test]
    fn at_signs_without_calls_are_ignored() {
        assert!(extract("email me @ home, or user@example.com").is_empty());
        assert!(extract("@ (not a call)").is_empty());
    }

    #[test]
    fn colonless_segments_are_dropped() {
        let calls = extract(r#"@t(operation: "read", junk, path: "/x")"#);
        assert_eq!(calls[0].parameters.len(), 2);
        assert!(calls[0].parameters.contains_key("operation"));
        assert!(calls[0].parameters.contains_key("path"));
    }

    #[test]
    fn unquoted_values_survive_trimmed() {
        let calls = extract("@t(count: 3, flag: true)");
        assert_eq!(calls[0].parameters["count"], "3");
        assert_eq!(calls[0].parameters["flag"], "true");
    }

    #[test]
    fn parameter_roundtrip() {
        let calls = extract(r#"@file_operations(operation: "read", path: "/tmp/x")"#);
        let expected: HashMap<String, String> = [
            ("operation".to_string(), "read".to_string()),
            ("path".to_string(), "/tmp/x".to_string()),
        ]
        .into();
        assert_eq!(calls[0].parameters, expected);
    }

    #[test]
    fn raw_parameters_preserved_verbatim() {
        let calls = extract(r#"@t(a: "1",  b : "2")"#);
        assert_eq!(calls[0].raw_parameters, r#"a: "1",  b : "2""#);
    }
}
