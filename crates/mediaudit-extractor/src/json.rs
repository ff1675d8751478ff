//! Tolerant JSON recovery from model output
//!
//! Models wrap JSON in Markdown fences, sprinkle control characters and
//! smart quotes, emit `Infinity`/`NaN` for numeric overflow, leave
//! trailing commas, or bury the payload inside prose. This module is a
//! generic "find the JSON in this mess" routine with no knowledge of any
//! target schema, applied before any shape validation.

use crate::error::ExtractorError;
use serde_json::Value;

/// Strip Markdown code fences and control characters.
pub fn clean_model_text(raw: &str) -> String {
    let mut text = raw.trim();
    if text.starts_with("```") {
        let mut rest = &text[3..];
        // get() instead of indexing: the fence may be followed by
        // multibyte text, and byte 4 need not be a char boundary
        if rest.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
        if let Some(stripped) = rest.strip_suffix("```") {
            rest = stripped.trim_end();
        }
        text = rest;
    }
    text.chars().filter(|c| !is_control(*c)).collect()
}

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x0000..=0x001F | 0x007F..=0x009F)
}

/// Smart quotes to ASCII, `Infinity`/`-Infinity`/`NaN` to `null`.
pub fn normalize_tokens(s: &str) -> String {
    let quoted: String = s
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    null_out_token(&null_out_token(&quoted, "Infinity"), "NaN")
}

/// Replace standalone occurrences of `token` (keeping word boundaries,
/// consuming a directly preceding minus sign) with `null`.
fn null_out_token(s: &str, token: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find(token) {
        let end = pos + token.len();
        let prev = rest[..pos].chars().next_back();
        let next = rest[end..].chars().next();
        let joined_prev = matches!(prev, Some(c) if c.is_ascii_alphanumeric() || c == '_');
        let joined_next = matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == '_');

        if joined_prev || joined_next {
            out.push_str(&rest[..end]);
        } else if prev == Some('-') {
            out.push_str(&rest[..pos - 1]);
            out.push_str("null");
        } else {
            out.push_str(&rest[..pos]);
            out.push_str("null");
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Extract the first balanced `{...}` or `[...]` span.
///
/// Single left-to-right scan tracking a bracket stack and string/escape
/// state, so brackets inside string literals are skipped and backslash
/// escapes are respected.
pub fn first_json_span(text: &str) -> Option<&str> {
    let s = text.trim();
    let start = match (s.find('{'), s.find('[')) {
        (None, None) => return None,
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (Some(obj), Some(arr)) => obj.min(arr),
    };

    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in s[start..].char_indices() {
        let i = start + offset;
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            c if stack.last() == Some(&c) => {
                stack.pop();
            }
            _ => {}
        }
        if i > start && stack.is_empty() {
            return Some(&s[start..i + ch.len_utf8()]);
        }
    }

    None
}

/// Drop commas that directly precede a closing `}` or `]`.
pub fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Recover one JSON value from arbitrary model text.
///
/// Escalates through cleanup, direct parse, balanced-span extraction and
/// trailing-comma repair before giving up with a malformed-response error.
pub fn parse_model_json(raw: &str) -> Result<Value, ExtractorError> {
    let cleaned = normalize_tokens(&clean_model_text(raw));

    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }

    let candidate = first_json_span(&cleaned).ok_or_else(|| {
        ExtractorError::MalformedResponse("no JSON value found in the response text".to_string())
    })?;

    let repaired = strip_trailing_commas(candidate);
    serde_json::from_str(&repaired).map_err(|e| ExtractorError::MalformedResponse(e.to_string()))
}
