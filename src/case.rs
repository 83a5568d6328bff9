//! Identifier case conversion.
//!
//! Three total functions over `&str`. Empty input comes back unchanged;
//! callers holding an `Option<&str>` map over it, so absence is preserved.
//!
//! The conversions are deliberately minimal: `to_camel("NUMBER")` only
//! lowercases the first character, and `to_upper_snake` does not split
//! acronym runs (`"myHTTPClient"` → `"MY_HTTPCLIENT"`).

/// Uppercase the first character unless it already is uppercase.
pub fn to_pascal(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if !first.is_uppercase() => {
            first.to_uppercase().chain(chars).collect()
        }
        _ => s.to_string(),
    }
}

/// Lowercase the first character unless it already is lowercase.
pub fn to_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if !first.is_lowercase() => {
            first.to_lowercase().chain(chars).collect()
        }
        _ => s.to_string(),
    }
}

/// `UPPER_SNAKE_CASE`.
///
/// An underscore goes before each uppercase character that follows a
/// lowercase one; then everything is uppercased. Runs of capitals are kept
/// together. Characters without case (digits, `_`) never start a new word,
/// so the output is a fixed point.
pub fn to_upper_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for ch in s.chars() {
        if ch.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            out.push('_');
        }
        out.extend(ch.to_uppercase());
        prev = Some(ch);
    }
    out
}
