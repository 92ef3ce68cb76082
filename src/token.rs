// Token heuristics for csrfprobe
// Shape checks and the strength estimate used to tell tokens from incidental values

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{ENTROPY_THRESHOLD, TOKEN_PATTERN};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(TOKEN_PATTERN).unwrap();
    static ref WORD_RE: Regex = Regex::new(r"^[\w\-_]+$").unwrap();
}

/// Input names that usually carry anti-CSRF values, compared case-insensitively.
pub const COMMON_TOKEN_NAMES: &[&str] = &[
    "csrf",
    "xsrf",
    "token",
    "auth",
    "verify",
    "hash",
    "nonce",
    "_csrf",
    "_xsrf",
    "_token",
    "csrf_token",
    "csrftoken",
    "csrfmiddlewaretoken",
    "xsrf_token",
    "authenticity_token",
    "__requestverificationtoken",
    "anticsrf",
    "form_token",
];

/// True when the value has the overall shape of a CSRF token.
pub fn looks_like_token(value: &str) -> bool {
    TOKEN_RE.is_match(value)
}

/// True when the value is made of letters, digits, hyphens and underscores only.
pub fn is_word_value(value: &str) -> bool {
    WORD_RE.is_match(value)
}

/// True when an input name is one of the common anti-CSRF field names.
pub fn is_token_name(name: &str) -> bool {
    COMMON_TOKEN_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Rough randomness estimate for a candidate token.
///
/// Counts distinct ASCII letters and digits; values without any digit are
/// halved since they are far more likely to be words.
pub fn strength(value: &str) -> f64 {
    let mut seen: Vec<char> = value.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    seen.sort_unstable();
    seen.dedup();

    let distinct = seen.len() as f64;
    if value.chars().any(|c| c.is_ascii_digit()) {
        distinct
    } else {
        distinct / 2.0
    }
}

/// A value worth collecting as a token: word-shaped and strong enough.
pub fn is_strong_token(value: &str) -> bool {
    !value.is_empty() && is_word_value(value) && strength(value) > ENTROPY_THRESHOLD
}
