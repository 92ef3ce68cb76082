// Header handling for csrfprobe
// Parses headers pasted by the user into request configuration entries

use reqwest::header::{HeaderName, HeaderValue};

use crate::errors::{AuditError, AuditResult};

/// Parse `Name: value` lines. Blank lines are skipped, anything else without
/// a colon or with an invalid name/value is rejected.
pub fn extract_headers(text: &str) -> AuditResult<Vec<(String, String)>> {
    let mut headers = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| AuditError::InvalidHeader(line.to_string()))?;
        let name = name.trim();
        let value = value.trim().trim_end_matches(',');

        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AuditError::InvalidHeader(format!("bad name in '{}'", line)))?;
        HeaderValue::from_str(value)
            .map_err(|_| AuditError::InvalidHeader(format!("bad value in '{}'", line)))?;

        headers.push((name.to_string(), value.to_string()));
    }
    Ok(headers)
}
