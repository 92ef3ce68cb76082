// Configuration for csrfprobe
// Tunable constants and the immutable per-request configuration value

use std::time::Duration;

/// Browser-like headers sent when none are supplied interactively.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("User-Agent", "Mozilla/5.0 (X11; Linux x86_64; rv:60.0) Gecko/20100101 Firefox/60.0"),
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Connection", "close"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// User agent used for the mobile protection check.
pub const MOBILE_USER_AGENT: &str = "Mozilla/4.0 (compatible; MSIE 5.5; Windows CE; PPC; 240x320)";

/// Number of simultaneous requests fired by the race probe.
pub const RACE_BATCH_SIZE: usize = 30;

/// Minimum strength a value must exceed to count as a token.
pub const ENTROPY_THRESHOLD: f64 = 10.0;

/// Random draws allowed when looking for a non-empty seed token.
pub const SEED_ATTEMPTS: usize = 100;

/// Values shaped like this are treated as CSRF tokens when tweaking requests.
/// ASCII only: a Unicode `\w` repeated 256 times overflows the regex size limit.
pub const TOKEN_PATTERN: &str = r"^[A-Za-z0-9_\-+=/]{14,256}$";

pub const DEFAULT_THREADS: usize = 2;
pub const DEFAULT_LEVEL: usize = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Headers, timeout and delay applied to a single request.
///
/// Phases never mutate a shared configuration; a variant is derived with
/// [`RequestConfig::with_user_agent`] and passed along explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub delay: Duration,
}

impl RequestConfig {
    pub fn new(headers: Vec<(String, String)>, timeout: Duration, delay: Duration) -> Self {
        Self { headers, timeout, delay }
    }

    /// Copy of this configuration with the `User-Agent` header replaced.
    pub fn with_user_agent(&self, user_agent: &str) -> Self {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("user-agent"))
            .cloned()
            .collect();
        headers.push(("User-Agent".to_string(), user_agent.to_string()));
        Self {
            headers,
            timeout: self.timeout,
            delay: self.delay,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_user_agent_leaves_original_untouched() {
        let base = RequestConfig::default();
        let mobile = base.with_user_agent(MOBILE_USER_AGENT);

        assert_eq!(mobile.header("user-agent"), Some(MOBILE_USER_AGENT));
        assert_ne!(base.header("User-Agent"), Some(MOBILE_USER_AGENT));
        assert_eq!(mobile.headers.len(), base.headers.len());
    }
}
