// Verdict engine for csrfprobe
// Decides whether a tweaked request bypassed the token check

use std::fmt;

use crate::baseline::Baseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassOutcome {
    Bypassed,
    Protected,
    Inconclusive,
}

impl fmt::Display for BypassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassOutcome::Bypassed => write!(f, "BYPASSED"),
            BypassOutcome::Protected => write!(f, "PROTECTED"),
            BypassOutcome::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// Decide a trial outcome from its status and body length.
///
/// 1. Status differs from the baseline = PROTECTED
/// 2. Baseline itself was a 4xx/5xx = PROTECTED (nothing safe to compare)
/// 3. Length within tolerance = BYPASSED (request accepted without a valid token)
/// 4. Otherwise = INCONCLUSIVE
pub fn decide_verdict(baseline: &Baseline, status: u16, length: usize) -> BypassOutcome {
    if status != baseline.status {
        return BypassOutcome::Protected;
    }
    if is_error_class(baseline.status) {
        return BypassOutcome::Protected;
    }
    if baseline.length.abs_diff(length) <= baseline.tolerance {
        BypassOutcome::Bypassed
    } else {
        BypassOutcome::Inconclusive
    }
}

/// Leading digit is 4 or 5.
fn is_error_class(status: u16) -> bool {
    matches!(status / 100, 4 | 5)
}
