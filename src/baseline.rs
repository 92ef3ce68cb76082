// Baseline estimation for csrfprobe
// Two identical control requests give the reference status, length and noise tolerance

use tracing::debug;

use crate::config::RequestConfig;
use crate::engine::Requester;
use crate::errors::AuditResult;
use crate::models::{HttpReply, ParsedForm};

/// Reference response that bypass trials are judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub status: u16,
    pub length: usize,
    /// Byte difference between the two control responses.
    pub tolerance: usize,
}

impl Baseline {
    /// Derive the baseline from two replies to the same request.
    pub fn from_replies(first: &HttpReply, second: &HttpReply) -> Self {
        Self {
            status: first.status,
            length: first.body_len(),
            tolerance: first.body_len().abs_diff(second.body_len()),
        }
    }

    /// The endpoint returned different lengths for identical requests.
    pub fn is_dynamic(&self) -> bool {
        self.tolerance > 0
    }
}

/// Send the untouched request twice and derive the baseline.
pub async fn estimate_baseline(
    requester: &dyn Requester,
    target: &ParsedForm,
    config: &RequestConfig,
) -> AuditResult<Baseline> {
    let first = requester
        .request(&target.url, &target.params, config, target.is_get)
        .await?;
    let second = requester
        .request(&target.url, &target.params, config, target.is_get)
        .await?;

    let baseline = Baseline::from_replies(&first, &second);
    debug!(
        url = %target.url,
        status = baseline.status,
        length = baseline.length,
        tolerance = baseline.tolerance,
        "baseline established"
    );
    Ok(baseline)
}
