// Concurrent issuance probe for csrfprobe
// Fires a batch of simultaneous requests and checks whether the tokens handed out differ

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::RequestConfig;
use crate::engine::Requester;
use crate::errors::{AuditError, AuditResult};
use crate::forms::parse_forms;
use crate::models::{TokenCorpus, TokenObservation};
use crate::token::is_strong_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceVerdict {
    /// At least two simultaneous responses carried the same token.
    Shared,
    Unique,
}

impl fmt::Display for RaceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceVerdict::Shared => write!(f, "SHARED"),
            RaceVerdict::Unique => write!(f, "UNIQUE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    pub tokens: Vec<String>,
    pub failures: usize,
    pub verdict: RaceVerdict,
}

impl RaceResult {
    /// Classify merged worker output.
    pub fn from_tokens(tokens: Vec<String>, failures: usize) -> Self {
        let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let verdict = if distinct.len() < tokens.len() {
            RaceVerdict::Shared
        } else {
            RaceVerdict::Unique
        };
        Self {
            tokens,
            failures,
            verdict,
        }
    }
}

/// Draw random observations until one carries a non-empty token.
pub fn select_seed<'a, R: Rng + ?Sized>(
    corpus: &'a TokenCorpus,
    rng: &mut R,
    attempts: usize,
) -> AuditResult<&'a TokenObservation> {
    let observations = corpus.observations();
    for _ in 0..attempts {
        match observations.choose(rng) {
            Some(sample) if !sample.token.is_empty() => return Ok(sample),
            Some(_) => continue,
            None => break,
        }
    }
    Err(AuditError::NoUsableToken { attempts })
}

/// Token-like values found in the forms of one response body.
pub fn extract_candidates(url: &str, html: &str) -> Vec<String> {
    parse_forms(url, html)
        .into_iter()
        .flat_map(|form| form.inputs)
        .map(|input| input.value)
        .filter(|value| is_strong_token(value))
        .collect()
}

/// Request `url` `batch` times at once and compare the tokens issued.
///
/// Each worker returns its own candidates; the coordinator merges them once
/// every worker has finished. A failed worker is counted and does not stop
/// its siblings.
pub async fn race_probe(
    requester: Arc<dyn Requester>,
    url: &str,
    config: &RequestConfig,
    batch: usize,
) -> RaceResult {
    let mut workers = JoinSet::new();
    for _ in 0..batch {
        let requester = Arc::clone(&requester);
        let url = url.to_string();
        let config = config.clone();
        workers.spawn(async move {
            let reply = requester.request(&url, &Default::default(), &config, true).await?;
            Ok::<_, AuditError>(extract_candidates(&url, &reply.body))
        });
    }

    let mut tokens = Vec::new();
    let mut failures = 0;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(found)) => tokens.extend(found),
            Ok(Err(e)) => {
                warn!(error = %e, "race worker failed");
                failures += 1;
            }
            Err(e) => {
                warn!(error = %e, "race worker aborted");
                failures += 1;
            }
        }
    }

    debug!(url, collected = tokens.len(), failures, "race probe finished");
    RaceResult::from_tokens(tokens, failures)
}
