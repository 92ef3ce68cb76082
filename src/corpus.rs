// Token corpus analysis for csrfprobe
// Self-similarity, cross-endpoint replay and hash fingerprinting over collected tokens

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::models::TokenCorpus;
use crate::signatures::SignatureDb;
use crate::similarity::SimilarityScorer;

/// Mean pairwise similarity of the corpus tokens, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityReport {
    pub mean: f64,
}

/// Score every token against the whole corpus and average the results.
///
/// For each token one self-match (the first score of 100) is dropped so a
/// genuine duplicate elsewhere still counts. Returns `None` when there is
/// nothing left to compare, which means there is no CSRF protection to test.
pub fn self_similarity<S: SimilarityScorer>(tokens: &[&str], scorer: &S) -> Option<SimilarityReport> {
    let mut averages = Vec::with_capacity(tokens.len());

    for token in tokens {
        let mut self_removed = false;
        let scores: Vec<f64> = tokens
            .iter()
            .map(|other| scorer.score(token, other))
            .filter(|&score| {
                if score == 100 && !self_removed {
                    self_removed = true;
                    return false;
                }
                true
            })
            .map(f64::from)
            .collect();

        if scores.is_empty() {
            return None;
        }
        averages.push(mean(&scores));
    }

    if averages.is_empty() {
        return None;
    }
    Some(SimilarityReport { mean: mean(&averages) })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Result of the replay scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayFinding {
    /// Unordered endpoint pairs sharing a literal token, stored as `(min, max)`.
    pub pairs: BTreeSet<(String, String)>,
    /// Whether any token value occurred more than once at all.
    pub duplicates: bool,
}

impl ReplayFinding {
    pub fn is_replay(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// Duplicated tokens that never crossed an endpoint boundary.
    pub fn is_false_positive(&self) -> bool {
        self.duplicates && self.pairs.is_empty()
    }
}

/// Find tokens reused across distinct URLs.
pub fn detect_replay(corpus: &TokenCorpus) -> ReplayFinding {
    let observations = corpus.observations();
    let unique: HashSet<&str> = observations.iter().map(|o| o.token.as_str()).collect();

    let mut finding = ReplayFinding::default();
    if unique.len() >= observations.len() {
        return finding;
    }
    finding.duplicates = true;

    for (i, a) in observations.iter().enumerate() {
        for b in &observations[i + 1..] {
            if a.token == b.token && a.url != b.url {
                let pair = if a.url <= b.url {
                    (a.url.clone(), b.url.clone())
                } else {
                    (b.url.clone(), a.url.clone())
                };
                debug!(url_a = %pair.0, url_b = %pair.1, "token replayed across endpoints");
                finding.pairs.insert(pair);
            }
        }
    }

    finding
}

/// Hash algorithms whose signature matches the first collected token.
pub fn fingerprint(corpus: &TokenCorpus, db: &SignatureDb) -> Vec<String> {
    corpus
        .observations()
        .first()
        .map(|o| db.matches(&o.token))
        .unwrap_or_default()
}
