// Candidate selection for csrfprobe
// Picks the endpoint the baseline and bypass trials will run against

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::config::RequestConfig;
use crate::engine::Requester;
use crate::errors::{AuditError, AuditResult};
use crate::forms::{datanize_first, parse_forms};
use crate::models::{CrawlResult, ParsedForm, TokenCorpus};

/// First crawled page, in crawl order, with a form the tolerant parser accepts.
pub fn first_tolerant(crawl: &CrawlResult) -> Option<ParsedForm> {
    crawl
        .forms_by_url
        .iter()
        .find_map(|(url, forms)| {
            let parsed = datanize_first(forms, true);
            if parsed.is_some() {
                debug!(url = %url, "candidate form found while crawling");
            }
            parsed
        })
}

/// Choose a testable endpoint.
///
/// Falls back to refetching a random corpus page and parsing it strictly.
/// Fails with [`AuditError::NoTestableEndpoint`] when both passes come up empty.
pub async fn select_candidate<R: Rng + ?Sized>(
    crawl: &CrawlResult,
    corpus: &TokenCorpus,
    requester: &dyn Requester,
    config: &RequestConfig,
    rng: &mut R,
) -> AuditResult<ParsedForm> {
    if let Some(parsed) = first_tolerant(crawl) {
        return Ok(parsed);
    }

    let fallback = corpus
        .observations()
        .choose(rng)
        .ok_or(AuditError::NoTestableEndpoint)?;
    info!(url = %fallback.url, "no crawled form accepted, refetching a token page");

    let reply = requester
        .request(&fallback.url, &Default::default(), config, true)
        .await?;
    datanize_first(&parse_forms(&fallback.url, &reply.body), false).ok_or(AuditError::NoTestableEndpoint)
}
