// Bypass trials for csrfprobe
// Replays the chosen request with the token removed, cleared and forged

use rand::Rng;
use tracing::info;

use crate::baseline::Baseline;
use crate::config::{RequestConfig, MOBILE_USER_AGENT};
use crate::engine::Requester;
use crate::errors::AuditResult;
use crate::forms::{is_protected, parse_forms};
use crate::models::{ParsedForm, TrialVariant};
use crate::mutator::{tweak, SeedSet, TweakMode};
use crate::verdict::{decide_verdict, BypassOutcome};

/// Outcome of one trial together with what the server answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    pub variant: TrialVariant,
    pub status: u16,
    pub length: usize,
    pub outcome: BypassOutcome,
}

/// Run REMOVE, CLEAR and FORGE in that order against the same baseline.
///
/// Every trial yields an outcome; only transport failures abort.
pub async fn run_trials<R: Rng + ?Sized>(
    requester: &dyn Requester,
    target: &ParsedForm,
    baseline: &Baseline,
    seeds: &SeedSet,
    config: &RequestConfig,
    rng: &mut R,
) -> AuditResult<Vec<TrialResult>> {
    let mut results = Vec::with_capacity(3);
    for variant in [TrialVariant::Remove, TrialVariant::Clear, TrialVariant::Forge] {
        results.push(run_trial(requester, target, baseline, variant, seeds, config, rng).await?);
    }
    Ok(results)
}

pub async fn run_trial<R: Rng + ?Sized>(
    requester: &dyn Requester,
    target: &ParsedForm,
    baseline: &Baseline,
    variant: TrialVariant,
    seeds: &SeedSet,
    config: &RequestConfig,
    rng: &mut R,
) -> AuditResult<TrialResult> {
    let mode = match variant {
        TrialVariant::Remove => TweakMode::Remove,
        TrialVariant::Clear => TweakMode::Clear,
        TrialVariant::Forge => TweakMode::Generate(seeds),
    };
    let params = tweak(target, mode, rng);

    let reply = requester
        .request(&target.url, &params, config, target.is_get)
        .await?;
    let outcome = decide_verdict(baseline, reply.status, reply.body_len());
    info!(%variant, status = reply.status, length = reply.body_len(), %outcome, "trial finished");

    Ok(TrialResult {
        variant,
        status: reply.status,
        length: reply.body_len(),
        outcome,
    })
}

/// Fetch the endpoint as a mobile browser and report whether its forms still
/// carry a token. Independent of the trial verdicts.
pub async fn mobile_still_protected(
    requester: &dyn Requester,
    url: &str,
    config: &RequestConfig,
) -> AuditResult<bool> {
    let mobile = config.with_user_agent(MOBILE_USER_AGENT);
    let reply = requester.request(url, &Default::default(), &mobile, true).await?;
    Ok(is_protected(&parse_forms(url, &reply.body)))
}
