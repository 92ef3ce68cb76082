// Audit pipeline for csrfprobe
// Runs the five phases in order and writes status lines to any writer

use std::io::Write;
use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::baseline::estimate_baseline;
use crate::bypass::{mobile_still_protected, run_trials, TrialResult};
use crate::config::{RequestConfig, RACE_BATCH_SIZE, SEED_ATTEMPTS};
use crate::corpus::{detect_replay, fingerprint, self_similarity};
use crate::crawler::Crawler;
use crate::engine::Requester;
use crate::errors::AuditResult;
use crate::evaluate::evaluate;
use crate::mutator::ranger;
use crate::race::{race_probe, select_seed, RaceVerdict};
use crate::selector::select_candidate;
use crate::signatures::SignatureDb;
use crate::similarity::PartialRatio;
use crate::verdict::BypassOutcome;

/// One `(phase, target, result)` line for the reports.
pub type ReportRow = (String, String, String);

/// What the run is pointed at.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub target: String,
    pub threads: usize,
    pub level: usize,
}

/// Everything a finished (or cleanly stopped) run produced.
#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    pub rows: Vec<ReportRow>,
    pub mobile_protected: Option<bool>,
    pub trials: Vec<TrialResult>,
    /// False when the corpus left nothing to test and the run stopped after phase 3.
    pub completed: bool,
}

/// Run the audit against `options.target`.
///
/// Any transport failure in phases 4 and 5 aborts the run. An undefined
/// similarity score is a clean stop, not an error.
pub async fn run_audit<R, W>(
    requester: Arc<dyn Requester>,
    signatures: &SignatureDb,
    options: &AuditOptions,
    config: &RequestConfig,
    rng: &mut R,
    out: &mut W,
) -> AuditResult<AuditSummary>
where
    R: Rng + ?Sized,
    W: Write,
{
    let mut summary = AuditSummary::default();

    writeln!(out, "[~] Phase: Crawling [1/5]")?;
    let crawl = Crawler::new(options.level, options.threads)
        .crawl(Arc::clone(&requester), &options.target, config)
        .await?;
    writeln!(
        out,
        "[!] Crawled {} URL(s) and found {} form(s).",
        crawl.urls_visited,
        crawl.form_count()
    )?;

    writeln!(out, "[~] Phase: Evaluating [2/5]")?;
    let evaluation = evaluate(&crawl);
    let corpus = &evaluation.corpus;

    if !evaluation.weak_tokens.is_empty() {
        writeln!(out, "[+] Weak token(s) found")?;
        for weak in &evaluation.weak_tokens {
            writeln!(out, "[!] {} {}={}", weak.url, weak.name, weak.value)?;
            summary
                .rows
                .push(("evaluate".into(), weak.url.clone(), format!("WEAK TOKEN {}", weak.name)));
        }
    }
    if !evaluation.insecure_forms.is_empty() {
        writeln!(out, "[+] Insecure form(s) found")?;
        for insecure in &evaluation.insecure_forms {
            let form = insecure.form.action.replace(&options.target, "");
            if !form.is_empty() {
                writeln!(out, "[-] {} [{}]", insecure.url, form)?;
            }
            summary
                .rows
                .push(("evaluate".into(), insecure.form.action.clone(), "NO TOKEN".into()));
        }
    }

    let algorithms = fingerprint(corpus, signatures);
    if !algorithms.is_empty() {
        writeln!(out, "[!] Token matches the pattern of following hash type(s):")?;
        for name in &algorithms {
            writeln!(out, "    > {}", name)?;
        }
        if let Some(first) = corpus.observations().first() {
            summary
                .rows
                .push(("fingerprint".into(), first.token.clone(), algorithms.join("; ")));
        }
    }

    writeln!(out, "[~] Phase: Comparing [3/5]")?;
    let replay = detect_replay(corpus);
    if replay.duplicates {
        writeln!(out, "[+] Potential Replay Attack condition found")?;
        writeln!(out, "[~] Verifying and looking for the cause")?;
    }
    for (url_a, url_b) in &replay.pairs {
        writeln!(out, "[+] The same token was used on {} and {}", url_a, url_b)?;
        summary
            .rows
            .push(("replay".into(), format!("{} | {}", url_a, url_b), "REPLAY".into()));
    }
    if replay.is_false_positive() {
        writeln!(out, "[-] Further investigation shows that it was a false positive.")?;
    }

    let Some(similarity) = self_similarity(&corpus.tokens(), &PartialRatio) else {
        info!(tokens = corpus.len(), "nothing comparable, stopping");
        writeln!(out, "[-] No CSRF protection to test")?;
        return Ok(summary);
    };
    writeln!(
        out,
        "[!] Tokens are {}% similar to each other on an average",
        similarity.mean as u32
    )?;
    summary.rows.push((
        "similarity".into(),
        options.target.clone(),
        format!("{:.1}%", similarity.mean),
    ));

    writeln!(out, "[~] Phase: Observing [4/5]")?;
    writeln!(
        out,
        "[!] {} simultaneous requests are being made, please wait.",
        RACE_BATCH_SIZE
    )?;
    let seed = select_seed(corpus, rng, SEED_ATTEMPTS)?;
    let race = race_probe(Arc::clone(&requester), &seed.url, config, RACE_BATCH_SIZE).await;
    if race.failures > 0 {
        writeln!(
            out,
            "[-] {} of {} simultaneous requests failed",
            race.failures, RACE_BATCH_SIZE
        )?;
    }
    match race.verdict {
        RaceVerdict::Shared => writeln!(out, "[+] Same tokens were issued for simultaneous requests.")?,
        RaceVerdict::Unique => writeln!(out, "[!] Different tokens were issued for simultaneous requests.")?,
    }
    summary
        .rows
        .push(("race".into(), seed.url.clone(), race.verdict.to_string()));

    writeln!(out, "[+] Phase: Testing [5/5]")?;
    writeln!(out, "[~] Finding a suitable form for further testing. It may take a while.")?;
    let target = select_candidate(&crawl, corpus, &*requester, config, rng).await?;

    writeln!(out, "[~] Making a request with CSRF token for comparison.")?;
    let baseline = estimate_baseline(&*requester, &target, config).await?;
    writeln!(out, "[!] Status Code: {}", baseline.status)?;
    writeln!(out, "[!] Content Length: {}", baseline.length)?;
    if baseline.is_dynamic() {
        writeln!(out, "[!] Response is dynamic.")?;
    } else {
        writeln!(out, "[!] Response isn't dynamic.")?;
    }

    writeln!(out, "[~] Making a request with mobile browser")?;
    let mobile_protected = mobile_still_protected(&*requester, &target.url, config).await?;
    if mobile_protected {
        writeln!(out, "[-] CSRF protection is enabled for mobile browsers as well.")?;
        summary
            .rows
            .push(("mobile".into(), target.url.clone(), "PROTECTED".into()));
    } else {
        writeln!(out, "[+] CSRF protection isn't enabled for mobile browsers.")?;
        summary
            .rows
            .push(("mobile".into(), target.url.clone(), "UNPROTECTED".into()));
    }
    summary.mobile_protected = Some(mobile_protected);

    let seeds = ranger(&corpus.tokens());
    let trials = run_trials(&*requester, &target, &baseline, &seeds, config, rng).await?;
    for trial in &trials {
        writeln!(
            out,
            "[~] {} trial (status {}, length {})",
            trial.variant, trial.status, trial.length
        )?;
        let line = match trial.outcome {
            BypassOutcome::Bypassed => "[+] It worked!",
            BypassOutcome::Protected => "[-] It didn't work",
            BypassOutcome::Inconclusive => {
                "[!] Inconclusive: status matched but content differs beyond tolerance"
            }
        };
        writeln!(out, "{}", line)?;
        summary.rows.push((
            format!("bypass {}", trial.variant),
            target.url.clone(),
            trial.outcome.to_string(),
        ));
    }
    summary.trials = trials;
    summary.completed = true;

    Ok(summary)
}
