/// Crawl, evaluation and candidate selection tests against a scripted site
mod common;

use std::sync::Arc;

use common::{token_page, MockRequester};
use csrfprobe::config::RequestConfig;
use csrfprobe::corpus::detect_replay;
use csrfprobe::crawler::{extract_links, Crawler};
use csrfprobe::engine::Requester;
use csrfprobe::errors::{AuditError, AuditResult};
use csrfprobe::evaluate::evaluate;
use csrfprobe::models::{CrawlResult, Form, FormInput, HttpReply, TokenCorpus, TokenObservation};
use csrfprobe::selector::{first_tolerant, select_candidate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use url::Url;

const SHARED_TOKEN: &str = "Qm9sdDEyMzQ1Njc4OTBhYmNk";

fn site(url: &str) -> AuditResult<HttpReply> {
    let body = match url {
        "https://shop.test/" => r#"<html><body>
            <a href="/login">Login</a>
            <a href="/account#top">Account</a>
            <a href="https://other.test/x">Elsewhere</a>
            <a href="mailto:help@shop.test">Mail</a>
            <form action="/search"><input name="q" value=""></form>
        </body></html>"#
            .to_string(),
        "https://shop.test/login" => token_page("/session", SHARED_TOKEN) + r#"<a href="/">Home</a>"#,
        "https://shop.test/account" => {
            token_page("/account/email", SHARED_TOKEN)
                + r#"<form action="/account/prefs" method="post"><input name="authenticity_token" value="abc123"></form><a href="/deep">Deep</a>"#
        }
        "https://shop.test/deep" => token_page("/deep", "ZZZZ9999yyyy8888xxxx"),
        _ => return Err(AuditError::transport(url, "404 in test site")),
    };
    Ok(HttpReply::new(200, body))
}

fn site_requester() -> Arc<MockRequester<impl Fn(usize, &common::Call) -> AuditResult<HttpReply> + Send + Sync>> {
    Arc::new(MockRequester::new(|_, call| site(&call.url)))
}

async fn crawl_site() -> CrawlResult {
    let requester: Arc<dyn Requester> = site_requester();
    Crawler::new(2, 2)
        .crawl(requester, "https://shop.test/", &RequestConfig::default())
        .await
        .unwrap()
}

// ============================================
// Crawler
// ============================================

#[test]
fn links_are_resolved_and_filtered() {
    let page = Url::parse("https://shop.test/").unwrap();
    let html = r##"<a href="/a#frag">a</a><a href="b?x=1">b</a><a href="javascript:void(0)">j</a>"##;
    let links: Vec<String> = extract_links(&page, html).iter().map(|u| u.to_string()).collect();
    assert_eq!(links, vec!["https://shop.test/a", "https://shop.test/b?x=1"]);
}

#[tokio::test]
async fn crawl_stays_on_host_and_respects_levels() {
    let crawl = crawl_site().await;

    assert_eq!(crawl.urls_visited, 3);
    let pages: Vec<&str> = crawl.forms_by_url.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(
        pages,
        vec!["https://shop.test/", "https://shop.test/login", "https://shop.test/account"]
    );
    assert_eq!(crawl.form_count(), 4);
}

#[tokio::test]
async fn crawl_rejects_invalid_target() {
    let requester: Arc<dyn Requester> = site_requester();
    let err = Crawler::new(1, 1)
        .crawl(requester, "not a url", &RequestConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::InvalidUrl(_)));
}

// ============================================
// Evaluation
// ============================================

#[tokio::test]
async fn evaluation_builds_corpus_and_flags_forms() {
    let evaluation = evaluate(&crawl_site().await);

    let observations = evaluation.corpus.observations();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0], TokenObservation::new("https://shop.test/login", SHARED_TOKEN));
    assert_eq!(observations[1], TokenObservation::new("https://shop.test/account", SHARED_TOKEN));

    assert_eq!(evaluation.weak_tokens.len(), 1);
    assert_eq!(evaluation.weak_tokens[0].name, "authenticity_token");

    let insecure: Vec<&str> = evaluation.insecure_forms.iter().map(|f| f.form.action.as_str()).collect();
    assert_eq!(insecure, vec!["https://shop.test/search", "https://shop.test/account/prefs"]);

    let replay = detect_replay(&evaluation.corpus);
    assert!(replay.pairs.contains(&(
        "https://shop.test/account".to_string(),
        "https://shop.test/login".to_string()
    )));
}

#[test]
fn same_token_twice_on_a_page_is_recorded_once() {
    let form = |action: &str| Form {
        action: action.to_string(),
        method: "post".to_string(),
        inputs: vec![FormInput {
            name: "csrf".to_string(),
            kind: "hidden".to_string(),
            value: SHARED_TOKEN.to_string(),
        }],
    };
    let crawl = CrawlResult {
        forms_by_url: vec![("https://shop.test/a".to_string(), vec![form("/x"), form("/y")])],
        urls_visited: 1,
    };
    assert_eq!(evaluate(&crawl).corpus.len(), 1);
}

// ============================================
// Candidate Selection
// ============================================

#[tokio::test]
async fn first_acceptable_crawled_form_is_chosen() {
    let crawl = crawl_site().await;
    let parsed = first_tolerant(&crawl).expect("login form is testable");
    assert_eq!(parsed.url, "https://shop.test/session");
    assert!(!parsed.is_get);
    assert_eq!(parsed.params["csrf_token"], SHARED_TOKEN);
}

#[tokio::test]
async fn fallback_refetches_a_corpus_page() {
    let crawl = CrawlResult::default();
    let corpus: TokenCorpus = vec![TokenObservation::new("https://shop.test/login", SHARED_TOKEN)].into();
    let requester = MockRequester::new(|_, call| site(&call.url));
    let mut rng = StdRng::seed_from_u64(3);

    let parsed = select_candidate(&crawl, &corpus, &requester, &RequestConfig::default(), &mut rng)
        .await
        .unwrap();
    assert_eq!(parsed.url, "https://shop.test/session");
    assert_eq!(requester.recorded()[0].url, "https://shop.test/login");
}

#[tokio::test]
async fn no_testable_endpoint_is_explicit() {
    let crawl = CrawlResult::default();
    let corpus: TokenCorpus = vec![TokenObservation::new("https://shop.test/", SHARED_TOKEN)].into();
    let requester = MockRequester::new(|_, call| site(&call.url));
    let mut rng = StdRng::seed_from_u64(3);

    let err = select_candidate(&crawl, &corpus, &requester, &RequestConfig::default(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::NoTestableEndpoint));

    let err = select_candidate(&crawl, &TokenCorpus::new(), &requester, &RequestConfig::default(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::NoTestableEndpoint));
}
