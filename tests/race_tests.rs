/// Race probe tests
/// Concurrent issuance verdicts and bounded seed selection
mod common;

use std::sync::Arc;

use common::{token_page, MockRequester};
use csrfprobe::config::{RequestConfig, RACE_BATCH_SIZE};
use csrfprobe::engine::Requester;
use csrfprobe::errors::AuditError;
use csrfprobe::models::{HttpReply, TokenCorpus, TokenObservation};
use csrfprobe::race::{extract_candidates, race_probe, select_seed, RaceResult, RaceVerdict};
use rand::rngs::StdRng;
use rand::SeedableRng;

const URL: &str = "https://shop.test/login";

fn fresh_token(n: usize) -> String {
    format!("a1b2c3d4e5f6g7{:04}", n)
}

#[tokio::test]
async fn distinct_tokens_are_unique() {
    let requester: Arc<dyn Requester> = Arc::new(MockRequester::new(|i, call| {
        Ok(HttpReply::new(200, token_page(&call.url, &fresh_token(i))))
    }));

    let result = race_probe(requester, URL, &RequestConfig::default(), RACE_BATCH_SIZE).await;

    assert_eq!(result.tokens.len(), 30);
    assert_eq!(result.failures, 0);
    assert_eq!(result.verdict, RaceVerdict::Unique);
}

#[tokio::test]
async fn repeated_token_is_shared() {
    let requester: Arc<dyn Requester> = Arc::new(MockRequester::new(|i, call| {
        let token = if i == 17 { fresh_token(3) } else { fresh_token(i) };
        Ok(HttpReply::new(200, token_page(&call.url, &token)))
    }));

    let result = race_probe(requester, URL, &RequestConfig::default(), RACE_BATCH_SIZE).await;
    assert_eq!(result.verdict, RaceVerdict::Shared);
}

#[tokio::test]
async fn workers_hit_the_seed_url_with_empty_params() {
    let mock = Arc::new(MockRequester::new(|i, call| {
        Ok(HttpReply::new(200, token_page(&call.url, &fresh_token(i))))
    }));
    let requester: Arc<dyn Requester> = mock.clone();

    race_probe(requester, URL, &RequestConfig::default(), RACE_BATCH_SIZE).await;

    let calls = mock.recorded();
    assert_eq!(calls.len(), RACE_BATCH_SIZE);
    assert!(calls.iter().all(|c| c.url == URL && c.params.is_empty() && c.is_get));
}

#[tokio::test]
async fn failed_workers_do_not_abort_siblings() {
    let requester: Arc<dyn Requester> = Arc::new(MockRequester::new(|i, call| {
        if i % 10 == 0 {
            Err(AuditError::transport(&call.url, "connection reset"))
        } else {
            Ok(HttpReply::new(200, token_page(&call.url, &fresh_token(i))))
        }
    }));

    let result = race_probe(requester, URL, &RequestConfig::default(), RACE_BATCH_SIZE).await;
    assert_eq!(result.failures, 3);
    assert_eq!(result.tokens.len(), 27);
    assert_eq!(result.verdict, RaceVerdict::Unique);
}

#[test]
fn verdict_from_merged_tokens() {
    let unique = RaceResult::from_tokens((0..30).map(fresh_token).collect(), 0);
    assert_eq!(unique.verdict, RaceVerdict::Unique);

    let mut repeated: Vec<String> = (0..29).map(fresh_token).collect();
    repeated.push(fresh_token(0));
    assert_eq!(RaceResult::from_tokens(repeated, 0).verdict, RaceVerdict::Shared);

    assert_eq!(RaceResult::from_tokens(Vec::new(), 30).verdict, RaceVerdict::Unique);
}

#[test]
fn only_strong_word_values_are_candidates() {
    let html = r#"<form>
        <input name="csrf" value="a1b2c3d4e5f6g7h8">
        <input name="lang" value="en">
        <input name="next" value="/account/settings?tab=1">
        <input name="submit" value="Save changes">
    </form>"#;
    assert_eq!(extract_candidates(URL, html), vec!["a1b2c3d4e5f6g7h8".to_string()]);
}

// ============================================
// Seed Selection
// ============================================

#[test]
fn seed_skips_empty_tokens() {
    let corpus: TokenCorpus = vec![
        TokenObservation::new("https://shop.test/a", ""),
        TokenObservation::new("https://shop.test/b", "a1b2c3d4e5f6g7h8"),
    ]
    .into();
    let mut rng = StdRng::seed_from_u64(9);
    let seed = select_seed(&corpus, &mut rng, 100).unwrap();
    assert_eq!(seed.url, "https://shop.test/b");
}

#[test]
fn seed_search_is_bounded() {
    let corpus: TokenCorpus = vec![TokenObservation::new("https://shop.test/a", "")].into();
    let mut rng = StdRng::seed_from_u64(9);
    let err = select_seed(&corpus, &mut rng, 5).unwrap_err();
    assert!(matches!(err, AuditError::NoUsableToken { attempts: 5 }));
}

#[test]
fn seed_from_empty_corpus_fails() {
    let mut rng = StdRng::seed_from_u64(9);
    assert!(select_seed(&TokenCorpus::new(), &mut rng, 5).is_err());
}
