// Core data models for csrfprobe

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A token value seen on a crawled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenObservation {
    pub url: String,
    pub token: String,
}

impl TokenObservation {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }
}

/// Every (url, token) observation collected during evaluation, in crawl order.
///
/// Append-only while building; analyzers only ever borrow it.
#[derive(Debug, Clone, Default)]
pub struct TokenCorpus {
    observations: Vec<TokenObservation>,
}

impl TokenCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, url: impl Into<String>, token: impl Into<String>) {
        self.observations.push(TokenObservation::new(url, token));
    }

    pub fn observations(&self) -> &[TokenObservation] {
        &self.observations
    }

    /// Flat token values, duplicates preserved.
    pub fn tokens(&self) -> Vec<&str> {
        self.observations.iter().map(|o| o.token.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl From<Vec<TokenObservation>> for TokenCorpus {
    fn from(observations: Vec<TokenObservation>) -> Self {
        Self { observations }
    }
}

/// One `<input>` of a parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub kind: String,
    pub value: String,
}

/// A form as found in a page, action already resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
}

/// Canonical request derived from a form.
///
/// `token_fields` names the parameters identified as the anti-CSRF field,
/// either by a token-shaped value or by a common token name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForm {
    pub is_get: bool,
    pub url: String,
    pub params: HashMap<String, String>,
    pub token_fields: BTreeSet<String>,
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

/// Forms discovered on each crawled page, pages in crawl order.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub forms_by_url: Vec<(String, Vec<Form>)>,
    pub urls_visited: usize,
}

impl CrawlResult {
    pub fn form_count(&self) -> usize {
        self.forms_by_url.iter().map(|(_, forms)| forms.len()).sum()
    }
}

/// The three bypass trials run against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialVariant {
    Remove,
    Clear,
    Forge,
}

impl fmt::Display for TrialVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialVariant::Remove => write!(f, "REMOVE"),
            TrialVariant::Clear => write!(f, "CLEAR"),
            TrialVariant::Forge => write!(f, "FORGE"),
        }
    }
}
