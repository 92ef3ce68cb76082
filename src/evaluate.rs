// Form evaluation for csrfprobe
// Builds the token corpus from crawled forms and flags weak tokens and unprotected forms

use std::collections::HashSet;

use crate::models::{CrawlResult, Form, TokenCorpus};
use crate::token::{is_strong_token, is_token_name, is_word_value};

/// A token-named field whose value is too weak to count as a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakToken {
    pub url: String,
    pub name: String,
    pub value: String,
}

/// A form with no token at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsecureForm {
    pub url: String,
    pub form: Form,
}

#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub corpus: TokenCorpus,
    pub weak_tokens: Vec<WeakToken>,
    pub insecure_forms: Vec<InsecureForm>,
}

/// Walk every crawled form in crawl order.
///
/// The first strong value of a form is its token; each distinct token is
/// recorded once per page. Forms without one are reported insecure, once per
/// action.
pub fn evaluate(crawl: &CrawlResult) -> Evaluation {
    let mut evaluation = Evaluation::default();
    let mut seen_actions: HashSet<String> = HashSet::new();

    for (url, forms) in &crawl.forms_by_url {
        let mut page_tokens: Vec<String> = Vec::new();

        for form in forms {
            let mut protected = false;
            for input in &form.inputs {
                if input.value.is_empty() || !is_word_value(&input.value) {
                    continue;
                }
                if is_strong_token(&input.value) {
                    if !page_tokens.contains(&input.value) {
                        page_tokens.push(input.value.clone());
                    }
                    protected = true;
                    break;
                } else if is_token_name(&input.name) {
                    evaluation.weak_tokens.push(WeakToken {
                        url: url.clone(),
                        name: input.name.clone(),
                        value: input.value.clone(),
                    });
                }
            }

            if !protected && seen_actions.insert(form.action.clone()) {
                evaluation.insecure_forms.push(InsecureForm {
                    url: url.clone(),
                    form: form.clone(),
                });
            }
        }

        for token in page_tokens {
            evaluation.corpus.record(url.clone(), token);
        }
    }

    evaluation
}
