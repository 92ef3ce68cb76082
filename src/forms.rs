// HTML form handling for csrfprobe
// Extracts forms with scraper and turns them into canonical requests

use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{Form, FormInput, ParsedForm};
use crate::token::{is_token_name, looks_like_token};

lazy_static! {
    static ref FORM_SEL: Selector = Selector::parse("form").unwrap();
    static ref FIELD_SEL: Selector = Selector::parse("input, textarea, select").unwrap();
    static ref OPTION_SEL: Selector = Selector::parse("option").unwrap();
}

/// Parse every `<form>` in a page.
///
/// Actions are resolved against `page_url`; a missing action submits back to
/// the page itself. Methods are lower-cased and default to `get`.
pub fn parse_forms(page_url: &str, html: &str) -> Vec<Form> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    document
        .select(&FORM_SEL)
        .map(|form| {
            let raw_action = form.value().attr("action").unwrap_or("").trim();
            let action = match &base {
                Some(base) if raw_action.is_empty() => base.to_string(),
                Some(base) => base
                    .join(raw_action)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| raw_action.to_string()),
                None if raw_action.is_empty() => page_url.to_string(),
                None => raw_action.to_string(),
            };
            let method = form
                .value()
                .attr("method")
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "get".to_string());
            let inputs = form.select(&FIELD_SEL).map(read_field).collect();

            Form { action, method, inputs }
        })
        .collect()
}

fn read_field(field: ElementRef<'_>) -> FormInput {
    let element = field.value();
    let name = element.attr("name").unwrap_or("").to_string();
    let (kind, value) = match element.name() {
        "textarea" => ("textarea".to_string(), field.text().collect::<String>()),
        "select" => {
            let options: Vec<ElementRef<'_>> = field.select(&OPTION_SEL).collect();
            let chosen = options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first());
            let value = chosen
                .map(|o| {
                    o.value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| o.text().collect::<String>())
                })
                .unwrap_or_default();
            ("select".to_string(), value)
        }
        _ => (
            element.attr("type").unwrap_or("text").to_lowercase(),
            element.attr("value").unwrap_or("").to_string(),
        ),
    };

    FormInput { name, kind, value }
}

/// Turn a form into a canonical `(is_get, url, params)` request.
///
/// Strict mode only accepts forms carrying a token-shaped value. Tolerant mode
/// also accepts a form whose field names look like an anti-CSRF field even
/// when the value itself is weak.
pub fn datanize(form: &Form, tolerate: bool) -> Option<ParsedForm> {
    let params: HashMap<String, String> = form
        .inputs
        .iter()
        .filter(|i| !i.name.is_empty())
        .map(|i| (i.name.clone(), i.value.clone()))
        .collect();
    if params.is_empty() {
        return None;
    }

    let token_fields: BTreeSet<String> = params
        .iter()
        .filter(|(name, value)| looks_like_token(value) || (tolerate && is_token_name(name)))
        .map(|(name, _)| name.clone())
        .collect();
    if token_fields.is_empty() {
        return None;
    }

    Some(ParsedForm {
        is_get: form.method == "get",
        url: form.action.clone(),
        params,
        token_fields,
    })
}

/// First form on a page that `datanize` accepts.
pub fn datanize_first(forms: &[Form], tolerate: bool) -> Option<ParsedForm> {
    forms.iter().find_map(|f| datanize(f, tolerate))
}

/// True if any form still carries a token-shaped value.
pub fn is_protected(forms: &[Form]) -> bool {
    forms
        .iter()
        .flat_map(|f| f.inputs.iter())
        .any(|i| looks_like_token(&i.value))
}
