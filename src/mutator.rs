// Request tweaking for csrfprobe
// Removes, clears or forges the token parameter of a canonical request

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::ParsedForm;

/// Characters observed across the corpus, split by class.
///
/// Forged tokens only draw from characters the server has actually issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    pub digits: Vec<char>,
    pub lower: Vec<char>,
    pub upper: Vec<char>,
}

/// Build the seed set for forged tokens from every collected token value.
pub fn ranger(tokens: &[&str]) -> SeedSet {
    let mut seeds = SeedSet::default();
    for ch in tokens.iter().flat_map(|t| t.chars()) {
        if ch.is_ascii_digit() {
            seeds.digits.push(ch);
        } else if ch.is_ascii_lowercase() {
            seeds.lower.push(ch);
        } else if ch.is_ascii_uppercase() {
            seeds.upper.push(ch);
        }
    }
    for class in [&mut seeds.digits, &mut seeds.lower, &mut seeds.upper] {
        class.sort_unstable();
        class.dedup();
    }
    seeds
}

#[derive(Debug, Clone, Copy)]
pub enum TweakMode<'a> {
    /// Drop the token parameter entirely.
    Remove,
    /// Keep the parameter with an empty value.
    Clear,
    /// Replace the token with a forged value of the same shape.
    Generate(&'a SeedSet),
}

/// Apply `mode` to the form's token fields; other parameters pass through.
pub fn tweak<R: Rng + ?Sized>(
    form: &ParsedForm,
    mode: TweakMode<'_>,
    rng: &mut R,
) -> HashMap<String, String> {
    let mut tweaked = HashMap::with_capacity(form.params.len());
    for (name, value) in &form.params {
        if !form.token_fields.contains(name) {
            tweaked.insert(name.clone(), value.clone());
            continue;
        }
        match mode {
            TweakMode::Remove => {}
            TweakMode::Clear => {
                tweaked.insert(name.clone(), String::new());
            }
            TweakMode::Generate(seeds) => {
                tweaked.insert(name.clone(), forge_token(value, seeds, rng));
            }
        }
    }
    tweaked
}

/// Swap each alphanumeric character for a random seed of the same class.
fn forge_token<R: Rng + ?Sized>(value: &str, seeds: &SeedSet, rng: &mut R) -> String {
    value
        .chars()
        .map(|ch| {
            let class = if ch.is_ascii_digit() {
                &seeds.digits
            } else if ch.is_ascii_lowercase() {
                &seeds.lower
            } else if ch.is_ascii_uppercase() {
                &seeds.upper
            } else {
                return ch;
            };
            class.choose(rng).copied().unwrap_or(ch)
        })
        .collect()
}
