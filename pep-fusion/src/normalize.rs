//! Claim normalization
//!
//! Canonicalizes role titles, organisation names and grouping keys. Every
//! function is pure, total and idempotent; empty input yields "".

use once_cell::sync::Lazy;
use regex::Regex;

/// Title lexicon, most specific first
///
/// A generic pattern must never shadow a more specific one
/// ("vice president" is tried before "president").
static TITLE_LEXICON: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bvice\s+president\b", "Vice President"),
        (r"\bdeputy\s+governor\b", "Deputy Governor"),
        (r"\bprime\s+minister\b", "Prime Minister"),
        (r"\bhead\s+of\s+state\b", "Head of State"),
        (r"\bchief\s+justice\b", "Chief Justice"),
        (r"\bpermanent\s+secretary\b", "Permanent Secretary"),
        (r"\bhouse\s+of\s+representatives\b", "Member of House of Representatives"),
        (r"\bpresident\b", "President"),
        (r"\bgovernor\b", "Governor"),
        (r"\bsenator\b", "Senator"),
        (r"\bminister\b", "Minister"),
        (r"\bcommissioner\b", "Commissioner"),
    ]
    .into_iter()
    .filter_map(|(pattern, canonical)| {
        Regex::new(&format!("(?i){}", pattern))
            .ok()
            .map(|re| (re, canonical))
    })
    .collect()
});

/// Organisation synonyms, keyed by `normalize_key`
const ORG_DICTIONARY: &[(&str, &str)] = &[
    ("federal republic of nigeria", "Federal Republic of Nigeria"),
    ("federal government of nigeria", "Federal Republic of Nigeria"),
    ("lagos state government", "Lagos State Government"),
];

/// Case and whitespace fold used for every grouping key
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical role title
///
/// Lexicon hit → canonical title; otherwise trimmed, whitespace-collapsed
/// title case.
pub fn normalize_title(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    for (pattern, canonical) in TITLE_LEXICON.iter() {
        if pattern.is_match(raw) {
            return canonical.to_string();
        }
    }

    title_case(raw)
}

/// Canonical organisation name (dictionary lookup, else trimmed input)
pub fn normalize_org(raw: &str) -> String {
    let key = normalize_key(raw);
    if key.is_empty() {
        return String::new();
    }

    ORG_DICTIONARY
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stateless facade over the normalization functions
///
/// Handed to components that want an injectable normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimNormalizer;

impl ClaimNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_title(&self, raw: &str) -> String {
        normalize_title(raw)
    }

    pub fn normalize_org(&self, raw: &str) -> String {
        normalize_org(raw)
    }

    pub fn normalize_key(&self, raw: &str) -> String {
        normalize_key(raw)
    }
}
