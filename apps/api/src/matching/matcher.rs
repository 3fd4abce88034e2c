//! Keyword matching and scoring.
//!
//! A job keyword matches iff its canonical term appears among the résumé's
//! canonical tokens. No fuzzy matching: the tokenizer already folded synonyms,
//! so equality here is exact string equality.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use super::keywords::{KeywordEntry, KeywordSet};
use super::tokenize::Token;

/// A keyword as it appears in the report: display spelling plus its weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredKeyword {
    pub keyword: String,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub score: u8,
    pub matched: Vec<ScoredKeyword>,
    pub missing: Vec<ScoredKeyword>,
    /// True when the job description produced no keywords at all. The caller
    /// reports this as a warning, not an error.
    pub no_keywords: bool,
}

/// Partition job keywords into matched and missing against the résumé's
/// token set, and score the match by weight coverage.
pub fn match_keywords(resume_tokens: &[Token], job_keywords: &KeywordSet) -> MatchOutcome {
    if job_keywords.is_empty() {
        return MatchOutcome {
            score: 0,
            matched: Vec::new(),
            missing: Vec::new(),
            no_keywords: true,
        };
    }

    let present: BTreeSet<&str> = resume_tokens.iter().map(|t| t.text.as_str()).collect();

    let mut matched: Vec<&KeywordEntry> = Vec::new();
    let mut missing: Vec<&KeywordEntry> = Vec::new();
    let mut matched_weight = 0.0_f32;
    let mut total_weight = 0.0_f32;

    for entry in &job_keywords.entries {
        total_weight += entry.weight;
        if present.contains(entry.term.as_str()) {
            matched_weight += entry.weight;
            matched.push(entry);
        } else {
            missing.push(entry);
        }
    }

    let score = compute_score(
        matched_weight,
        total_weight,
        matched.is_empty(),
        missing.is_empty(),
    );

    MatchOutcome {
        score,
        matched: to_scored(matched),
        missing: to_scored(missing),
        no_keywords: false,
    }
}

/// Weight-coverage score with exact boundary semantics: 0 only when nothing
/// matched, 100 only when everything matched. Everything in between clamps
/// to 1..=99 so rounding cannot fake a boundary.
fn compute_score(matched_weight: f32, total_weight: f32, none_matched: bool, all_matched: bool) -> u8 {
    if none_matched || total_weight <= 0.0 {
        return 0;
    }
    if all_matched {
        return 100;
    }
    let raw = ((matched_weight / total_weight) * 100.0).round() as u8;
    raw.clamp(1, 99)
}

fn to_scored(mut entries: Vec<&KeywordEntry>) -> Vec<ScoredKeyword> {
    entries.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    entries
        .into_iter()
        .map(|e| ScoredKeyword {
            keyword: e.display.clone(),
            weight: e.weight,
        })
        .collect()
}
