//! Keyword extraction from job descriptions.
//!
//! Walks the token stream, keeps only controlled-vocabulary terms, and weights
//! each occurrence by the section it appears in. Requirements count double,
//! nice-to-haves count half, everything else is neutral.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::sections::SectionMap;
use super::tokenize::Token;
use super::{SectionWeights, Vocabulary};

/// One extracted keyword with its accumulated evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    /// Canonical lowercase term, the matching key.
    pub term: String,
    /// Human-facing spelling ("Next.js", not "next.js").
    pub display: String,
    pub frequency: u32,
    pub weight: f32,
    /// Byte offset of the first occurrence; tie-breaker for ordering.
    pub first_seen: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordSet {
    pub entries: Vec<KeywordEntry>,
}

impl KeywordSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|e| e.weight).sum()
    }
}

struct Accum {
    frequency: u32,
    weight: f32,
    first_seen: usize,
}

/// Extract weighted keywords from a tokenized job description. Tokens outside
/// the vocabulary are ignored, never guessed. Entries come back ordered by
/// descending weight, ties broken by first occurrence, truncated to
/// `max_keywords`.
pub fn extract_keywords(
    tokens: &[Token],
    sections: &SectionMap,
    vocab: &Vocabulary,
    weights: &SectionWeights,
    max_keywords: usize,
) -> KeywordSet {
    let mut by_term: BTreeMap<&str, Accum> = BTreeMap::new();

    for token in tokens {
        if !vocab.is_term(&token.text) {
            continue;
        }
        let multiplier = weights.multiplier(sections.kind_at(token.span.start));
        let accum = by_term.entry(token.text.as_str()).or_insert(Accum {
            frequency: 0,
            weight: 0.0,
            first_seen: token.span.start,
        });
        accum.frequency += 1;
        accum.weight += multiplier;
    }

    let mut entries: Vec<KeywordEntry> = by_term
        .into_iter()
        .map(|(term, accum)| KeywordEntry {
            term: term.to_string(),
            display: vocab.display(term),
            frequency: accum.frequency,
            weight: accum.weight,
            first_seen: accum.first_seen,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    entries.truncate(max_keywords);

    KeywordSet { entries }
}
