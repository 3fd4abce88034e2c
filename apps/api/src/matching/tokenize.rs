//! Tokenization and normalization.
//!
//! Splits extracted text into lowercase tokens, folds synonyms and known
//! multi-word phrases onto canonical terms, and drops stop words. Tokens keep
//! their byte span in the source text so later stages can locate them.

use std::ops::Range;

use super::Vocabulary;

/// A normalized token: canonical lowercase text plus the byte range it was
/// read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
struct RawToken {
    lower: String,
    span: Range<usize>,
}

impl Vocabulary {
    /// Tokenize text against this vocabulary. Multi-word phrases are folded
    /// greedily (longest first) before single-token rules apply, so
    /// "ruby on rails" survives even though "on" is a stop word.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let raw = raw_tokens(text);
        let mut tokens = Vec::new();

        let mut i = 0;
        while i < raw.len() {
            if let Some((canonical, len)) = self.fold_phrase(&raw[i..]) {
                tokens.push(Token {
                    text: canonical,
                    span: raw[i].span.start..raw[i + len - 1].span.end,
                });
                i += len;
                continue;
            }

            let tok = &raw[i];
            i += 1;

            if is_stop_word(&tok.lower) && !self.knows(&tok.lower) {
                continue;
            }
            let canonical = self.fold(&tok.lower);
            // Single letters are noise unless the vocabulary says otherwise
            // (R and Go both matter).
            if canonical.chars().count() < 2 && !self.knows(&canonical) {
                continue;
            }
            tokens.push(Token {
                text: canonical,
                span: tok.span.clone(),
            });
        }

        tokens
    }

    fn fold_phrase(&self, raw: &[RawToken]) -> Option<(String, usize)> {
        let upper = self.max_phrase_len().min(raw.len());
        for len in (2..=upper).rev() {
            let key = raw[..len]
                .iter()
                .map(|t| t.lower.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(canonical) = self.phrase(&key) {
                return Some((canonical.to_string(), len));
            }
        }
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// Scan text into lowercase words. `+` and `#` count as word characters so
/// "c++" and "c#" stay whole; `.`, `/`, and `-` join a token only when
/// flanked by word characters ("node.js", "ci/cd"), so trailing punctuation
/// never sticks.
fn raw_tokens(text: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if is_word_char(c) {
            match current.as_mut() {
                Some((_, buf)) => buf.extend(c.to_lowercase()),
                None => {
                    let mut buf = String::new();
                    buf.extend(c.to_lowercase());
                    current = Some((i, buf));
                }
            }
            continue;
        }

        if (c == '.' || c == '/' || c == '-') && current.is_some() {
            if let Some(&(_, next)) = chars.peek() {
                if is_word_char(next) {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push(c);
                    }
                    continue;
                }
            }
        }

        if let Some((start, lower)) = current.take() {
            tokens.push(RawToken {
                lower,
                span: start..i,
            });
        }
    }

    if let Some((start, lower)) = current.take() {
        tokens.push(RawToken {
            lower,
            span: start..text.len(),
        });
    }

    tokens
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

// Kept sorted; `is_stop_word` binary-searches it.
const STOP_WORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "did",
    "do", "does", "down", "each", "few", "for", "from", "had", "has", "have", "he", "her", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no",
    "not", "of", "on", "or", "other", "our", "out", "over", "own", "same", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "through",
    "to", "too", "under", "until", "up", "us", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "why", "will", "with", "would", "you", "your",
];
