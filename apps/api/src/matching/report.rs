//! Report assembly.
//!
//! Turns a match outcome plus format flags into the final client-facing
//! report: score, keyword partition, verdict copy, and capped suggestions.
//! Pure aggregation; nothing here does I/O.

use serde::Serialize;

use super::format_check::FormatFlag;
use super::matcher::{MatchOutcome, ScoredKeyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisWarning {
    /// The job description yielded no vocabulary terms; the score is 0 by
    /// definition and not meaningful.
    NoKeywordsExtracted,
}

/// The complete analysis result for one résumé / job-description pair.
/// Deterministic: identical inputs serialize to identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub score: u8,
    pub matched_keywords: Vec<ScoredKeyword>,
    pub missing_keywords: Vec<ScoredKeyword>,
    pub format_flags: Vec<FormatFlag>,
    pub ats_friendly: bool,
    pub warnings: Vec<AnalysisWarning>,
    pub summary: String,
    pub suggestions: Vec<String>,
}

pub fn build_report(
    outcome: MatchOutcome,
    format_flags: Vec<FormatFlag>,
    max_suggestions: usize,
) -> MatchReport {
    let mut warnings = Vec::new();
    if outcome.no_keywords {
        warnings.push(AnalysisWarning::NoKeywordsExtracted);
    }

    let suggestions = build_suggestions(&outcome.missing, &format_flags, max_suggestions);
    let summary = build_summary(outcome.score);
    let ats_friendly = format_flags.is_empty();

    MatchReport {
        score: outcome.score,
        matched_keywords: outcome.matched,
        missing_keywords: outcome.missing,
        format_flags,
        ats_friendly,
        warnings,
        summary,
        suggestions,
    }
}

fn build_summary(score: u8) -> String {
    if score >= 80 {
        "Excellent match! Your resume is well-aligned with this job.".to_string()
    } else if score >= 60 {
        "Good match. With a few improvements, you can increase your chances.".to_string()
    } else {
        "Your resume needs significant improvements to match this job.".to_string()
    }
}

/// Missing keywords first (highest weight first, as ordered by the matcher),
/// then one remediation per format flag, then a closing tip if room remains.
fn build_suggestions(
    missing: &[ScoredKeyword],
    flags: &[FormatFlag],
    max_suggestions: usize,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    for keyword in missing {
        if suggestions.len() >= max_suggestions {
            return suggestions;
        }
        suggestions.push(format!("Add {} to your skills section", keyword.keyword));
    }

    for flag in flags {
        if suggestions.len() >= max_suggestions {
            return suggestions;
        }
        suggestions.push(flag_suggestion(*flag).to_string());
    }

    if suggestions.len() < max_suggestions {
        suggestions.push("Quantify your achievements with metrics".to_string());
    }

    suggestions
}

fn flag_suggestion(flag: FormatFlag) -> &'static str {
    match flag {
        FormatFlag::MultiColumnLayout => {
            "Switch to a single-column layout so parsers read your resume in order"
        }
        FormatFlag::NonStandardSectionHeadings => {
            "Use standard section headings such as Experience, Education, and Skills"
        }
        FormatFlag::TableBasedLayout => {
            "Move content out of tables; many parsers scramble table cells"
        }
        FormatFlag::TextInImage => "Replace image-based content with selectable text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(keyword: &str, weight: f32) -> ScoredKeyword {
        ScoredKeyword {
            keyword: keyword.to_string(),
            weight,
        }
    }

    fn make_outcome(score: u8, matched: Vec<ScoredKeyword>, missing: Vec<ScoredKeyword>) -> MatchOutcome {
        MatchOutcome {
            score,
            matched,
            missing,
            no_keywords: false,
        }
    }

    #[test]
    fn test_suggestions_order_missing_then_flags_then_tip() {
        let outcome = make_outcome(
            67,
            vec![scored("React", 2.0)],
            vec![scored("Next.js", 1.0)],
        );
        let report = build_report(outcome, vec![FormatFlag::TableBasedLayout], 5);

        assert_eq!(
            report.suggestions,
            vec![
                "Add Next.js to your skills section",
                "Move content out of tables; many parsers scramble table cells",
                "Quantify your achievements with metrics",
            ]
        );
    }

    #[test]
    fn test_suggestions_respect_the_cap() {
        let missing = vec![
            scored("React", 2.0),
            scored("TypeScript", 2.0),
            scored("Next.js", 1.0),
            scored("AWS", 1.0),
            scored("Docker", 1.0),
            scored("Kubernetes", 0.5),
        ];
        let outcome = make_outcome(10, vec![], missing);
        let report = build_report(outcome, vec![FormatFlag::MultiColumnLayout], 5);

        assert_eq!(report.suggestions.len(), 5);
        assert_eq!(report.suggestions[0], "Add React to your skills section");
        assert_eq!(report.suggestions[4], "Add Docker to your skills section");
    }

    #[test]
    fn test_perfect_match_still_gets_the_closing_tip() {
        let outcome = make_outcome(100, vec![scored("React", 2.0)], vec![]);
        let report = build_report(outcome, vec![], 5);

        assert_eq!(
            report.suggestions,
            vec!["Quantify your achievements with metrics"]
        );
    }

    #[test]
    fn test_summary_thresholds() {
        let summary = |score| build_report(make_outcome(score, vec![], vec![]), vec![], 5).summary;

        assert!(summary(100).starts_with("Excellent match!"));
        assert!(summary(80).starts_with("Excellent match!"));
        assert!(summary(79).starts_with("Good match."));
        assert!(summary(60).starts_with("Good match."));
        assert!(summary(59).starts_with("Your resume needs"));
        assert!(summary(0).starts_with("Your resume needs"));
    }

    #[test]
    fn test_ats_friendly_tracks_flags() {
        let clean = build_report(make_outcome(90, vec![], vec![]), vec![], 5);
        assert!(clean.ats_friendly);

        let flagged = build_report(
            make_outcome(90, vec![], vec![]),
            vec![FormatFlag::TextInImage],
            5,
        );
        assert!(!flagged.ats_friendly);
    }

    #[test]
    fn test_no_keywords_warning_propagates() {
        let outcome = MatchOutcome {
            score: 0,
            matched: vec![],
            missing: vec![],
            no_keywords: true,
        };
        let report = build_report(outcome, vec![], 5);

        assert_eq!(report.warnings, vec![AnalysisWarning::NoKeywordsExtracted]);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_report_serialization_shape() {
        let outcome = make_outcome(80, vec![scored("React", 2.0)], vec![scored("Next.js", 1.0)]);
        let report = build_report(outcome, vec![FormatFlag::TableBasedLayout], 5);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["score"], 80);
        assert_eq!(value["matched_keywords"][0]["keyword"], "React");
        assert_eq!(value["matched_keywords"][0]["weight"], 2.0);
        assert_eq!(value["format_flags"][0], "TABLE_BASED_LAYOUT");
        assert_eq!(value["ats_friendly"], false);
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_warning_serializes_screaming_snake() {
        let value = serde_json::to_value(AnalysisWarning::NoKeywordsExtracted).unwrap();
        assert_eq!(value, "NO_KEYWORDS_EXTRACTED");
    }
}
