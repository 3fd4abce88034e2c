//! Resume / job-description matching pipeline.
//!
//! Pure, deterministic core: extraction feeds the tokenizer, keywords come
//! out of the job description, the matcher partitions them against the
//! résumé, and the report builder assembles the client-facing result. The
//! engine is built once at startup and shared read-only across requests.

pub mod extract;
pub mod format_check;
pub mod handlers;
pub mod keywords;
pub mod matcher;
pub mod report;
pub mod sections;
pub mod tokenize;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use self::extract::ExtractedDoc;
use self::keywords::KeywordSet;
use self::report::MatchReport;
use self::sections::SectionKind;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Per-section score multipliers for job-description keywords.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SectionWeights {
    pub requirements: f32,
    pub nice_to_have: f32,
    pub body: f32,
}

impl Default for SectionWeights {
    fn default() -> Self {
        SectionWeights {
            requirements: 2.0,
            nice_to_have: 0.5,
            body: 1.0,
        }
    }
}

impl SectionWeights {
    pub fn multiplier(&self, kind: SectionKind) -> f32 {
        match kind {
            SectionKind::Requirements => self.requirements,
            SectionKind::NiceToHave => self.nice_to_have,
            SectionKind::Body => self.body,
        }
    }
}

/// Tunable matching parameters. Ships with built-in defaults; a JSON file can
/// override any subset of fields (`MATCHING_CONFIG` env var).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Alternate spelling → display form of the target term ("js" → "JavaScript").
    pub synonyms: BTreeMap<String, String>,
    /// Display forms of recognized terms. Only these can become keywords.
    pub vocabulary: Vec<String>,
    pub section_weights: SectionWeights,
    pub max_keywords: usize,
    pub max_suggestions: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            synonyms: default_synonyms(),
            vocabulary: default_vocabulary(),
            section_weights: SectionWeights::default(),
            max_keywords: 40,
            max_suggestions: 5,
        }
    }
}

impl MatchingConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read matching config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid matching config at {}", path.display()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vocabulary — lookup tables built once from the config
// ────────────────────────────────────────────────────────────────────────────

/// Lowercased lookup tables derived from `MatchingConfig`. Terms are keyed by
/// canonical form; synonyms fold onto canonical forms; multi-word variants
/// live in a separate phrase table keyed by space-joined words.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    canon_to_display: BTreeMap<String, String>,
    synonym_to_canon: BTreeMap<String, String>,
    phrases: BTreeMap<String, String>,
    max_phrase_len: usize,
}

impl Vocabulary {
    pub fn build(config: &MatchingConfig) -> Self {
        let mut canon_to_display = BTreeMap::new();
        let mut synonym_to_canon = BTreeMap::new();
        let mut phrases = BTreeMap::new();
        let mut max_phrase_len = 1;

        for display in &config.vocabulary {
            let canonical = display.to_lowercase();
            let words = canonical.split_whitespace().count();
            if words > 1 {
                phrases.insert(canonical.clone(), canonical.clone());
                max_phrase_len = max_phrase_len.max(words);
            }
            canon_to_display.insert(canonical, display.clone());
        }

        for (variant, target) in &config.synonyms {
            let canonical = target.to_lowercase();
            let variant = variant.to_lowercase();
            let words = variant.split_whitespace().count();
            if words > 1 {
                max_phrase_len = max_phrase_len.max(words);
                phrases.insert(variant, canonical);
            } else {
                synonym_to_canon.insert(variant, canonical);
            }
        }

        Vocabulary {
            canon_to_display,
            synonym_to_canon,
            phrases,
            max_phrase_len,
        }
    }

    /// Whether `canonical` is a recognized vocabulary term.
    pub fn is_term(&self, canonical: &str) -> bool {
        self.canon_to_display.contains_key(canonical)
    }

    /// Display form of a canonical term ("next.js" → "Next.js").
    pub fn display(&self, canonical: &str) -> String {
        self.canon_to_display
            .get(canonical)
            .cloned()
            .unwrap_or_else(|| canonical.to_string())
    }

    /// Whether the word is a term or a known synonym of one.
    fn knows(&self, word: &str) -> bool {
        self.is_term(word) || self.synonym_to_canon.contains_key(word)
    }

    /// Fold a single word onto its canonical form; unknown words pass through.
    fn fold(&self, word: &str) -> String {
        self.synonym_to_canon
            .get(word)
            .cloned()
            .unwrap_or_else(|| word.to_string())
    }

    fn phrase(&self, key: &str) -> Option<&str> {
        self.phrases.get(key).map(String::as_str)
    }

    fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MatchEngine — one pipeline run per request
// ────────────────────────────────────────────────────────────────────────────

/// The matching pipeline with its config and prebuilt vocabulary. Stateless
/// across requests; `analyze` has no side effects.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchingConfig,
    vocabulary: Vocabulary,
}

impl MatchEngine {
    pub fn new(config: MatchingConfig) -> Self {
        let vocabulary = Vocabulary::build(&config);
        MatchEngine { config, vocabulary }
    }

    /// Run the full pipeline over an extracted résumé / job-description pair.
    pub fn analyze(&self, resume: &ExtractedDoc, job: &ExtractedDoc) -> MatchReport {
        let resume_tokens = self.vocabulary.tokenize(&resume.text);
        let job_keywords = self.job_keywords(&job.text);
        let outcome = matcher::match_keywords(&resume_tokens, &job_keywords);
        let flags = format_check::check_format(resume);
        report::build_report(outcome, flags, self.config.max_suggestions)
    }

    /// Tokenize a job description and extract its weighted keywords. Also
    /// serves the standalone keyword-preview endpoint.
    pub fn job_keywords(&self, text: &str) -> KeywordSet {
        let tokens = self.vocabulary.tokenize(text);
        let sections = sections::detect_sections(text);
        keywords::extract_keywords(
            &tokens,
            &sections,
            &self.vocabulary,
            &self.config.section_weights,
            self.config.max_keywords,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in vocabulary and synonyms
// ────────────────────────────────────────────────────────────────────────────

fn default_vocabulary() -> Vec<String> {
    [
        // Languages
        "JavaScript",
        "TypeScript",
        "Python",
        "Java",
        "C++",
        "C#",
        "Go",
        "Rust",
        "Ruby",
        "PHP",
        "Swift",
        "Kotlin",
        "Scala",
        "R",
        "SQL",
        "HTML",
        "CSS",
        "Sass",
        "Bash",
        // Frontend
        "React",
        "Next.js",
        "Vue",
        "Angular",
        "Svelte",
        "Redux",
        "Tailwind",
        "Bootstrap",
        "jQuery",
        "Webpack",
        "Vite",
        "Frontend",
        "UI/UX",
        "Responsive Design",
        "Accessibility",
        // Backend
        "Node.js",
        "Express",
        "Django",
        "Flask",
        "FastAPI",
        "Rails",
        "Spring",
        "Laravel",
        "GraphQL",
        "REST APIs",
        "Microservices",
        "Backend",
        "Full Stack",
        "WebSockets",
        "gRPC",
        // Cloud & DevOps
        "AWS",
        "Azure",
        "GCP",
        "Docker",
        "Kubernetes",
        "Terraform",
        "CI/CD",
        "Jenkins",
        "DevOps",
        "Linux",
        "Nginx",
        "Serverless",
        "Lambda",
        // Data
        "PostgreSQL",
        "MySQL",
        "MongoDB",
        "Redis",
        "Elasticsearch",
        "Kafka",
        "SQLite",
        "DynamoDB",
        "ETL",
        "Data Analysis",
        "Machine Learning",
        "TensorFlow",
        "PyTorch",
        "Pandas",
        "NumPy",
        "Spark",
        // Tooling & practices
        "Git",
        "GitHub",
        "GitLab",
        "Jest",
        "Cypress",
        "Playwright",
        "Selenium",
        "Unit Testing",
        "TDD",
        "Agile",
        "Scrum",
        "Jira",
        "Figma",
        // Soft skills
        "Communication",
        "Leadership",
        "Teamwork",
        "Problem Solving",
        "Mentoring",
        "Project Management",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_synonyms() -> BTreeMap<String, String> {
    [
        ("js", "JavaScript"),
        ("es6", "JavaScript"),
        ("ecmascript", "JavaScript"),
        ("ts", "TypeScript"),
        ("python3", "Python"),
        ("golang", "Go"),
        ("reactjs", "React"),
        ("react.js", "React"),
        ("nextjs", "Next.js"),
        ("next js", "Next.js"),
        ("vuejs", "Vue"),
        ("vue.js", "Vue"),
        ("angularjs", "Angular"),
        ("node", "Node.js"),
        ("nodejs", "Node.js"),
        ("node js", "Node.js"),
        ("k8s", "Kubernetes"),
        ("postgres", "PostgreSQL"),
        ("mongo", "MongoDB"),
        ("html5", "HTML"),
        ("css3", "CSS"),
        ("scss", "Sass"),
        ("tailwindcss", "Tailwind"),
        ("tailwind css", "Tailwind"),
        ("amazon web services", "AWS"),
        ("google cloud", "GCP"),
        ("google cloud platform", "GCP"),
        ("continuous integration", "CI/CD"),
        ("continuous delivery", "CI/CD"),
        ("continuous deployment", "CI/CD"),
        ("ci cd", "CI/CD"),
        ("cicd", "CI/CD"),
        ("ml", "Machine Learning"),
        ("machine-learning", "Machine Learning"),
        ("ui", "UI/UX"),
        ("ux", "UI/UX"),
        ("ui ux", "UI/UX"),
        ("front-end", "Frontend"),
        ("front end", "Frontend"),
        ("back-end", "Backend"),
        ("back end", "Backend"),
        ("fullstack", "Full Stack"),
        ("full-stack", "Full Stack"),
        ("ruby on rails", "Rails"),
        ("ror", "Rails"),
        ("restful", "REST APIs"),
        ("rest api", "REST APIs"),
        ("rest apis", "REST APIs"),
        ("unit test", "Unit Testing"),
        ("unit tests", "Unit Testing"),
        ("test-driven development", "TDD"),
        ("dev ops", "DevOps"),
        ("problem-solving", "Problem Solving"),
        ("team player", "Teamwork"),
        ("team work", "Teamwork"),
        ("communication skills", "Communication"),
    ]
    .iter()
    .map(|(variant, target)| (variant.to_string(), target.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::report::AnalysisWarning;
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatchingConfig::default();
        assert_eq!(config.max_keywords, 40);
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.section_weights.requirements, 2.0);
        assert_eq!(config.section_weights.nice_to_have, 0.5);
        assert_eq!(config.section_weights.body, 1.0);
        assert!(!config.vocabulary.is_empty());
    }

    #[test]
    fn test_synonym_targets_are_vocabulary_terms() {
        let config = MatchingConfig::default();
        let vocab = Vocabulary::build(&config);
        for target in config.synonyms.values() {
            assert!(
                vocab.is_term(&target.to_lowercase()),
                "synonym target {target} is not in the vocabulary"
            );
        }
    }

    #[test]
    fn test_config_from_file_overrides_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matching.json");
        std::fs::write(
            &path,
            r#"{ "max_keywords": 10, "section_weights": { "requirements": 3.0 } }"#,
        )
        .unwrap();

        let config = MatchingConfig::from_file(&path).unwrap();
        assert_eq!(config.max_keywords, 10);
        assert_eq!(config.section_weights.requirements, 3.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.section_weights.body, 1.0);
        assert_eq!(config.max_suggestions, 5);
        assert!(!config.vocabulary.is_empty());
    }

    #[test]
    fn test_config_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matching.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(MatchingConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_vocabulary_display_forms() {
        let vocab = Vocabulary::build(&MatchingConfig::default());
        assert!(vocab.is_term("react"));
        assert!(vocab.is_term("next.js"));
        assert!(vocab.is_term("machine learning"));
        assert_eq!(vocab.display("next.js"), "Next.js");
        assert_eq!(vocab.display("ci/cd"), "CI/CD");
    }

    #[test]
    fn test_engine_weighted_end_to_end() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text("Senior engineer. React and TypeScript daily.");
        let job = ExtractedDoc::from_plain_text(
            "Requirements\nReact and TypeScript\nNice to have\nNext.js\n",
        );

        let report = engine.analyze(&resume, &job);

        // matched 2.0 + 2.0 out of 4.5 → 88.9 → 89
        assert_eq!(report.score, 89);
        let missing: Vec<&str> = report
            .missing_keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(missing, vec!["Next.js"]);
    }

    #[test]
    fn test_engine_scores_requirements_over_body_mentions() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text("Experienced React and TypeScript developer");
        // Next.js sits outside the requirements block, so it carries body weight.
        let job = ExtractedDoc::from_plain_text(
            "We build dashboards with Next.js.\nRequirements\nReact and TypeScript\n",
        );

        let report = engine.analyze(&resume, &job);

        assert_eq!(report.score, 80);
        let matched: Vec<&str> = report
            .matched_keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(matched, vec!["React", "TypeScript"]);
        let missing: Vec<&str> = report
            .missing_keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(missing, vec!["Next.js"]);
    }

    #[test]
    fn test_engine_folds_synonyms_across_documents() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text("Five years writing JS professionally");
        let job = ExtractedDoc::from_plain_text("We need deep JavaScript knowledge");

        let report = engine.analyze(&resume, &job);

        assert_eq!(report.score, 100);
        assert_eq!(report.matched_keywords[0].keyword, "JavaScript");
    }

    #[test]
    fn test_engine_is_deterministic() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text(
            "Experience\nReact, TypeScript, Docker, AWS\nEducation\nBSc\n",
        );
        let job = ExtractedDoc::from_plain_text(
            "Requirements\nReact, Next.js, TypeScript\nNice to have\nKubernetes\n",
        );

        let first = serde_json::to_string(&engine.analyze(&resume, &job)).unwrap();
        let second = serde_json::to_string(&engine.analyze(&resume, &job)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_job_text_warns_instead_of_failing() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text("React engineer");
        let job = ExtractedDoc::from_plain_text("");

        let report = engine.analyze(&resume, &job);

        assert_eq!(report.score, 0);
        assert!(report
            .warnings
            .contains(&AnalysisWarning::NoKeywordsExtracted));
        assert!(report.matched_keywords.is_empty());
        assert!(report.missing_keywords.is_empty());
    }

    #[test]
    fn test_jd_with_no_recognized_terms_warns() {
        let engine = MatchEngine::new(MatchingConfig::default());
        let resume = ExtractedDoc::from_plain_text("React engineer");
        let job = ExtractedDoc::from_plain_text("We want passionate synergy wizards");

        let report = engine.analyze(&resume, &job);

        assert_eq!(report.score, 0);
        assert!(report
            .warnings
            .contains(&AnalysisWarning::NoKeywordsExtracted));
    }
}
