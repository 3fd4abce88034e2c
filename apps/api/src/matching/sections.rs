//! Section detection for job descriptions and résumés.
//!
//! A line-oriented scan over the extracted text: heading lines open or close
//! weighted sections (requirements, nice-to-have), everything else is body.
//! No document tree; the output is a flat list of byte ranges.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Heading lines longer than this are treated as prose.
const MAX_HEADING_LEN: usize = 80;
const MAX_RESUME_HEADING_LEN: usize = 60;

static REQUIREMENTS_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(requirements?|required|qualifications?|must[ -]haves?|what you['’]ll need|what we['’]re looking for)\b",
    )
    .expect("valid regex")
});

static NICE_TO_HAVE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(nice[ -]to[ -]haves?|preferred(\s+qualifications?)?|bonus(\s+points?)?|pluses|good[ -]to[ -]haves?)\b",
    )
    .expect("valid regex")
});

static OTHER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(about(\s+(us|the\s+(role|team|company)))?|responsibilities|what\s+you['’]ll\s+do|benefits|perks|compensation|our\s+stack|who\s+(we|you)\s+are|the\s+role|overview)\b",
    )
    .expect("valid regex")
});

static RESUME_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*((professional|work|technical)\s+)?(summary|about\s+me|objective|profile|experience|employment(\s+history)?|education|skills?|projects?|certifications?|certificates|awards?|publications|languages|interests|volunteering|contact)\b",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Requirements,
    NiceToHave,
    Body,
}

/// Byte ranges of the weighted sections found in a document. Offsets outside
/// every range belong to the body.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    sections: Vec<(SectionKind, Range<usize>)>,
}

impl SectionMap {
    pub fn kind_at(&self, offset: usize) -> SectionKind {
        self.sections
            .iter()
            .find(|(_, range)| range.contains(&offset))
            .map(|(kind, _)| *kind)
            .unwrap_or(SectionKind::Body)
    }

    #[cfg(test)]
    fn ranges(&self, kind: SectionKind) -> Vec<Range<usize>> {
        self.sections
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, range)| range.clone())
            .collect()
    }
}

/// Scan a document for requirements / nice-to-have sections. A section starts
/// right after its heading match (so content on the heading line itself is
/// included) and runs until the next heading or end of text.
pub fn detect_sections(text: &str) -> SectionMap {
    let mut sections = Vec::new();
    let mut open: Option<(SectionKind, usize)> = None;
    let mut offset = 0;

    for line in text.split('\n') {
        let line_start = offset;
        offset += line.len() + 1;

        if line.trim().len() > MAX_HEADING_LEN {
            continue;
        }

        let opened = if let Some(m) = REQUIREMENTS_HEADING.find(line) {
            Some((SectionKind::Requirements, line_start + m.end()))
        } else if let Some(m) = NICE_TO_HAVE_HEADING.find(line) {
            Some((SectionKind::NiceToHave, line_start + m.end()))
        } else if OTHER_HEADING.is_match(line) {
            None
        } else {
            continue;
        };

        if let Some((kind, start)) = open.take() {
            sections.push((kind, start..line_start));
        }
        open = opened;
    }

    if let Some((kind, start)) = open.take() {
        sections.push((kind, start..text.len()));
    }

    SectionMap { sections }
}

/// Whether any line looks like a standard résumé section heading
/// (Summary, Experience, Education, Skills, ...).
pub fn has_standard_resume_headings(text: &str) -> bool {
    text.split('\n').any(|line| {
        line.trim().len() <= MAX_RESUME_HEADING_LEN && RESUME_HEADING.is_match(line)
    })
}
