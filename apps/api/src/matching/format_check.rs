//! ATS-compatibility heuristics.
//!
//! Inspects the extracted text and structure hints for layout patterns that
//! commonly break résumé parsers. Flags are advisory; they never block the
//! report.

use serde::Serialize;

use super::extract::ExtractedDoc;
use super::sections::has_standard_resume_headings;

const MIN_LINES_FOR_COLUMN_CHECK: usize = 8;
const COLUMN_GAP_LINE_RATIO: f32 = 0.3;
/// Below this many visible characters per PDF page, the text layer is
/// probably a scan.
const MIN_CHARS_PER_PDF_PAGE: usize = 200;
const MIN_CHARS_WITH_IMAGES: usize = 300;
const MIN_LINES_FOR_HEADING_CHECK: usize = 10;
const TABLE_PIPE_LINE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatFlag {
    MultiColumnLayout,
    NonStandardSectionHeadings,
    TableBasedLayout,
    TextInImage,
}

/// Run every layout heuristic over an extracted résumé. Returns a sorted,
/// deduplicated flag list.
pub fn check_format(extracted: &ExtractedDoc) -> Vec<FormatFlag> {
    let mut flags = Vec::new();
    let text = &extracted.text;

    let non_empty: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    let visible_chars = text.chars().filter(|c| !c.is_whitespace()).count();

    if non_empty.len() >= MIN_LINES_FOR_COLUMN_CHECK {
        let gapped = non_empty.iter().filter(|line| has_column_gap(line)).count();
        if gapped as f32 >= non_empty.len() as f32 * COLUMN_GAP_LINE_RATIO {
            flags.push(FormatFlag::MultiColumnLayout);
        }
    }

    let sparse_text = match extracted.hints.pages {
        Some(pages) => visible_chars < MIN_CHARS_PER_PDF_PAGE * pages.max(1),
        None => extracted.hints.image_count > 0 && visible_chars < MIN_CHARS_WITH_IMAGES,
    };
    if sparse_text {
        flags.push(FormatFlag::TextInImage);
    }

    if non_empty.len() >= MIN_LINES_FOR_HEADING_CHECK && !has_standard_resume_headings(text) {
        flags.push(FormatFlag::NonStandardSectionHeadings);
    }

    let pipe_lines = non_empty.iter().filter(|line| line.contains('|')).count();
    if extracted.hints.saw_tables || pipe_lines >= TABLE_PIPE_LINE_COUNT {
        flags.push(FormatFlag::TableBasedLayout);
    }

    flags.sort();
    flags.dedup();
    flags
}

/// An interior run of 3+ spaces with words on both sides reads like two
/// side-by-side columns flattened into one line.
fn has_column_gap(line: &str) -> bool {
    line.trim().contains("   ")
}
