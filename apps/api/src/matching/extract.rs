//! Document text extraction.
//!
//! Turns an uploaded PDF, DOCX, or plain-text file into normalized UTF-8 text
//! plus a few structural hints the format checker uses later. Extraction is
//! pure CPU work; callers run it on a blocking thread with a deadline.

use bytes::Bytes;
use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};
use thiserror::Error;

const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_DOC: &str = "application/msword";
const MIME_TXT: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy binary Word format. Recognized so we can reject it with a
    /// useful message instead of a generic one.
    Doc,
    Txt,
}

/// An uploaded file before extraction: raw bytes plus whatever identity the
/// client sent along.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl Document {
    pub fn new(bytes: Bytes, content_type: Option<String>, filename: Option<String>) -> Self {
        Document {
            bytes,
            content_type,
            filename,
        }
    }

    /// Resolve the document format from the declared content type, falling
    /// back to the filename extension when the content type is missing or
    /// generic (`application/octet-stream`).
    pub fn format(&self) -> Result<DocumentFormat, ExtractError> {
        let content_type = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .unwrap_or("");

        match content_type {
            MIME_PDF => return Ok(DocumentFormat::Pdf),
            MIME_DOCX => return Ok(DocumentFormat::Docx),
            MIME_DOC => return Ok(DocumentFormat::Doc),
            MIME_TXT => return Ok(DocumentFormat::Txt),
            "" | "application/octet-stream" => {}
            other => {
                // An explicit but unknown content type still gets a chance via
                // the extension; browsers sometimes mislabel text files.
                if let Some(format) = self.format_from_extension() {
                    return Ok(format);
                }
                return Err(ExtractError::UnsupportedFormat(other.to_string()));
            }
        }

        self.format_from_extension().ok_or_else(|| {
            let declared = self
                .filename
                .clone()
                .or_else(|| self.content_type.clone())
                .unwrap_or_else(|| "unknown".to_string());
            ExtractError::UnsupportedFormat(declared)
        })
    }

    fn format_from_extension(&self) -> Option<DocumentFormat> {
        let filename = self.filename.as_deref()?;
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }
}

/// Structural facts gathered during extraction that plain text cannot carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureHints {
    /// Page count, when the format knows about pages (PDF only).
    pub pages: Option<usize>,
    pub saw_tables: bool,
    pub image_count: usize,
}

/// Extraction output: normalized text plus structure hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDoc {
    pub text: String,
    pub hints: StructureHints,
}

impl ExtractedDoc {
    /// Wrap text that never went through a file parser (pasted job
    /// descriptions). Empty text is allowed here; the caller decides how to
    /// treat it.
    pub fn from_plain_text(text: &str) -> Self {
        ExtractedDoc {
            text: normalize_text(text),
            hints: StructureHints::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document format: {0}; upload PDF, DOCX, or TXT")]
    UnsupportedFormat(String),

    #[error("document could not be parsed: {0}")]
    Corrupt(String),

    #[error("document contains no extractable text")]
    Empty,

    #[error("extraction did not finish within {0}ms")]
    Timeout(u64),
}

/// Extract text from an uploaded document. Fails with `Empty` when the file
/// parses fine but yields nothing but whitespace.
pub fn extract(document: &Document) -> Result<ExtractedDoc, ExtractError> {
    let (text, hints) = match document.format()? {
        DocumentFormat::Pdf => extract_pdf(&document.bytes)?,
        DocumentFormat::Docx => extract_docx(&document.bytes)?,
        DocumentFormat::Doc => {
            return Err(ExtractError::UnsupportedFormat(
                "legacy .doc (re-save as .docx or PDF)".to_string(),
            ));
        }
        DocumentFormat::Txt => (decode_text(&document.bytes), StructureHints::default()),
    };

    let text = normalize_text(&text);
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok(ExtractedDoc { text, hints })
}

fn extract_pdf(bytes: &[u8]) -> Result<(String, StructureHints), ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?;

    // The extractor separates pages with form feeds, but only between pages.
    let form_feeds = text.matches('\x0c').count();
    let hints = StructureHints {
        pages: Some(if form_feeds > 0 { form_feeds + 1 } else { 1 }),
        saw_tables: false,
        image_count: 0,
    };

    Ok((text, hints))
}

fn extract_docx(bytes: &[u8]) -> Result<(String, StructureHints), ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Corrupt(format!("{e:?}")))?;

    let mut text = String::new();
    let mut hints = StructureHints::default();

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                let line = paragraph_text(paragraph, &mut hints);
                text.push_str(line.trim_end());
                text.push('\n');
            }
            DocumentChild::Table(table) => {
                hints.saw_tables = true;
                table_text(table, &mut text, &mut hints);
            }
            _ => {}
        }
    }

    Ok((text, hints))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph, hints: &mut StructureHints) -> String {
    let mut line = String::new();
    for child in &paragraph.children {
        collect_paragraph_child(child, &mut line, hints);
    }
    line
}

fn collect_paragraph_child(child: &ParagraphChild, line: &mut String, hints: &mut StructureHints) {
    match child {
        ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => line.push_str(&t.text),
                    RunChild::Tab(_) => line.push('\t'),
                    RunChild::Break(_) => line.push('\n'),
                    RunChild::Drawing(_) => hints.image_count += 1,
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                collect_paragraph_child(inner, line, hints);
            }
        }
        _ => {}
    }
}

fn table_text(table: &docx_rs::Table, text: &mut String, hints: &mut StructureHints) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        let mut cells: Vec<String> = Vec::new();
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            let mut cell_text = String::new();
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => {
                        let line = paragraph_text(paragraph, hints);
                        if !cell_text.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(line.trim());
                    }
                    TableCellContent::Table(nested) => {
                        hints.saw_tables = true;
                        let mut nested_text = String::new();
                        table_text(nested, &mut nested_text, hints);
                        if !cell_text.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(nested_text.trim());
                    }
                    _ => {}
                }
            }
            cells.push(cell_text);
        }
        text.push_str(&cells.join("\t"));
        text.push('\n');
    }
}

/// Decode raw text bytes: UTF-8 when valid, otherwise sniff the encoding and
/// decode lossily.
fn decode_text(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "text decode replaced invalid byte sequences"
        );
    }
    decoded.into_owned()
}

/// Normalize line endings and strip control characters so every downstream
/// stage sees the same text for the same document.
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\x0c' => out.push('\n'),
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

    fn make_document(bytes: &[u8], content_type: Option<&str>, filename: Option<&str>) -> Document {
        Document::new(
            Bytes::copy_from_slice(bytes),
            content_type.map(str::to_string),
            filename.map(str::to_string),
        )
    }

    fn make_docx(build: impl FnOnce(Docx) -> Docx) -> Vec<u8> {
        let docx = build(Docx::new());
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    fn text_paragraph(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    #[test]
    fn test_format_from_content_type() {
        let doc = make_document(b"x", Some("application/pdf"), None);
        assert_eq!(doc.format().unwrap(), DocumentFormat::Pdf);

        let doc = make_document(b"x", Some(MIME_DOCX), Some("resume.bin"));
        assert_eq!(doc.format().unwrap(), DocumentFormat::Docx);
    }

    #[test]
    fn test_format_falls_back_to_extension() {
        let doc = make_document(b"x", Some("application/octet-stream"), Some("resume.PDF"));
        assert_eq!(doc.format().unwrap(), DocumentFormat::Pdf);

        let doc = make_document(b"x", None, Some("notes.txt"));
        assert_eq!(doc.format().unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn test_format_rejects_unknown() {
        let doc = make_document(b"x", Some("image/png"), Some("scan.png"));
        let err = doc.format().unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ref s) if s.contains("image/png")));
    }

    #[test]
    fn test_format_strips_content_type_parameters() {
        let doc = make_document(b"x", Some("text/plain; charset=utf-8"), None);
        assert_eq!(doc.format().unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn test_legacy_doc_is_rejected_with_guidance() {
        let doc = make_document(b"\xd0\xcf\x11\xe0", Some("application/msword"), None);
        let err = extract(&doc).unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(msg) => assert!(msg.contains(".docx")),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_txt_extraction_decodes_latin1() {
        // "café" in Latin-1; not valid UTF-8.
        let doc = make_document(b"caf\xe9 experience", Some("text/plain"), None);
        let extracted = extract(&doc).unwrap();
        assert_eq!(extracted.text, "café experience");
    }

    #[test]
    fn test_normalize_text_unifies_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_text("page one\x0cpage two"), "page one\npage two");
        assert_eq!(normalize_text("a\x00b\x07c"), "abc");
        assert_eq!(normalize_text("col1\tcol2"), "col1\tcol2");
    }

    #[test]
    fn test_empty_txt_is_an_error() {
        let doc = make_document(b"  \n\t \n", Some("text/plain"), None);
        assert!(matches!(extract(&doc).unwrap_err(), ExtractError::Empty));
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let doc = make_document(b"%PDF-1.7 not actually a pdf", Some("application/pdf"), None);
        assert!(matches!(
            extract(&doc).unwrap_err(),
            ExtractError::Corrupt(_)
        ));
    }

    #[test]
    fn test_docx_extraction_reads_paragraphs() {
        let bytes = make_docx(|docx| {
            docx.add_paragraph(text_paragraph("Jane Doe"))
                .add_paragraph(text_paragraph("Experience"))
                .add_paragraph(text_paragraph("Built React dashboards"))
        });
        let doc = make_document(&bytes, Some(MIME_DOCX), Some("resume.docx"));
        let extracted = extract(&doc).unwrap();

        assert!(extracted.text.contains("Jane Doe"));
        assert!(extracted.text.contains("Built React dashboards"));
        assert!(!extracted.hints.saw_tables);
        assert_eq!(extracted.hints.pages, None);
    }

    #[test]
    fn test_docx_extraction_flags_tables() {
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(text_paragraph("Skills")),
            TableCell::new().add_paragraph(text_paragraph("React, SQL")),
        ])]);
        let bytes = make_docx(|docx| docx.add_table(table));
        let doc = make_document(&bytes, Some(MIME_DOCX), None);
        let extracted = extract(&doc).unwrap();

        assert!(extracted.hints.saw_tables);
        assert!(extracted.text.contains("Skills\tReact, SQL"));
    }

    #[test]
    fn test_from_plain_text_keeps_empty_text() {
        let extracted = ExtractedDoc::from_plain_text("");
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.hints, StructureHints::default());
    }
}
