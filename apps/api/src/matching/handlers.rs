//! Axum route handlers for the Analysis API.

use std::time::{Duration, Instant};

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, DocumentRole};
use crate::matching::extract::{extract, Document, ExtractError, ExtractedDoc};
use crate::matching::keywords::KeywordEntry;
use crate::matching::report::MatchReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Envelope around the deterministic report. Only the envelope carries
/// per-request values (id, timestamp, elapsed); the report itself depends on
/// nothing but the two documents.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub report: MatchReport,
}

#[derive(Debug, Deserialize)]
pub struct KeywordPreviewRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordPreviewResponse {
    pub keywords: Vec<KeywordEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
///
/// Multipart upload: a `resume` file plus either a `job_description` file or
/// a `job_description_text` text field. Extracts both documents concurrently
/// under a deadline, then runs the matching pipeline.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let started = Instant::now();

    let upload = read_upload(&mut multipart).await?;
    let (resume_doc, job_source) = upload.into_parts()?;

    let deadline_ms = state.config.extraction_timeout_ms;
    let (resume_result, job_result) = tokio::join!(
        extract_with_deadline(resume_doc, deadline_ms),
        extract_job(job_source, deadline_ms),
    );
    let resume = resume_result.map_err(|e| AppError::extraction(DocumentRole::Resume, e))?;
    let job = job_result.map_err(|e| AppError::extraction(DocumentRole::JobDescription, e))?;

    let report = state.engine.analyze(&resume, &job);

    tracing::info!(
        score = report.score,
        matched = report.matched_keywords.len(),
        missing = report.missing_keywords.len(),
        flags = report.format_flags.len(),
        "analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        report,
    }))
}

/// POST /api/v1/analyses/keywords
///
/// Extracts weighted keywords from pasted job-description text without
/// needing a résumé. Useful for previewing what the matcher will look for.
pub async fn handle_keyword_preview(
    State(state): State<AppState>,
    Json(request): Json<KeywordPreviewRequest>,
) -> Result<Json<KeywordPreviewResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let job = ExtractedDoc::from_plain_text(&request.jd_text);
    let keywords = state.engine.job_keywords(&job.text);

    Ok(Json(KeywordPreviewResponse {
        keywords: keywords.entries,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart reading
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Upload {
    resume: Option<Document>,
    job_file: Option<Document>,
    job_text: Option<String>,
}

#[derive(Debug)]
enum JobSource {
    File(Document),
    Text(String),
}

impl Upload {
    /// Validate field presence: the resume is required, and the job
    /// description must come from exactly one of file or text.
    fn into_parts(self) -> Result<(Document, JobSource), AppError> {
        let resume = self.resume.ok_or_else(|| {
            AppError::Validation("a resume file field is required".to_string())
        })?;

        let job = match (self.job_file, self.job_text) {
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "provide either job_description or job_description_text, not both".to_string(),
                ));
            }
            (Some(file), None) => JobSource::File(file),
            (None, Some(text)) => JobSource::Text(text),
            (None, None) => {
                return Err(AppError::Validation(
                    "a job_description file or job_description_text field is required".to_string(),
                ));
            }
        };

        Ok((resume, job))
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => upload.resume = Some(read_file_field(field).await?),
            Some("job_description") => upload.job_file = Some(read_file_field(field).await?),
            Some("job_description_text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?;
                upload.job_text = Some(text);
            }
            _ => {} // unknown fields are ignored
        }
    }

    Ok(upload)
}

async fn read_file_field(field: Field<'_>) -> Result<Document, AppError> {
    // Copy the metadata out before `bytes()` consumes the field.
    let filename = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

    Ok(Document::new(bytes, content_type, filename))
}

// ────────────────────────────────────────────────────────────────────────────
// Deadline-bounded extraction
// ────────────────────────────────────────────────────────────────────────────

async fn extract_with_deadline(
    document: Document,
    deadline_ms: u64,
) -> Result<ExtractedDoc, ExtractError> {
    run_extraction(deadline_ms, move || extract(&document)).await
}

async fn extract_job(source: JobSource, deadline_ms: u64) -> Result<ExtractedDoc, ExtractError> {
    match source {
        JobSource::File(document) => extract_with_deadline(document, deadline_ms).await,
        // Pasted text skips the parser entirely; empty text is allowed and
        // surfaces later as a NO_KEYWORDS_EXTRACTED warning.
        JobSource::Text(text) => Ok(ExtractedDoc::from_plain_text(&text)),
    }
}

/// Run a parser closure on a blocking thread under a deadline. A panicking
/// parser (some PDF libraries do, on hostile input) is reported as a corrupt
/// document rather than taking the worker down.
async fn run_extraction<F>(deadline_ms: u64, f: F) -> Result<ExtractedDoc, ExtractError>
where
    F: FnOnce() -> Result<ExtractedDoc, ExtractError> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(Duration::from_millis(deadline_ms), task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            tracing::error!("extraction task crashed: {join_error}");
            Err(ExtractError::Corrupt("document parser crashed".to_string()))
        }
        Err(_) => Err(ExtractError::Timeout(deadline_ms)),
    }
}
