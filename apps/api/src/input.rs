//! Request inputs: résumé text extraction and job description checks.
//! Both run before any streaming starts, so failures become plain 400s.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Only PDF files are supported")]
    UnsupportedFormat,

    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),

    #[error("No text content found in PDF")]
    EmptyDocument,

    #[error("Job description cannot be empty")]
    EmptyJobDescription,

    #[error("Job description too short (minimum {0} characters)")]
    JobDescriptionTooShort(usize),

    #[error("Missing form field: {0}")]
    MissingField(&'static str),
}

/// Only `.pdf` uploads are accepted; the check is on the filename alone.
pub fn ensure_pdf(filename: &str) -> Result<(), InputError> {
    if filename.to_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(InputError::UnsupportedFormat)
    }
}

/// Extracts plain text from an uploaded PDF. Parsing runs on a blocking thread.
pub async fn extract_resume_text(filename: &str, data: Bytes) -> Result<String, InputError> {
    ensure_pdf(filename)?;

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| InputError::Extraction(format!("extraction task failed: {e}")))?
        .map_err(|e| InputError::Extraction(e.to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::EmptyDocument);
    }

    debug!("Extracted {} characters from {filename}", text.len());
    Ok(text.to_string())
}

/// Returns the trimmed job description if it is long enough to analyze.
pub fn validate_job_description(text: &str, min_chars: usize) -> Result<String, InputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InputError::EmptyJobDescription);
    }
    if text.chars().count() < min_chars {
        return Err(InputError::JobDescriptionTooShort(min_chars));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_pdf_is_rejected_before_parsing() {
        let err = extract_resume_text("resume.docx", Bytes::from_static(b"PK\x03\x04"))
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::UnsupportedFormat));
        assert_eq!(err.to_string(), "Only PDF files are supported");
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_extraction_error() {
        let err = extract_resume_text("Resume.PDF", Bytes::from_static(b"not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Extraction(_)));
    }

    #[test]
    fn test_job_description_is_trimmed() {
        let jd = format!("  {}  \n", "x".repeat(50));
        assert_eq!(validate_job_description(&jd, 50).unwrap(), "x".repeat(50));
    }

    #[test]
    fn test_blank_job_description_is_rejected() {
        let err = validate_job_description(" \n\t", 50).unwrap_err();
        assert_eq!(err.to_string(), "Job description cannot be empty");
    }

    #[test]
    fn test_short_job_description_is_rejected() {
        let err = validate_job_description("Rust developer wanted", 50).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Job description too short (minimum 50 characters)"
        );
    }
}
