//! Document text extraction for uploaded CVs.
//!
//! Extraction never fails outward: any problem (bad base64, corrupt or empty PDF)
//! degrades to an empty string so a review can still run without the CV text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on extracted text handed to the prompt builder.
pub const MAX_DOCUMENT_CHARS: usize = 4000;

#[derive(Debug, Error)]
enum ExtractionError {
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Document contains no extractable text")]
    Empty,
}

/// Decodes and extracts text from an optional base64 PDF. Returns "" on any failure.
pub fn extract_document_text(encoded: Option<&str>) -> String {
    let Some(encoded) = encoded.filter(|e| !e.trim().is_empty()) else {
        return String::new();
    };

    match try_extract(encoded) {
        Ok(text) => {
            debug!(chars = text.chars().count(), "Extracted document text");
            text
        }
        Err(e) => {
            warn!("Document text extraction failed, continuing without it: {e}");
            String::new()
        }
    }
}

/// Runs extraction on the blocking pool; PDF parsing is CPU-bound.
pub async fn extract_document_text_blocking(encoded: Option<String>) -> String {
    tokio::task::spawn_blocking(move || extract_document_text(encoded.as_deref()))
        .await
        .unwrap_or_else(|e| {
            warn!("Document extraction task failed: {e}");
            String::new()
        })
}

fn try_extract(encoded: &str) -> Result<String, ExtractionError> {
    let bytes = decode_base64(encoded)?;

    // pdf-extract panics on some malformed files instead of returning an error
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| ExtractionError::PdfParsing("parser panicked".to_string()))?
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

    let text = join_pages(&pages);
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

/// Accepts plain base64 or a `data:<mime>;base64,` URL, ignoring embedded whitespace.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, ExtractionError> {
    let payload = encoded.trim();
    let payload = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once("base64,").map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    Ok(STANDARD.decode(compact)?)
}

/// Pages in order, newline-separated, blank pages skipped, cut to `MAX_DOCUMENT_CHARS`.
fn join_pages(pages: &[String]) -> String {
    let joined = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    joined.chars().take(MAX_DOCUMENT_CHARS).collect()
}
