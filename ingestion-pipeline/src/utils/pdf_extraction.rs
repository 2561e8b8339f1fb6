use std::path::Path;

use async_trait::async_trait;
use common::error::AppError;
use lopdf::Document;
use tracing::debug;

/// Turns a document on disk into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, AppError>;
}

/// Extracts the text layer of a PDF. Pages are read one by one with `lopdf`;
/// when that yields nothing, `pdf-extract` gets a pass over the whole file.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, AppError> {
        let pdf_bytes = tokio::fs::read(path).await.map_err(|err| {
            AppError::Extraction(format!("failed to read {}: {err}", path.display()))
        })?;

        tokio::task::spawn_blocking(move || extract_from_bytes(&pdf_bytes)).await?
    }
}

fn extract_from_bytes(pdf_bytes: &[u8]) -> Result<String, AppError> {
    let document = Document::load_mem(pdf_bytes)
        .map_err(|err| AppError::Extraction(format!("failed to parse PDF: {err}")))?;

    let page_text = extract_pages(&document);
    if !page_text.trim().is_empty() {
        return Ok(page_text.trim().to_string());
    }

    // pdf-extract panics on some malformed inputs.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf_bytes)) {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(err)) => {
            debug!(error = %err, "Whole-document fallback found no text");
            Ok(String::new())
        }
        Err(_) => {
            debug!("Whole-document fallback aborted on a malformed document");
            Ok(String::new())
        }
    }
}

fn extract_pages(document: &Document) -> String {
    let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let mut combined = String::new();
    for page in page_numbers {
        match document.extract_text(&[page]) {
            Ok(text) => {
                if !combined.is_empty() && !text.trim().is_empty() {
                    combined.push('\n');
                }
                combined.push_str(text.trim_end());
            }
            Err(err) => debug!(page, error = %err, "Page has no extractable text"),
        }
    }
    combined
}
