//! PDF text extraction backends.

use async_trait::async_trait;

use crate::documents::DocumentError;

/// Text and page count pulled out of a PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfContent {
    pub text: String,
    pub page_count: Option<u32>,
}

/// The PDF extraction capability. Implement this to swap the extraction
/// engine without touching the normalizer.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<PdfContent, DocumentError>;
}

/// Default backend: `pdf-extract` for text, `lopdf` for the page tree.
///
/// Both are CPU-bound, so the work runs on the blocking pool.
pub struct PdfExtractBackend;

#[async_trait]
impl PdfExtractor for PdfExtractBackend {
    async fn extract(&self, bytes: &[u8]) -> Result<PdfContent, DocumentError> {
        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || extract_blocking(&owned))
            .await
            .map_err(|e| DocumentError::Extraction(format!("extraction task aborted: {e}")))?
    }
}

fn extract_blocking(bytes: &[u8]) -> Result<PdfContent, DocumentError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;

    // Page count is informational; a page tree lopdf cannot walk does not fail the upload.
    let page_count = lopdf::Document::load_mem(bytes)
        .ok()
        .map(|doc| doc.get_pages().len() as u32);

    Ok(PdfContent { text, page_count })
}
