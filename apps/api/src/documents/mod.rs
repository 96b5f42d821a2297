//! Document normalization: uploaded bytes + declared MIME type → plain text.
//!
//! Dispatch is on the declared type only. Content sniffing is not attempted.

pub mod pdf;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::documents::pdf::PdfExtractor;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("{0} parsing not yet implemented. Please upload PDF files or paste text directly.")]
    NotImplemented(&'static str),

    #[error("Failed to parse PDF file: {0}")]
    Extraction(String),
}

/// A decoded upload. Owned by the request and never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub mime_type: String,
    pub filename: String,
}

/// Plain text produced from one uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    pub text: String,
    pub source_filename: String,
    pub page_count: Option<u32>,
}

#[derive(Clone)]
pub struct DocumentNormalizer {
    pdf: Arc<dyn PdfExtractor>,
}

impl DocumentNormalizer {
    pub fn new(pdf: Arc<dyn PdfExtractor>) -> Self {
        Self { pdf }
    }

    pub async fn normalize(&self, doc: &UploadedDocument) -> Result<NormalizedText, DocumentError> {
        debug!(
            "Normalizing '{}' ({}, {} bytes)",
            doc.filename,
            doc.mime_type,
            doc.bytes.len()
        );

        let normalized = match doc.mime_type.as_str() {
            MIME_PDF => {
                let content = self.pdf.extract(&doc.bytes).await?;
                NormalizedText {
                    text: content.text,
                    source_filename: doc.filename.clone(),
                    page_count: content.page_count,
                }
            }
            MIME_TEXT => NormalizedText {
                text: String::from_utf8_lossy(&doc.bytes).into_owned(),
                source_filename: doc.filename.clone(),
                page_count: None,
            },
            MIME_DOCX => return Err(DocumentError::NotImplemented("DOCX")),
            other => return Err(DocumentError::Unsupported(other.to_string())),
        };

        info!(
            "Normalized '{}': {} chars, pages={:?}",
            normalized.source_filename,
            normalized.text.chars().count(),
            normalized.page_count
        );
        Ok(normalized)
    }
}
