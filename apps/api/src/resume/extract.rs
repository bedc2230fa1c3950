//! Page Extractor: the seam between the controller and the PDF engine.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Error processing PDF: {0}")]
    Pdf(String),
}

/// Yields the raw text of each page of a PDF, in page order.
///
/// Held by the controller as `Arc<dyn PageExtractor>` so tests can feed
/// fixed pages without building real documents.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// Default extractor backed by `pdf-extract`.
pub struct PdfExtractor;

impl PageExtractor for PdfExtractor {
    fn extract_pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractError> {
        // pdf-extract can panic on malformed documents instead of erroring.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(pdf)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
            Err(_) => Err(ExtractError::Pdf(
                "PDF engine panicked (malformed document)".to_string(),
            )),
        }
    }
}
