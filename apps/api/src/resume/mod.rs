// Résumé ingestion: PDF page extraction and text normalization.
// Both run once per uploaded file; nothing is cached between requests.

pub mod extract;
pub mod normalize;

use thiserror::Error;

use crate::resume::extract::ExtractError;
use crate::resume::normalize::NormalizeError;

/// Any failure turning an uploaded PDF into résumé text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResumeError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
