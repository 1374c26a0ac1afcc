use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::extractor::ValidatedUrl;

// ============================================================================
// Link Models
// ============================================================================

/// A saved link as stored in the `links` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub added_at: DateTime<Utc>,
}

/// Normalized page metadata. Every field is non-empty once it leaves the
/// extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
}

/// Result of `LinkStore::save`. A duplicate URL is an ordinary outcome, not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(LinkRecord),
    AlreadyExists,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Whether the metadata came from the page or is the degraded placeholder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtractionStatus {
    Complete,
    FetchFailed,
    ParseFailed,
}

// ============================================================================
// Request / response shapes
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AddLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1–2048 characters"))]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct LinkPreviewDto {
    pub url: String,
    #[serde(flatten)]
    pub metadata: LinkMetadata,
    pub status: ExtractionStatus,
}

impl LinkPreviewDto {
    pub fn new(url: &ValidatedUrl, metadata: LinkMetadata, status: ExtractionStatus) -> Self {
        LinkPreviewDto {
            url: url.as_str().to_string(),
            metadata,
            status,
        }
    }
}
