/// Reference entries: bibliographic citation records
pub mod manager;

pub use manager::ReferenceManager;

use crate::content::ContentParagraph;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum length for title, place, and source fields
pub const MAX_FIELD_LEN: usize = 255;

/// A reference entry with its owned paragraphs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub place: Option<String>,
    pub source: Option<String>,
    pub format: String,
    pub user_id: i64,
    pub author_record_id: i64,
    pub paragraphs: Vec<ContentParagraph>,
}

/// Bare row without paragraphs
#[derive(Debug, Clone, FromRow)]
pub struct ReferenceRow {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub place: Option<String>,
    pub source: Option<String>,
    pub format: String,
    pub user_id: i64,
    pub author_record_id: i64,
}

/// Create request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferenceRequest {
    pub title: String,
    pub year: i64,
    pub place: Option<String>,
    pub source: Option<String>,
    pub format: String,
    pub user_id: i64,
    pub author_record_id: i64,
}

/// Full-update request; foreign keys and paragraphs are not touched
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReferenceRequest {
    pub title: String,
    pub year: i64,
    pub place: Option<String>,
    pub source: Option<String>,
    pub format: String,
}

/// Format-change request; mutates only format and place
#[derive(Debug, Deserialize)]
pub struct ChangeFormatRequest {
    pub format: String,
    pub place: Option<String>,
}

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReferenceCreated {
    pub message: String,
    pub id: i64,
}

/// Per-user projection: authors flattened to one display string, place
/// suppressed for APA entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReferenceView {
    pub id: i64,
    pub author_record_id: i64,
    pub authors: String,
    pub title: String,
    pub year: i64,
    pub place: Option<String>,
    pub source: Option<String>,
    pub format: String,
}
