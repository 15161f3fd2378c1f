/// Content paragraphs attached to reference entries
pub mod manager;

pub use manager::ContentManager;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A page-numbered body-text unit owned by one reference entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParagraph {
    pub id: i64,
    pub reference_id: i64,
    pub page_number: i64,
    pub body: String,
}

/// Create request for a new paragraph
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContentParagraph {
    pub reference_id: i64,
    pub page_number: i64,
    pub body: String,
}

/// One item of a bulk upsert: an id of zero (or omitted) means insert
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParagraphUpsert {
    #[serde(default)]
    pub id: i64,
    pub reference_id: i64,
    pub page_number: i64,
    pub body: String,
}
