/// Author records: ordered groups of formatted author names
pub mod manager;

pub use manager::AuthorManager;

use serde::{Deserialize, Serialize};

/// Upper bound on names per record, kept from the legacy schema as an
/// input limit
pub const MAX_AUTHOR_NAMES: usize = 20;

/// An author record: an ordered, variable-length list of formatted names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: i64,
    pub names: Vec<String>,
}

/// Create/update request body
#[derive(Debug, Deserialize)]
pub struct AuthorRecordRequest {
    pub names: Vec<String>,
}

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorRecordCreated {
    pub id: i64,
}
