/// Citation format policy
///
/// The citation style of a reference entry decides whether its place of
/// publication is persisted. APA suppresses the place; Chicago keeps it.
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// Supported citation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitationFormat {
    Apa,
    Chicago,
}

impl CitationFormat {
    /// Parse a format tag, case-insensitively. Unknown tags are rejected;
    /// this strict path is used by the format-change operation only.
    pub fn parse(tag: &str) -> ApiResult<Self> {
        if tag.eq_ignore_ascii_case("APA") {
            Ok(CitationFormat::Apa)
        } else if tag.eq_ignore_ascii_case("Chicago") {
            Ok(CitationFormat::Chicago)
        } else {
            Err(ApiError::Validation(format!("Unsupported format: {}", tag)))
        }
    }

    /// Canonical tag as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationFormat::Apa => "APA",
            CitationFormat::Chicago => "Chicago",
        }
    }

    /// Place of publication to persist for this format
    pub fn apply_place(&self, place: Option<String>) -> Option<String> {
        match self {
            CitationFormat::Apa => None,
            CitationFormat::Chicago => place,
        }
    }
}

/// Place to persist when creating an entry. The create path is lenient
/// about unknown tags: only an APA tag clears the place, anything else
/// keeps the caller's value. Kept as observed in the legacy API.
pub fn place_on_create(format_tag: &str, place: Option<String>) -> Option<String> {
    if format_tag.eq_ignore_ascii_case("APA") {
        None
    } else {
        place
    }
}

/// Place to persist when replacing an entry. The update path only keeps
/// the place for an explicit Chicago tag; any other tag clears it. The
/// asymmetry with `place_on_create` is intentional legacy behavior.
pub fn place_on_update(format_tag: &str, place: Option<String>) -> Option<String> {
    if format_tag.eq_ignore_ascii_case("Chicago") {
        place
    } else {
        None
    }
}

/// Place to return when serializing an entry for display: APA entries
/// never show a place, regardless of what is stored.
pub fn place_on_display(format_tag: &str, place: Option<String>) -> Option<String> {
    if format_tag.eq_ignore_ascii_case("APA") {
        None
    } else {
        place
    }
}
