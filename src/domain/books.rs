//! Book records as served by the catalog service.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Upper bound on identifiers accepted in a single lookup request.
pub const MAX_LOOKUP_IDS: usize = 500;

/// Full book record keyed by its catalog identifier.
///
/// The default value, with an empty `id`, is the placeholder for a book that
/// the catalog does not know about. The catalog never returns it for a real
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl BookRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
        }
    }

    /// Returns true for the not-found placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }
}

/// Checks a caller-supplied identifier list before it reaches the cache.
pub fn validate_lookup_ids(ids: &[String]) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Err(DomainError::validation("at least one book id is required"));
    }
    if ids.len() > MAX_LOOKUP_IDS {
        return Err(DomainError::validation(format!(
            "at most {MAX_LOOKUP_IDS} book ids may be requested at once"
        )));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(DomainError::validation("book ids must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_placeholder() {
        assert!(BookRecord::default().is_placeholder());
        assert!(!BookRecord::new("a", "Title 1", vec![]).is_placeholder());
    }

    #[test]
    fn authors_default_when_missing_from_json() {
        let record: BookRecord =
            serde_json::from_str(r#"{"id":"a","title":"Title 1"}"#).expect("valid record json");
        assert!(record.authors.is_empty());
    }

    #[test]
    fn rejects_empty_and_blank_ids() {
        assert!(validate_lookup_ids(&[]).is_err());
        assert!(validate_lookup_ids(&["a".to_string(), "  ".to_string()]).is_err());
        assert!(validate_lookup_ids(&["a".to_string(), "b".to_string()]).is_ok());
    }

    #[test]
    fn rejects_oversized_requests() {
        let ids: Vec<String> = (0..=MAX_LOOKUP_IDS).map(|i| i.to_string()).collect();
        let err = validate_lookup_ids(&ids).expect_err("too many ids");
        assert!(err.to_string().contains("at most 500"));
    }
}
