//! Collection domain model.
//!
//! # Invariants
//! - `id` is stable and never reassigned once minted.
//! - `accession_ids` keeps association order and may contain duplicates.
//! - Entries of `accession_ids` are references only; they are not required to
//!   resolve to an existing accession record.

use crate::model::accession::AccessionId;
use crate::model::{validate_identifier, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Caller-supplied collection identifier.
pub type CollectionId = String;

/// Named grouping that references zero or more accession records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    /// Free-form note, empty when not provided.
    #[serde(default)]
    pub note: String,
    /// Associated accession ids in association order.
    #[serde(default)]
    pub accession_ids: Vec<AccessionId>,
}

impl Collection {
    /// Creates a collection with an empty note and no associations.
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            note: String::new(),
            accession_ids: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Validates fields that must hold before the collection is minted.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_identifier("collection_id", &self.id)?;
        for accession_id in &self.accession_ids {
            validate_identifier("accession_id", accession_id)?;
        }
        Ok(())
    }

    /// Returns whether `accession_id` appears at least once in the list.
    pub fn contains_accession(&self, accession_id: &str) -> bool {
        self.accession_ids.iter().any(|id| id == accession_id)
    }
}

/// Listing projection returned by collection pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::Collection;

    #[test]
    fn new_collection_starts_empty() {
        let collection = Collection::new("C1", "Books");
        assert_eq!(collection.note, "");
        assert!(collection.accession_ids.is_empty());
        assert!(collection.validate().is_ok());
    }

    #[test]
    fn contains_accession_matches_exact_ids() {
        let mut collection = Collection::new("C1", "Books");
        collection.accession_ids = vec!["A1".to_string(), "A10".to_string()];
        assert!(collection.contains_accession("A1"));
        assert!(!collection.contains_accession("A"));
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let collection = Collection::new("C1", "Books").with_note("shelf 3");
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["id"], "C1");
        assert_eq!(value["note"], "shelf 3");
        assert!(value["accession_ids"].as_array().unwrap().is_empty());
    }
}
