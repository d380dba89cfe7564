//! Accession record domain model.
//!
//! # Invariants
//! - `id` is stable and never reassigned once minted.
//! - `external_ids` is append-only and keeps insertion order.
//! - `linked_accession_id` is a weak reference and is never resolved.

use crate::model::collection::CollectionId;
use crate::model::{validate_identifier, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Caller-supplied accession record identifier.
pub type AccessionId = String;

/// Item entity optionally linked to another record and to external ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessionRecord {
    pub id: AccessionId,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub linked_accession_id: Option<AccessionId>,
    /// Opaque identifiers in other systems, in append order.
    #[serde(default)]
    pub external_ids: Vec<String>,
}

impl AccessionRecord {
    pub fn new(id: impl Into<AccessionId>) -> Self {
        Self {
            id: id.into(),
            note: String::new(),
            linked_accession_id: None,
            external_ids: Vec::new(),
        }
    }

    /// Validates fields that must hold before the record is minted.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_identifier("accession_id", &self.id)?;
        if let Some(linked) = self.linked_accession_id.as_deref() {
            validate_identifier("linked_accession_id", linked)?;
        }
        for external_id in &self.external_ids {
            validate_identifier("external_id", external_id)?;
        }
        Ok(())
    }
}

/// Mint request for one accession record.
///
/// When `collection_id` is set the new record is appended to that
/// collection's membership list in the same write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintAccession {
    pub id: AccessionId,
    pub note: Option<String>,
    pub linked_accession_id: Option<AccessionId>,
    pub external_ids: Vec<String>,
    pub collection_id: Option<CollectionId>,
}

impl MintAccession {
    pub fn new(id: impl Into<AccessionId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn in_collection(mut self, collection_id: impl Into<CollectionId>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn linked_to(mut self, accession_id: impl Into<AccessionId>) -> Self {
        self.linked_accession_id = Some(accession_id.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_ids.push(external_id.into());
        self
    }

    /// Splits the request into the record to persist and its target collection.
    pub fn into_parts(self) -> (AccessionRecord, Option<CollectionId>) {
        let record = AccessionRecord {
            id: self.id,
            note: self.note.unwrap_or_default(),
            linked_accession_id: self.linked_accession_id,
            external_ids: self.external_ids,
        };
        (record, self.collection_id)
    }
}
