//! Accession record use-case service.
//!
//! # Responsibility
//! - Provide the accession half of the entity store.
//! - Mint records directly into a collection when asked to.
//!
//! # Invariants
//! - Minting into a missing collection fails with `NotFound` and creates
//!   nothing.
//! - Edits on a missing record fail with `NotFound`.
//! - Removal is idempotent and leaves collection membership lists untouched.

use crate::model::accession::{AccessionId, AccessionRecord, MintAccession};
use crate::model::EntityKind;
use crate::repo::accession_repo::AccessionRepository;
use crate::service::error::{StoreError, StoreResult};
use log::{debug, info};

/// Use-case service wrapper for accession record operations.
pub struct AccessionService<R: AccessionRepository> {
    repo: R,
}

impl<R: AccessionRepository> AccessionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Mints one accession record, optionally associated with a collection.
    pub fn mint_accession(&self, request: MintAccession) -> StoreResult<AccessionId> {
        let (record, collection_id) = request.into_parts();
        let id = self.repo.mint_accession(&record, collection_id.as_deref())?;
        info!(
            "event=accession_mint module=service status=ok accession_id={id} collection_id={}",
            collection_id.as_deref().unwrap_or("-")
        );
        Ok(id)
    }

    pub fn edit_accession_note(&self, id: &str, note: &str) -> StoreResult<()> {
        self.repo.set_accession_note(id, note)?;
        debug!("event=accession_edit module=service status=ok field=note accession_id={id}");
        Ok(())
    }

    /// Sets (`Some`) or clears (`None`) the linked accession id.
    ///
    /// The linked id is not required to exist.
    pub fn edit_accession_linked_id(&self, id: &str, linked: Option<&str>) -> StoreResult<()> {
        self.repo.set_linked_accession(id, linked)?;
        debug!("event=accession_edit module=service status=ok field=linked_accession_id accession_id={id}");
        Ok(())
    }

    pub fn add_accession_external_id(&self, id: &str, external_id: &str) -> StoreResult<()> {
        self.repo.push_external_id(id, external_id)?;
        debug!("event=accession_edit module=service status=ok field=external_ids accession_id={id}");
        Ok(())
    }

    /// Removes one record; removing a missing id succeeds.
    pub fn remove_accession(&self, id: &str) -> StoreResult<AccessionId> {
        let removed = self.repo.remove_accession(id)?;
        info!("event=accession_remove module=service status=ok accession_id={id} existed={removed}");
        Ok(id.to_string())
    }

    pub fn accession_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.repo.accession_exists(id)?)
    }

    pub fn get_accession(&self, id: &str) -> StoreResult<AccessionRecord> {
        self.repo
            .get_accession(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Accession, id))
    }
}
