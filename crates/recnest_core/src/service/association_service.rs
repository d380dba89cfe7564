//! Collection/accession association service.
//!
//! # Invariants
//! - Associations live on the collection side only.
//! - Associating does not require the accession record to exist.
//! - Every operation fails with `NotFound` when the collection is missing.

use crate::model::accession::AccessionId;
use crate::repo::membership_repo::MembershipRepository;
use crate::service::error::StoreResult;
use log::debug;

/// Association manager facade over a membership repository.
pub struct AssociationService<R: MembershipRepository> {
    repo: R,
}

impl<R: MembershipRepository> AssociationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends `accession_id` to the collection's list, duplicates included.
    pub fn associate(&self, collection_id: &str, accession_id: &str) -> StoreResult<()> {
        self.repo.append_member(collection_id, accession_id)?;
        debug!(
            "event=associate module=service status=ok collection_id={collection_id} accession_id={accession_id}"
        );
        Ok(())
    }

    /// Removes every occurrence of `accession_id`; returns how many.
    ///
    /// Deassociating an id that is not in the list succeeds with `0`.
    pub fn deassociate(&self, collection_id: &str, accession_id: &str) -> StoreResult<usize> {
        let removed = self.repo.remove_member(collection_id, accession_id)?;
        debug!(
            "event=deassociate module=service status=ok collection_id={collection_id} accession_id={accession_id} removed={removed}"
        );
        Ok(removed)
    }

    pub fn list_associated(&self, collection_id: &str) -> StoreResult<Vec<AccessionId>> {
        Ok(self.repo.list_members(collection_id)?)
    }
}
