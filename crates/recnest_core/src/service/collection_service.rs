//! Collection use-case service.
//!
//! # Responsibility
//! - Provide the collection half of the entity store: mint, edit, remove,
//!   lookup.
//! - Expose collection listing through the pagination engine with the
//!   configured page cap.
//!
//! # Invariants
//! - Edits on a missing collection fail with `NotFound`.
//! - Removal is idempotent and does not cascade to accession records.

use crate::config::{StoreConfig, DEFAULT_MAX_LIMIT};
use crate::model::collection::{Collection, CollectionId};
use crate::model::EntityKind;
use crate::repo::collection_repo::CollectionRepository;
use crate::service::error::{StoreError, StoreResult};
use crate::service::pagination::{page_after, page_by_offset, CollectionPage, KeysetPage};
use log::{debug, info};

/// Use-case service wrapper for collection operations.
pub struct CollectionService<R: CollectionRepository> {
    repo: R,
    max_limit: u32,
}

impl<R: CollectionRepository> CollectionService<R> {
    /// Creates a service with the default page cap.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// Creates a service using the page cap from `config`.
    pub fn with_config(repo: R, config: &StoreConfig) -> Self {
        Self {
            repo,
            max_limit: config.max_limit,
        }
    }

    pub fn max_limit(&self) -> u32 {
        self.max_limit
    }

    /// Mints a collection with an empty membership list.
    ///
    /// `note = None` stores an empty note.
    pub fn mint_collection(
        &self,
        id: impl Into<CollectionId>,
        name: impl Into<String>,
        note: Option<String>,
    ) -> StoreResult<CollectionId> {
        let collection = Collection::new(id, name).with_note(note.unwrap_or_default());
        let id = self.repo.mint_collection(&collection)?;
        info!("event=collection_mint module=service status=ok collection_id={id}");
        Ok(id)
    }

    pub fn edit_collection_name(&self, id: &str, name: &str) -> StoreResult<()> {
        self.repo.set_collection_name(id, name)?;
        debug!("event=collection_edit module=service status=ok field=name collection_id={id}");
        Ok(())
    }

    pub fn edit_collection_note(&self, id: &str, note: &str) -> StoreResult<()> {
        self.repo.set_collection_note(id, note)?;
        debug!("event=collection_edit module=service status=ok field=note collection_id={id}");
        Ok(())
    }

    /// Removes a collection; removing a missing id succeeds.
    ///
    /// Accession records referenced by the collection are left in place.
    pub fn remove_collection(&self, id: &str) -> StoreResult<CollectionId> {
        let removed = self.repo.remove_collection(id)?;
        info!("event=collection_remove module=service status=ok collection_id={id} existed={removed}");
        Ok(id.to_string())
    }

    pub fn collection_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.repo.collection_exists(id)?)
    }

    pub fn get_collection(&self, id: &str) -> StoreResult<Collection> {
        self.repo
            .get_collection(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Collection, id))
    }

    /// Lists one offset page of `(id, name)` entries in ascending id order.
    ///
    /// `cursor` is the decimal offset (`"0"` for the first page).
    pub fn list_collections(&self, cursor: &str, limit: Option<u32>) -> StoreResult<CollectionPage> {
        page_by_offset(&self.repo, cursor, limit, self.max_limit)
    }

    /// Lists one keyset page of entries with id strictly after `after`.
    pub fn list_collections_after(
        &self,
        after: Option<&str>,
        limit: Option<u32>,
    ) -> StoreResult<KeysetPage> {
        page_after(&self.repo, after, limit, self.max_limit)
    }
}
