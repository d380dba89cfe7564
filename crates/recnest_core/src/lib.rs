//! Core storage layer for recnest.
//! Collections, accession records, their associations and collection
//! pagination; this crate is the single source of truth for record
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::accession::{AccessionId, AccessionRecord, MintAccession};
pub use model::collection::{Collection, CollectionId, CollectionSummary};
pub use model::{EntityKind, RecordValidationError};
pub use repo::accession_repo::{AccessionRepository, SqliteAccessionRepository};
pub use repo::collection_repo::{CollectionRepository, SqliteCollectionRepository};
pub use repo::membership_repo::{MembershipRepository, SqliteMembershipRepository};
pub use repo::{RepoError, RepoResult};
pub use service::accession_service::AccessionService;
pub use service::association_service::AssociationService;
pub use service::collection_service::CollectionService;
pub use service::error::{StoreError, StoreErrorKind, StoreResult};
pub use service::pagination::{CollectionPage, KeysetPage, INITIAL_CURSOR};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
