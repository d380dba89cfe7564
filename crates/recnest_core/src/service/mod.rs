//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the entity store, association
//!   manager and pagination engine APIs.
//! - Translate repository errors into the caller-facing `StoreError`.

pub mod accession_service;
pub mod association_service;
pub mod collection_service;
pub mod error;
pub mod pagination;
