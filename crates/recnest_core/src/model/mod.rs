//! Domain model for collections and accession records.
//!
//! # Responsibility
//! - Define the typed entities core business logic works with.
//! - Own identifier validation shared by both entity namespaces.
//!
//! # Invariants
//! - Every entity is identified by a caller-supplied, immutable string id.
//! - Collection ids and accession ids live in independent namespaces.
//! - Domain types carry no storage layout; row mapping lives in `repo`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod accession;
pub mod collection;

/// Entity namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    Accession,
}

impl EntityKind {
    /// Stable lowercase label used in messages and log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Accession => "accession",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier shape violations detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Identifier is empty after trimming whitespace.
    EmptyIdentifier { field: &'static str },
    /// Identifier contains ASCII/Unicode control characters.
    ControlCharacter { field: &'static str, value: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdentifier { field } => write!(f, "{field} must not be empty"),
            Self::ControlCharacter { field, value } => {
                write!(f, "{field} contains control characters: {value:?}")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// Checks one identifier-like value (entity id, linked id, external id).
///
/// Identifiers are stored verbatim; this only rejects values that cannot be
/// addressed reliably from a path segment or a command line.
pub fn validate_identifier(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::EmptyIdentifier { field });
    }
    if value.chars().any(char::is_control) {
        return Err(RecordValidationError::ControlCharacter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
