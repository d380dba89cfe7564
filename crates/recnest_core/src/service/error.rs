//! Caller-facing error taxonomy for record store operations.
//!
//! Every service returns `StoreError`; front ends map `StoreErrorKind` to
//! their own status vocabulary (HTTP status, process exit code).

use crate::model::EntityKind;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Stable classification of `StoreError` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    AlreadyExists,
    NotFound,
    InvalidArgument,
    Storage,
}

impl StoreErrorKind {
    /// HTTP status an API layer should answer with.
    ///
    /// `AlreadyExists` maps to 409 Conflict rather than a generic 500.
    pub fn status_code(self) -> u16 {
        match self {
            Self::AlreadyExists => 409,
            Self::NotFound => 404,
            Self::InvalidArgument => 400,
            Self::Storage => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Storage => "storage",
        }
    }
}

/// Error returned by entity store, association and pagination services.
#[derive(Debug)]
pub enum StoreError {
    /// Minting with an identifier that is already taken.
    AlreadyExists { kind: EntityKind, id: String },
    /// Operating on an entity that does not exist.
    NotFound { kind: EntityKind, id: String },
    /// Malformed identifier, cursor or other argument.
    InvalidArgument(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::AlreadyExists { .. } => StoreErrorKind::AlreadyExists,
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::InvalidArgument(_) => StoreErrorKind::InvalidArgument,
            Self::Repo(_) => StoreErrorKind::Storage,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::AlreadyExists { kind, id } => Self::AlreadyExists { kind, id },
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::InvalidArgument(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoreErrorKind};
    use crate::model::{EntityKind, RecordValidationError};
    use crate::repo::RepoError;

    #[test]
    fn repo_errors_map_to_caller_kinds() {
        let exists: StoreError = RepoError::AlreadyExists {
            kind: EntityKind::Collection,
            id: "C1".to_string(),
        }
        .into();
        assert_eq!(exists.kind(), StoreErrorKind::AlreadyExists);
        assert_eq!(exists.status_code(), 409);

        let missing: StoreError = RepoError::NotFound {
            kind: EntityKind::Accession,
            id: "A1".to_string(),
        }
        .into();
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.to_string(), "accession not found: A1");

        let invalid: StoreError = RepoError::Validation(RecordValidationError::EmptyIdentifier {
            field: "collection_id",
        })
        .into();
        assert_eq!(invalid.kind(), StoreErrorKind::InvalidArgument);

        let storage: StoreError = RepoError::InvalidData("bad row".to_string()).into();
        assert_eq!(storage.status_code(), 500);
    }
}
