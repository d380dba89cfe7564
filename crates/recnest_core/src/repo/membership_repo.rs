//! Collection membership repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append, remove and list accession ids on a collection's ordered list.
//! - Share membership row helpers with the collection and accession
//!   repositories so both read and write one list representation.
//!
//! # Invariants
//! - List order is `member_seq ASC`, i.e. association order.
//! - Duplicates are kept; removal deletes every occurrence of an id.
//! - Accession ids are references only and are never resolved here.
//! - There is no reverse index from accession to collections.

use crate::model::accession::AccessionId;
use crate::model::{validate_identifier, EntityKind};
use crate::repo::schema::{ensure_connection_ready, COLLECTION_TABLES};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for collection membership lists.
pub trait MembershipRepository {
    /// Appends one accession id to the end of a collection's list.
    fn append_member(&self, collection_id: &str, accession_id: &str) -> RepoResult<()>;
    /// Removes every occurrence of an accession id and returns how many.
    fn remove_member(&self, collection_id: &str, accession_id: &str) -> RepoResult<usize>;
    /// Lists a collection's accession ids in association order.
    fn list_members(&self, collection_id: &str) -> RepoResult<Vec<AccessionId>>;
}

/// SQLite-backed membership repository.
pub struct SqliteMembershipRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMembershipRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, COLLECTION_TABLES)?;
        Ok(Self { conn })
    }
}

impl MembershipRepository for SqliteMembershipRepository<'_> {
    fn append_member(&self, collection_id: &str, accession_id: &str) -> RepoResult<()> {
        validate_identifier("accession_id", accession_id)?;
        let inserted = insert_member(self.conn, collection_id, accession_id)?;
        if !inserted {
            return Err(RepoError::not_found(EntityKind::Collection, collection_id));
        }
        Ok(())
    }

    fn remove_member(&self, collection_id: &str, accession_id: &str) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !collection_exists_in(&tx, collection_id)? {
            return Err(RepoError::not_found(EntityKind::Collection, collection_id));
        }
        let removed = tx.execute(
            "DELETE FROM collection_members
             WHERE collection_id = ?1
               AND accession_id = ?2;",
            params![collection_id, accession_id],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    fn list_members(&self, collection_id: &str) -> RepoResult<Vec<AccessionId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        if !collection_exists_in(&tx, collection_id)? {
            return Err(RepoError::not_found(EntityKind::Collection, collection_id));
        }
        let members = load_member_ids(&tx, collection_id)?;
        tx.commit()?;
        Ok(members)
    }
}

/// Appends a membership row when the collection exists.
///
/// Returns `false` when no collection row matched, in which case nothing was
/// written. The existence check and insert are one statement.
pub(crate) fn insert_member(
    conn: &Connection,
    collection_id: &str,
    accession_id: &str,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT INTO collection_members (collection_id, accession_id)
         SELECT ?1, ?2
         WHERE EXISTS(
            SELECT 1 FROM collections WHERE collection_id = ?1
         );",
        params![collection_id, accession_id],
    )?;
    Ok(changed == 1)
}

pub(crate) fn load_member_ids(conn: &Connection, collection_id: &str) -> RepoResult<Vec<AccessionId>> {
    let mut stmt = conn.prepare(
        "SELECT accession_id
         FROM collection_members
         WHERE collection_id = ?1
         ORDER BY member_seq ASC;",
    )?;
    let mut rows = stmt.query([collection_id])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(row.get(0)?);
    }
    Ok(members)
}

pub(crate) fn collection_exists_in(conn: &Connection, collection_id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM collections WHERE collection_id = ?1);",
        [collection_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
