//! Accession record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide mint/edit/remove/lookup APIs over `accessions` storage.
//! - Mint a record into a collection as one all-or-nothing write.
//!
//! # Invariants
//! - Mint never overwrites: a taken id fails with `AlreadyExists`.
//! - Mint with a missing target collection fails with `NotFound` and leaves
//!   no record behind.
//! - The membership row is written only after the record insert succeeds.
//! - Removing a record does not touch any collection membership list.

use crate::model::accession::{AccessionId, AccessionRecord};
use crate::model::{validate_identifier, EntityKind};
use crate::repo::membership_repo::{collection_exists_in, insert_member};
use crate::repo::schema::{ensure_connection_ready, ACCESSION_TABLES, COLLECTION_TABLES};
use crate::repo::{is_duplicate_key, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Repository interface for accession records.
pub trait AccessionRepository {
    /// Persists a new record, optionally appending it to a collection.
    fn mint_accession(
        &self,
        record: &AccessionRecord,
        collection_id: Option<&str>,
    ) -> RepoResult<AccessionId>;
    fn set_accession_note(&self, id: &str, note: &str) -> RepoResult<()>;
    /// Sets or clears the weak link to another record.
    fn set_linked_accession(&self, id: &str, linked: Option<&str>) -> RepoResult<()>;
    /// Appends one external identifier.
    fn push_external_id(&self, id: &str, external_id: &str) -> RepoResult<()>;
    /// Deletes one record. Returns whether a row existed.
    fn remove_accession(&self, id: &str) -> RepoResult<bool>;
    fn accession_exists(&self, id: &str) -> RepoResult<bool>;
    fn get_accession(&self, id: &str) -> RepoResult<Option<AccessionRecord>>;
}

/// SQLite-backed accession repository.
pub struct SqliteAccessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccessionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Collection tables are checked too because mint may append to a
    /// collection's membership list.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, ACCESSION_TABLES)?;
        ensure_connection_ready(conn, COLLECTION_TABLES)?;
        Ok(Self { conn })
    }
}

impl AccessionRepository for SqliteAccessionRepository<'_> {
    fn mint_accession(
        &self,
        record: &AccessionRecord,
        collection_id: Option<&str>,
    ) -> RepoResult<AccessionId> {
        record.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(collection_id) = collection_id {
            if !collection_exists_in(&tx, collection_id)? {
                return Err(RepoError::not_found(EntityKind::Collection, collection_id));
            }
        }

        let inserted = tx.execute(
            "INSERT INTO accessions (accession_id, note, linked_accession_id)
             VALUES (?1, ?2, ?3);",
            params![
                record.id.as_str(),
                record.note.as_str(),
                record.linked_accession_id.as_deref()
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_duplicate_key(&err) => {
                return Err(RepoError::already_exists(EntityKind::Accession, &record.id));
            }
            Err(err) => return Err(err.into()),
        }

        for external_id in &record.external_ids {
            insert_external_id(&tx, &record.id, external_id)?;
        }

        if let Some(collection_id) = collection_id {
            if !insert_member(&tx, collection_id, &record.id)? {
                return Err(RepoError::not_found(EntityKind::Collection, collection_id));
            }
        }

        tx.commit()?;
        Ok(record.id.clone())
    }

    fn set_accession_note(&self, id: &str, note: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE accessions SET note = ?2 WHERE accession_id = ?1;",
            params![id, note],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Accession, id));
        }
        Ok(())
    }

    fn set_linked_accession(&self, id: &str, linked: Option<&str>) -> RepoResult<()> {
        if let Some(linked) = linked {
            validate_identifier("linked_accession_id", linked)?;
        }
        let changed = self.conn.execute(
            "UPDATE accessions SET linked_accession_id = ?2 WHERE accession_id = ?1;",
            params![id, linked],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Accession, id));
        }
        Ok(())
    }

    fn push_external_id(&self, id: &str, external_id: &str) -> RepoResult<()> {
        validate_identifier("external_id", external_id)?;
        let changed = self.conn.execute(
            "INSERT INTO accession_external_ids (accession_id, external_id)
             SELECT ?1, ?2
             WHERE EXISTS(
                SELECT 1 FROM accessions WHERE accession_id = ?1
             );",
            params![id, external_id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Accession, id));
        }
        Ok(())
    }

    fn remove_accession(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM accessions WHERE accession_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn accession_exists(&self, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accessions WHERE accession_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_accession(&self, id: &str) -> RepoResult<Option<AccessionRecord>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let head = tx
            .query_row(
                "SELECT accession_id, note, linked_accession_id
                 FROM accessions
                 WHERE accession_id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>("accession_id")?,
                        row.get::<_, String>("note")?,
                        row.get::<_, Option<String>>("linked_accession_id")?,
                    ))
                },
            )
            .optional()?;

        let Some((accession_id, note, linked_accession_id)) = head else {
            return Ok(None);
        };
        let external_ids = load_external_ids(&tx, &accession_id)?;
        tx.commit()?;

        let record = AccessionRecord {
            id: accession_id,
            note,
            linked_accession_id,
            external_ids,
        };
        record.validate().map_err(|err| {
            RepoError::InvalidData(format!("accession `{}`: {err}", record.id))
        })?;
        Ok(Some(record))
    }
}

fn insert_external_id(conn: &Connection, accession_id: &str, external_id: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO accession_external_ids (accession_id, external_id)
         VALUES (?1, ?2);",
        params![accession_id, external_id],
    )?;
    Ok(())
}

fn load_external_ids(conn: &Connection, accession_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT external_id
         FROM accession_external_ids
         WHERE accession_id = ?1
         ORDER BY entry_seq ASC;",
    )?;
    let mut rows = stmt.query([accession_id])?;
    let mut external_ids = Vec::new();
    while let Some(row) = rows.next()? {
        external_ids.push(row.get(0)?);
    }
    Ok(external_ids)
}
