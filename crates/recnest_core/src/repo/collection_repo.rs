//! Collection repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide mint/edit/remove/lookup APIs over the `collections` table.
//! - Provide the ordered range queries collection pagination is built on.
//!
//! # Invariants
//! - Mint never overwrites: a taken id fails with `AlreadyExists`.
//! - Listing order is `collection_id ASC` (byte-wise, `BINARY` collation).
//! - Removing a collection drops its membership rows but no accession rows.

use crate::model::collection::{Collection, CollectionId, CollectionSummary};
use crate::model::EntityKind;
use crate::repo::membership_repo::{collection_exists_in, load_member_ids};
use crate::repo::schema::{ensure_connection_ready, COLLECTION_TABLES};
use crate::repo::{is_duplicate_key, to_sql_count, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for collection entities.
pub trait CollectionRepository {
    /// Persists a new collection and its initial membership list.
    fn mint_collection(&self, collection: &Collection) -> RepoResult<CollectionId>;
    /// Replaces the collection name.
    fn set_collection_name(&self, id: &str, name: &str) -> RepoResult<()>;
    /// Replaces the collection note.
    fn set_collection_note(&self, id: &str, note: &str) -> RepoResult<()>;
    /// Deletes one collection. Returns whether a row existed.
    fn remove_collection(&self, id: &str) -> RepoResult<bool>;
    fn collection_exists(&self, id: &str) -> RepoResult<bool>;
    /// Loads one collection with its membership list.
    fn get_collection(&self, id: &str) -> RepoResult<Option<Collection>>;
    /// Lists entries `[offset, offset + limit)` in ascending id order.
    fn list_collection_range(&self, offset: u64, limit: u64)
        -> RepoResult<Vec<CollectionSummary>>;
    /// Lists up to `limit` entries with id strictly greater than `after`.
    fn list_collections_after(
        &self,
        after: Option<&str>,
        limit: u64,
    ) -> RepoResult<Vec<CollectionSummary>>;
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, COLLECTION_TABLES)?;
        Ok(Self { conn })
    }
}

impl CollectionRepository for SqliteCollectionRepository<'_> {
    fn mint_collection(&self, collection: &Collection) -> RepoResult<CollectionId> {
        collection.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT INTO collections (collection_id, name, note)
             VALUES (?1, ?2, ?3);",
            params![
                collection.id.as_str(),
                collection.name.as_str(),
                collection.note.as_str()
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_duplicate_key(&err) => {
                return Err(RepoError::already_exists(
                    EntityKind::Collection,
                    &collection.id,
                ));
            }
            Err(err) => return Err(err.into()),
        }

        for accession_id in &collection.accession_ids {
            tx.execute(
                "INSERT INTO collection_members (collection_id, accession_id)
                 VALUES (?1, ?2);",
                params![collection.id.as_str(), accession_id.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(collection.id.clone())
    }

    fn set_collection_name(&self, id: &str, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE collections SET name = ?2 WHERE collection_id = ?1;",
            params![id, name],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Collection, id));
        }
        Ok(())
    }

    fn set_collection_note(&self, id: &str, note: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE collections SET note = ?2 WHERE collection_id = ?1;",
            params![id, note],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Collection, id));
        }
        Ok(())
    }

    fn remove_collection(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM collections WHERE collection_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn collection_exists(&self, id: &str) -> RepoResult<bool> {
        collection_exists_in(self.conn, id)
    }

    fn get_collection(&self, id: &str) -> RepoResult<Option<Collection>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let head = tx
            .query_row(
                "SELECT collection_id, name, note
                 FROM collections
                 WHERE collection_id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>("collection_id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("note")?,
                    ))
                },
            )
            .optional()?;

        let Some((collection_id, name, note)) = head else {
            return Ok(None);
        };
        let accession_ids = load_member_ids(&tx, &collection_id)?;
        tx.commit()?;

        Ok(Some(Collection {
            id: collection_id,
            name,
            note,
            accession_ids,
        }))
    }

    fn list_collection_range(
        &self,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<CollectionSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection_id, name
             FROM collections
             ORDER BY collection_id ASC
             LIMIT ?1 OFFSET ?2;",
        )?;
        let mut rows = stmt.query(params![to_sql_count(limit), to_sql_count(offset)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_summary_row(row)?);
        }
        Ok(items)
    }

    fn list_collections_after(
        &self,
        after: Option<&str>,
        limit: u64,
    ) -> RepoResult<Vec<CollectionSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection_id, name
             FROM collections
             WHERE ?1 IS NULL OR collection_id > ?1
             ORDER BY collection_id ASC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![after, to_sql_count(limit)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_summary_row(row)?);
        }
        Ok(items)
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<CollectionSummary> {
    let id: String = row.get("collection_id")?;
    if id.is_empty() {
        return Err(RepoError::InvalidData(
            "empty collection_id in collections".to_string(),
        ));
    }
    Ok(CollectionSummary {
        id,
        name: row.get("name")?,
    })
}
