//! Connection readiness checks shared by the SQLite repositories.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub(crate) const COLLECTION_TABLES: &[(&str, &[&str])] = &[
    ("collections", &["collection_id", "name", "note"]),
    (
        "collection_members",
        &["member_seq", "collection_id", "accession_id"],
    ),
];

pub(crate) const ACCESSION_TABLES: &[(&str, &[&str])] = &[
    (
        "accessions",
        &["accession_id", "note", "linked_accession_id"],
    ),
    (
        "accession_external_ids",
        &["entry_seq", "accession_id", "external_id"],
    ),
];

/// Verifies `conn` is fully migrated and exposes every listed table/column.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
