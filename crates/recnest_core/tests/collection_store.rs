use recnest_core::db::open_db_in_memory;
use recnest_core::{
    AccessionService, AssociationService, Collection, CollectionRepository, CollectionService,
    EntityKind, MintAccession, RepoError, SqliteAccessionRepository, SqliteCollectionRepository,
    SqliteMembershipRepository, StoreError, StoreErrorKind,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> CollectionService<SqliteCollectionRepository<'_>> {
    CollectionService::new(SqliteCollectionRepository::try_new(conn).unwrap())
}

#[test]
fn mint_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    let id = collections
        .mint_collection("C1", "Books", Some("shelf 3".to_string()))
        .unwrap();
    assert_eq!(id, "C1");

    let loaded = collections.get_collection("C1").unwrap();
    assert_eq!(loaded.id, "C1");
    assert_eq!(loaded.name, "Books");
    assert_eq!(loaded.note, "shelf 3");
    assert!(loaded.accession_ids.is_empty());
}

#[test]
fn mint_without_note_stores_empty_note() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    collections.mint_collection("C1", "Books", None).unwrap();
    assert_eq!(collections.get_collection("C1").unwrap().note, "");
}

#[test]
fn minting_same_id_twice_fails_with_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    collections.mint_collection("a", "first", None).unwrap();
    let err = collections
        .mint_collection("a", "second", None)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::AlreadyExists {
            kind: EntityKind::Collection,
            ref id
        } if id == "a"
    ));
    assert_eq!(err.status_code(), 409);

    // The first mint is not overwritten.
    assert_eq!(collections.get_collection("a").unwrap().name, "first");

    collections.mint_collection("b", "other", None).unwrap();
    assert!(collections.collection_exists("b").unwrap());
}

#[test]
fn collection_and_accession_ids_are_independent_namespaces() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);
    let accessions = AccessionService::new(SqliteAccessionRepository::try_new(&conn).unwrap());

    collections.mint_collection("X1", "shared id", None).unwrap();
    accessions.mint_accession(MintAccession::new("X1")).unwrap();

    assert!(collections.collection_exists("X1").unwrap());
    assert!(accessions.accession_exists("X1").unwrap());
}

#[test]
fn mint_rejects_blank_identifier() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    let err = collections.mint_collection("  ", "Books", None).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::InvalidArgument);
}

#[test]
fn edits_replace_name_and_note() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);
    collections.mint_collection("C1", "Books", None).unwrap();

    collections.edit_collection_name("C1", "Rare Books").unwrap();
    collections.edit_collection_note("C1", "climate controlled").unwrap();

    let loaded = collections.get_collection("C1").unwrap();
    assert_eq!(loaded.name, "Rare Books");
    assert_eq!(loaded.note, "climate controlled");
}

#[test]
fn edits_on_missing_collection_fail_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    let name_err = collections.edit_collection_name("missing", "x").unwrap_err();
    assert_eq!(name_err.kind(), StoreErrorKind::NotFound);
    let note_err = collections.edit_collection_note("missing", "x").unwrap_err();
    assert_eq!(note_err.kind(), StoreErrorKind::NotFound);
    assert!(!collections.collection_exists("missing").unwrap());
}

#[test]
fn get_missing_collection_fails_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);

    let err = collections.get_collection("nope").unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Collection,
            ..
        }
    ));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn remove_collection_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);
    collections.mint_collection("C1", "Books", None).unwrap();

    assert_eq!(collections.remove_collection("C1").unwrap(), "C1");
    assert_eq!(collections.remove_collection("C1").unwrap(), "C1");
    assert_eq!(collections.remove_collection("never-minted").unwrap(), "never-minted");
    assert!(!collections.collection_exists("C1").unwrap());
}

#[test]
fn removed_id_can_be_minted_again_with_fresh_state() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);
    let associations =
        AssociationService::new(SqliteMembershipRepository::try_new(&conn).unwrap());

    collections.mint_collection("C1", "Books", None).unwrap();
    associations.associate("C1", "A1").unwrap();
    collections.remove_collection("C1").unwrap();

    collections.mint_collection("C1", "Maps", None).unwrap();
    let loaded = collections.get_collection("C1").unwrap();
    assert_eq!(loaded.name, "Maps");
    assert!(loaded.accession_ids.is_empty());
}

#[test]
fn removing_collection_leaves_accession_records_in_place() {
    let conn = open_db_in_memory().unwrap();
    let collections = service(&conn);
    let accessions = AccessionService::new(SqliteAccessionRepository::try_new(&conn).unwrap());

    collections.mint_collection("C1", "Books", None).unwrap();
    accessions
        .mint_accession(MintAccession::new("A1").in_collection("C1"))
        .unwrap();

    collections.remove_collection("C1").unwrap();
    assert!(accessions.accession_exists("A1").unwrap());
}

#[test]
fn repository_mint_persists_initial_membership_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCollectionRepository::try_new(&conn).unwrap();

    let mut collection = Collection::new("C1", "Imported");
    collection.accession_ids = vec!["A2".to_string(), "A1".to_string(), "A2".to_string()];
    repo.mint_collection(&collection).unwrap();

    let loaded = repo.get_collection("C1").unwrap().unwrap();
    assert_eq!(loaded, collection);
}

#[test]
fn repository_reports_duplicate_without_writing_members() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCollectionRepository::try_new(&conn).unwrap();
    repo.mint_collection(&Collection::new("C1", "Books")).unwrap();

    let mut clash = Collection::new("C1", "Clash");
    clash.accession_ids.push("A9".to_string());
    let err = repo.mint_collection(&clash).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists { .. }));

    let loaded = repo.get_collection("C1").unwrap().unwrap();
    assert!(loaded.accession_ids.is_empty());
}
