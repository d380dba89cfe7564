use proptest::prelude::*;
use recnest_core::db::open_db_in_memory;
use recnest_core::{
    CollectionService, SqliteCollectionRepository, StoreConfig, StoreErrorKind, INITIAL_CURSOR,
};
use rusqlite::Connection;

fn service_with_max(
    conn: &Connection,
    max_limit: u32,
) -> CollectionService<SqliteCollectionRepository<'_>> {
    let config = StoreConfig {
        max_limit,
        ..StoreConfig::default()
    };
    CollectionService::with_config(SqliteCollectionRepository::try_new(conn).unwrap(), &config)
}

fn mint_all(service: &CollectionService<SqliteCollectionRepository<'_>>, ids: &[&str]) {
    for id in ids {
        service
            .mint_collection(*id, format!("name-{id}"), None)
            .unwrap();
    }
}

fn page_ids(page: &recnest_core::CollectionPage) -> Vec<&str> {
    page.items.iter().map(|item| item.id.as_str()).collect()
}

#[test]
fn five_collections_paged_by_two() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 1000);
    mint_all(&service, &["3", "0", "4", "1", "2"]);

    let first = service.list_collections(INITIAL_CURSOR, Some(2)).unwrap();
    assert_eq!(page_ids(&first), vec!["0", "1"]);
    assert_eq!(first.next_cursor.as_deref(), Some("2"));
    assert_eq!(first.cursor, "0");
    assert_eq!(first.limit, 2);

    let second = service.list_collections("2", Some(2)).unwrap();
    assert_eq!(page_ids(&second), vec!["2", "3"]);
    assert_eq!(second.next_cursor.as_deref(), Some("4"));

    let last = service.list_collections("4", Some(2)).unwrap();
    assert_eq!(page_ids(&last), vec!["4"]);
    assert_eq!(last.next_cursor, None);
}

#[test]
fn exact_fit_last_page_has_no_next_cursor() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 1000);
    mint_all(&service, &["a", "b", "c", "d"]);

    let page = service.list_collections("2", Some(2)).unwrap();
    assert_eq!(page_ids(&page), vec!["c", "d"]);
    assert_eq!(page.next_cursor, None);
}

#[test]
fn pages_carry_names_and_use_lexicographic_id_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 1000);
    mint_all(&service, &["10", "9", "100", "B", "a"]);

    let page = service.list_collections("0", None).unwrap();
    assert_eq!(page_ids(&page), vec!["10", "100", "9", "B", "a"]);
    assert_eq!(page.items[0].name, "name-10");
}

#[test]
fn cursor_past_the_end_returns_empty_last_page() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 1000);
    mint_all(&service, &["a", "b"]);

    let page = service.list_collections("10", Some(5)).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}

#[test]
fn empty_store_lists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 1000);

    let page = service.list_collections(INITIAL_CURSOR, Some(10)).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}

#[test]
fn limit_above_max_is_capped_not_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 3);
    mint_all(&service, &["a", "b", "c", "d", "e"]);

    let page = service.list_collections("0", Some(1000)).unwrap();
    assert_eq!(page.limit, 3);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next_cursor.as_deref(), Some("3"));
}

#[test]
fn missing_limit_defaults_to_max() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 2);
    mint_all(&service, &["a", "b", "c"]);

    let page = service.list_collections("0", None).unwrap();
    assert_eq!(page.limit, 2);
    assert_eq!(page_ids(&page), vec!["a", "b"]);
}

#[test]
fn malformed_cursor_is_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 10);

    let err = service.list_collections("next", Some(2)).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::InvalidArgument);
    assert_eq!(err.status_code(), 400);
}

#[test]
fn offset_pages_shift_when_earlier_entries_are_inserted() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 10);
    mint_all(&service, &["b", "c", "d"]);

    let first = service.list_collections("0", Some(2)).unwrap();
    assert_eq!(page_ids(&first), vec!["b", "c"]);

    // An insert before the cursor pushes "c" onto the next offset page.
    mint_all(&service, &["a"]);
    let second = service
        .list_collections(first.next_cursor.as_deref().unwrap(), Some(2))
        .unwrap();
    assert_eq!(page_ids(&second), vec!["c", "d"]);
}

#[test]
fn keyset_pages_are_stable_under_earlier_inserts() {
    let conn = open_db_in_memory().unwrap();
    let service = service_with_max(&conn, 10);
    mint_all(&service, &["b", "c", "d"]);

    let first = service.list_collections_after(None, Some(2)).unwrap();
    let first_ids: Vec<&str> = first.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(first_ids, vec!["b", "c"]);
    assert_eq!(first.next_after.as_deref(), Some("c"));

    mint_all(&service, &["a"]);
    let second = service
        .list_collections_after(first.next_after.as_deref(), Some(2))
        .unwrap();
    let second_ids: Vec<&str> = second.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(second_ids, vec!["d"]);
    assert_eq!(second.next_after, None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn following_next_cursor_visits_every_collection_once(
        ids in prop::collection::btree_set("[a-zA-Z0-9_-]{1,12}", 0..40),
        limit in 1u32..8,
    ) {
        let conn = open_db_in_memory().unwrap();
        let service = service_with_max(&conn, 5);
        for id in &ids {
            service.mint_collection(id.as_str(), "n", None).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = INITIAL_CURSOR.to_string();
        loop {
            let page = service.list_collections(&cursor, Some(limit)).unwrap();
            prop_assert!(page.items.len() <= limit.min(5) as usize);
            seen.extend(page.items.into_iter().map(|item| item.id));
            match page.next_cursor {
                Some(next) => cursor = next,
                None => break,
            }
        }

        let mut expected: Vec<String> = ids.into_iter().collect();
        expected.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        prop_assert_eq!(seen, expected);
    }
}
