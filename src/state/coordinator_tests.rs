//! Tests for the sort / filter / pagination coordinator.

use super::*;
use crate::model::{Column, SortDirection};

fn key(raw: &str) -> ColumnKey {
    ColumnKey::new(raw).expect("valid key")
}

fn columns() -> Vec<Column> {
    vec![
        Column::new(key("name"), "Name").sortable(),
        Column::new(key("email"), "Email"),
        Column::new(key("status"), "Status").sortable(),
    ]
}

fn setup(mode: DataMode) -> (Coordinator, TableStore) {
    (
        Coordinator::new(mode, Duration::from_millis(300)),
        TableStore::new(&columns(), Filters::new(), 10),
    )
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ===== sort =====

#[test]
fn sort_click_cycles_asc_desc_asc() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let mut seen = Vec::new();
    for _ in 0..3 {
        coordinator.click_sort(&mut store, &key("name")).expect("sortable");
        seen.push(store.state().sort().map(|s| s.direction));
    }
    assert_eq!(
        seen,
        vec![
            Some(SortDirection::Asc),
            Some(SortDirection::Desc),
            Some(SortDirection::Asc)
        ]
    );
}

#[test]
fn sort_click_on_new_column_starts_ascending() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator.click_sort(&mut store, &key("name")).expect("sortable");
    coordinator.click_sort(&mut store, &key("name")).expect("sortable");
    coordinator.click_sort(&mut store, &key("status")).expect("sortable");
    assert_eq!(store.state().sort(), Some(&SortSpec::asc(key("status"))));
}

#[test]
fn sort_click_on_unsortable_column_changes_nothing() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator.click_sort(&mut store, &key("name")).expect("sortable");

    let result = coordinator.click_sort(&mut store, &key("email"));

    assert_eq!(result, Err(Rejection::NotSortable(key("email"))));
    assert_eq!(store.state().sort(), Some(&SortSpec::asc(key("name"))));
}

#[test]
fn sort_click_keeps_current_page() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let pagination = Pagination::new(1, 10, 100);
    coordinator.go_to_page(&mut store, &pagination, 4).expect("valid");

    coordinator.click_sort(&mut store, &key("name")).expect("sortable");

    assert_eq!(store.state().page().page(), 4);
}

// ===== search debounce =====

#[test]
fn search_commits_only_after_quiet_period() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let start = Instant::now();
    coordinator.type_search("a", start);
    coordinator.type_search("ad", start + ms(100));
    coordinator.type_search("ada", start + ms(200));

    assert_eq!(coordinator.tick(&mut store, start + ms(400)).expect("ok"), None);
    assert_eq!(store.state().filters().search(), None);
    assert_eq!(coordinator.pending_search(), Some("ada"));

    let outcome = coordinator
        .tick(&mut store, start + ms(500))
        .expect("ok")
        .expect("committed");
    assert!(outcome.changes.filters);
    assert_eq!(store.state().filters().search(), Some("ada"));
    assert_eq!(coordinator.pending_search(), None);
}

#[test]
fn delayed_search_does_not_clobber_later_status_change() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let start = Instant::now();
    coordinator.type_search("ada", start);
    coordinator
        .set_status(&mut store, Some("active"))
        .expect("valid");

    coordinator.tick(&mut store, start + ms(300)).expect("ok");

    let filters = store.state().filters();
    assert_eq!(filters.search(), Some("ada"));
    assert_eq!(filters.status(), Some("active"));
}

#[test]
fn flush_search_commits_immediately() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator.type_search("ada", Instant::now());

    coordinator.flush_search(&mut store).expect("ok");

    assert_eq!(store.state().filters().search(), Some("ada"));
}

#[test]
fn unchanged_search_commit_keeps_page() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator.set_filter(&mut store, SEARCH, "ada").expect("valid");
    coordinator
        .go_to_page(&mut store, &Pagination::new(1, 10, 50), 3)
        .expect("valid");

    coordinator.type_search("ada", Instant::now());
    let outcome = coordinator.flush_search(&mut store).expect("ok").expect("fired");

    assert!(!outcome.changes.any());
    assert_eq!(store.state().page().page(), 3);
}

// ===== filters reset the page =====

#[test]
fn status_change_resets_to_first_page() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator
        .go_to_page(&mut store, &Pagination::new(1, 10, 100), 5)
        .expect("valid");

    let outcome = coordinator.set_status(&mut store, Some("active")).expect("valid");

    assert!(outcome.changes.filters && outcome.changes.page);
    assert_eq!(store.state().page().page(), 1);
}

#[test]
fn advanced_filter_resets_to_first_page() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator
        .go_to_page(&mut store, &Pagination::new(1, 10, 100), 3)
        .expect("valid");

    coordinator.set_filter(&mut store, "email", "example.com").expect("valid");

    assert_eq!(store.state().page().page(), 1);
    assert_eq!(store.state().filters().get("email"), Some("example.com"));
}

#[test]
fn clear_filters_resets_everything_in_one_revision() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator.set_filter(&mut store, SEARCH, "ada").expect("valid");
    coordinator.set_status(&mut store, Some("active")).expect("valid");
    coordinator.set_filter(&mut store, "email", "x").expect("valid");
    coordinator
        .go_to_page(&mut store, &Pagination::new(1, 10, 100), 2)
        .expect("valid");
    coordinator.type_search("pending text", Instant::now());
    let before = store.revision();

    coordinator.clear_filters(&mut store).expect("valid");

    assert!(store.state().filters().is_empty());
    assert_eq!(store.state().page().page(), 1);
    assert_eq!(store.revision(), before + 1);
    assert_eq!(coordinator.pending_search(), None);
}

// ===== pages =====

#[test]
fn page_change_is_clamped() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let pagination = Pagination::new(1, 10, 47);

    coordinator.go_to_page(&mut store, &pagination, 99).expect("valid");
    assert_eq!(store.state().page().page(), 5);

    coordinator.go_to_page(&mut store, &pagination, 0).expect("valid");
    assert_eq!(store.state().page().page(), 1);
}

#[test]
fn page_size_change_resets_page() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    coordinator
        .go_to_page(&mut store, &Pagination::new(1, 10, 100), 7)
        .expect("valid");

    coordinator.set_page_size(&mut store, 50).expect("valid");

    assert_eq!(store.state().page(), PageRequest::first(50));
}

// ===== remote fetches =====

#[test]
fn local_mode_never_fetches() {
    let (mut coordinator, mut store) = setup(DataMode::Local);
    let outcome = coordinator.click_sort(&mut store, &key("name")).expect("sortable");
    assert!(outcome.fetch.is_none());
}

#[test]
fn remote_mode_fetches_on_row_affecting_change() {
    let (mut coordinator, mut store) = setup(DataMode::Remote);

    let outcome = coordinator.click_sort(&mut store, &key("name")).expect("sortable");

    let request = outcome.fetch.expect("fetch issued");
    assert_eq!(request.query.sort, Some(SortSpec::asc(key("name"))));
    assert_eq!(coordinator.in_flight(), Some(&request));
}

#[test]
fn identical_query_is_not_reissued_while_in_flight() {
    let (mut coordinator, store) = setup(DataMode::Remote);
    assert!(coordinator.request_fetch(store.state()).is_some());
    assert!(coordinator.request_fetch(store.state()).is_none());
}

#[test]
fn newer_request_supersedes_older_ticket() {
    let (mut coordinator, mut store) = setup(DataMode::Remote);
    let first = coordinator.request_fetch(store.state()).expect("fetch");
    let second = coordinator
        .click_sort(&mut store, &key("name"))
        .expect("sortable")
        .fetch
        .expect("fetch");

    assert!(second.ticket > first.ticket);
    assert!(!coordinator.resolve(first.ticket), "stale ticket dropped");
    assert!(coordinator.resolve(second.ticket));
    assert!(coordinator.in_flight().is_none());
}

#[test]
fn retry_reissues_last_query_with_fresh_ticket() {
    let (mut coordinator, mut store) = setup(DataMode::Remote);
    let original = coordinator
        .click_sort(&mut store, &key("status"))
        .expect("sortable")
        .fetch
        .expect("fetch");
    assert!(coordinator.resolve(original.ticket));

    let retried = coordinator.retry(store.state()).expect("retry");

    assert_eq!(retried.query, original.query);
    assert_ne!(retried.ticket, original.ticket);
}
