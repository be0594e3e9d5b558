//! Tests for the table session.

use super::*;
use crate::model::{Record, SortDirection};
use crate::view_state::EffectiveColumn;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn key(raw: &str) -> ColumnKey {
    ColumnKey::new(raw).expect("valid key")
}

fn id(raw: &str) -> RowId {
    RowId::new(raw).expect("valid id")
}

fn columns() -> Vec<Column> {
    vec![
        Column::new(key("name"), "Name").sortable(),
        Column::new(key("status"), "Status").sortable(),
        Column::new(key("age"), "Age").sortable().read_only(),
    ]
}

fn record(n: usize) -> Record {
    let status = if n % 2 == 0 { "active" } else { "inactive" };
    serde_json::from_value(json!({
        "id": format!("r{n:02}"),
        "name": format!("Person {n:02}"),
        "status": status,
        "age": 20 + n,
    }))
    .expect("valid record")
}

fn records(count: usize) -> Vec<Record> {
    (1..=count).map(record).collect()
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, event: String) {
        self.0.borrow_mut().push(event);
    }
}

impl TableCallbacks<Record> for Recorder {
    fn on_pagination_change(&mut self, pagination: &Pagination) {
        self.push(format!("page {}", pagination.page()));
    }

    fn on_sort_change(&mut self, sort: Option<&SortSpec>) {
        self.push(format!("sort {:?}", sort.map(|s| s.direction)));
    }

    fn on_filter_change(&mut self, filters: &Filters) {
        self.push(format!("filters {}", filters.len()));
    }

    fn on_row_click(&mut self, row: &Record) {
        self.push(format!("click {}", row.id()));
    }

    fn on_selection_change(&mut self, rows: &[Record]) {
        self.push(format!("selection {}", rows.len()));
    }

    fn on_retry(&mut self) {
        self.push("retry".to_string());
    }

    fn on_export(&mut self, format: ExportFormat, rows: &[Record], columns: &[&Column]) {
        self.push(format!("export {format} {} {}", rows.len(), columns.len()));
    }
}

fn local(count: usize) -> (TableSession<Record>, Recorder) {
    let recorder = Recorder::default();
    let session = TableSessionBuilder::new(columns())
        .rows(records(count))
        .features(TableFeatures {
            page_size: 10,
            ..TableFeatures::default()
        })
        .callbacks(recorder.clone())
        .build()
        .expect("valid schema");
    (session, recorder)
}

fn remote() -> (TableSession<Record>, Recorder) {
    let recorder = Recorder::default();
    let session = TableSessionBuilder::new(columns())
        .mode(DataMode::Remote)
        .features(TableFeatures {
            page_size: 2,
            ..TableFeatures::default()
        })
        .callbacks(recorder.clone())
        .build()
        .expect("valid schema");
    (session, recorder)
}

fn serve(session: &mut TableSession<Record>, rows: &[usize], total: usize) {
    let request = session.take_fetch().expect("fetch queued");
    let page = request.query.page;
    let response = FetchResponse {
        rows: rows.iter().copied().map(record).collect(),
        pagination: Pagination::for_request(page, total),
    };
    assert!(session.resolve_fetch(request.ticket, Ok(response)));
}

fn page_ids(session: &TableSession<Record>) -> Vec<String> {
    session
        .displayed_rows()
        .rows
        .iter()
        .map(|row| row.id().to_string())
        .collect()
}

// ===== construction =====

#[test]
fn empty_schema_is_rejected() {
    let result = TableSessionBuilder::<Record>::new(Vec::new()).build();
    assert_eq!(result.err(), Some(SchemaError::Empty));
}

#[test]
fn duplicate_keys_are_rejected() {
    let schema = vec![
        Column::new(key("name"), "Name"),
        Column::new(key("name"), "Again"),
    ];
    let result = TableSessionBuilder::<Record>::new(schema).build();
    assert_eq!(result.err(), Some(SchemaError::DuplicateKey(key("name"))));
}

#[test]
fn synthetic_columns_lead_in_fixed_order() {
    let (session, _) = local(3);
    let columns = session.effective_columns();
    let shape: Vec<Option<&str>> = columns.iter().map(|c| c.key().map(ColumnKey::as_str)).collect();
    assert!(matches!(columns.get(0), Some(EffectiveColumn::Expansion)));
    assert!(matches!(columns.get(1), Some(EffectiveColumn::Selection)));
    assert_eq!(shape[2..], [Some("name"), Some("status"), Some("age")]);
}

// ===== sort =====

#[test]
fn sort_clicks_cycle_and_notify() {
    let (mut session, recorder) = local(5);

    session.click_sort(&key("age")).expect("sortable");
    session.click_sort(&key("age")).expect("sortable");

    assert_eq!(page_ids(&session)[0], "r05");
    assert_eq!(
        recorder.events(),
        vec!["sort Some(Asc)".to_string(), "sort Some(Desc)".to_string()]
    );
}

#[test]
fn unsortable_click_changes_nothing() {
    let recorder = Recorder::default();
    let mut session = TableSessionBuilder::new(vec![Column::new(key("name"), "Name")])
        .rows(records(2))
        .callbacks(recorder.clone())
        .build()
        .expect("valid schema");

    assert_eq!(
        session.click_sort(&key("name")),
        Err(Rejection::NotSortable(key("name")))
    );
    assert_eq!(session.revision(), 0);
    assert!(recorder.events().is_empty());
}

// ===== search and filters =====

#[test]
fn search_commits_only_after_quiet_period() {
    let (mut session, recorder) = local(47);
    session.go_to_page(3).expect("paginated");
    recorder.clear();
    let start = Instant::now();

    session.type_search("Person 1", start);
    session.tick(start + Duration::from_millis(100)).expect("valid");
    assert!(session.state().filters().search().is_none());
    assert_eq!(session.toolbar().search_text, "Person 1");
    assert!(session.toolbar().search_pending);

    session.tick(start + Duration::from_millis(300)).expect("valid");

    assert_eq!(session.state().filters().search(), Some("Person 1"));
    assert_eq!(session.state().page().page(), 1);
    // "Person 10" through "Person 19"
    assert_eq!(session.displayed_rows().total, 10);
    assert_eq!(
        recorder.events(),
        vec!["filters 1".to_string(), "page 1".to_string()]
    );
}

#[test]
fn status_change_survives_pending_search() {
    let (mut session, _) = local(10);
    let start = Instant::now();

    session.type_search("Person", start);
    session.set_status(Some("active")).expect("valid");
    session.tick(start + Duration::from_secs(1)).expect("valid");

    let filters = session.state().filters();
    assert_eq!(filters.status(), Some("active"));
    assert_eq!(filters.search(), Some("Person"));
    assert_eq!(session.displayed_rows().total, 5);
}

#[test]
fn cycle_status_walks_options_then_clears() {
    let (mut session, _) = local(4);

    session.cycle_status().expect("valid");
    assert_eq!(session.state().filters().status(), Some("active"));
    session.cycle_status().expect("valid");
    assert_eq!(session.state().filters().status(), Some("inactive"));
    session.cycle_status().expect("valid");
    assert_eq!(session.state().filters().status(), None);
}

#[test]
fn clear_filters_discards_pending_search() {
    let (mut session, _) = local(4);
    let start = Instant::now();
    session.set_filter("name", "01").expect("valid");
    session.type_search("zzz", start);

    session.clear_filters().expect("valid");
    session.tick(start + Duration::from_secs(1)).expect("valid");

    assert!(session.state().filters().is_empty());
    assert_eq!(session.pending_search(), None);
}

// ===== pagination =====

#[test]
fn last_page_shows_remainder() {
    let (mut session, _) = local(47);

    session.go_to_page(5).expect("paginated");

    let pagination = session.pagination().expect("paginated");
    assert_eq!(pagination.display_range(), Some((41, 47)));
    assert_eq!(page_ids(&session).len(), 7);
}

#[test]
fn page_requests_are_clamped() {
    let (mut session, recorder) = local(47);

    session.go_to_page(99).expect("paginated");
    assert_eq!(session.state().page().page(), 5);

    recorder.clear();
    session.next_page().expect("paginated");
    assert_eq!(session.state().page().page(), 5);
    assert!(recorder.events().is_empty(), "no-op emits nothing");
}

#[test]
fn shrinking_rows_clamps_the_stored_page() {
    let (mut session, recorder) = local(100);
    session.go_to_page(10).expect("paginated");
    recorder.clear();

    session.set_rows(records(30));

    assert_eq!(session.state().page().page(), 3);
    assert_eq!(recorder.events(), vec!["page 3".to_string()]);

    session.prev_page().expect("paginated");
    assert_eq!(session.pagination().map(|p| p.page()), Some(2));
    assert_eq!(page_ids(&session).first().map(String::as_str), Some("r11"));
}

#[test]
fn growing_rows_keeps_the_stored_page() {
    let (mut session, recorder) = local(30);
    session.go_to_page(2).expect("paginated");
    recorder.clear();

    session.set_rows(records(100));

    assert_eq!(session.state().page().page(), 2);
    assert!(recorder.events().is_empty());
}

#[test]
fn unpaginated_table_shows_everything() {
    let mut session = TableSessionBuilder::new(columns())
        .rows(records(30))
        .features(TableFeatures {
            paginated: false,
            ..TableFeatures::default()
        })
        .build()
        .expect("valid schema");

    assert_eq!(page_ids(&session).len(), 30);
    assert_eq!(session.pagination(), None);
    assert_eq!(
        session.go_to_page(2),
        Err(Rejection::FeatureDisabled("pagination"))
    );
}

// ===== windowing =====

#[test]
fn virtual_window_uses_overscan() {
    let (session, _) = local(10);
    let window = session.window(1000, 100, 20);
    assert_eq!(window.start_index, 97);
    assert_eq!(window.end_index, 123);
}

#[test]
fn non_virtualized_window_covers_all_rows() {
    let session = TableSessionBuilder::new(columns())
        .rows(records(3))
        .features(TableFeatures {
            virtualized: false,
            ..TableFeatures::default()
        })
        .build()
        .expect("valid schema");

    let window = session.window(500, 120, 20);
    assert_eq!(window.range(), 0..500);
}

// ===== columns =====

#[test]
fn hiding_last_visible_column_is_rejected() {
    let (mut session, _) = local(3);
    session.toggle_column(&key("name")).expect("valid");
    session.toggle_column(&key("status")).expect("valid");

    assert_eq!(
        session.toggle_column(&key("age")),
        Err(Rejection::LastVisibleColumn)
    );
    assert_eq!(session.effective_columns().data_columns().len(), 1);
}

#[test]
fn hide_then_show_restores_position() {
    let (mut session, _) = local(3);
    session.toggle_column(&key("status")).expect("valid");
    session.toggle_column(&key("status")).expect("valid");

    let keys: Vec<&str> = session
        .effective_columns()
        .data_columns()
        .iter()
        .map(|c| c.key().as_str())
        .collect();
    assert_eq!(keys, vec!["name", "status", "age"]);
}

#[test]
fn sort_click_during_drag_is_ignored() {
    let (mut session, _) = local(3);
    session.drag_start(&key("age")).expect("known");

    assert_eq!(session.click_sort(&key("age")), Err(Rejection::DragInProgress));

    session.drag_end();
    session.click_sort(&key("age")).expect("drag over");
}

#[test]
fn on_drop_reorder_previews_in_effective_columns() {
    let mut session = TableSessionBuilder::new(columns())
        .rows(records(3))
        .features(TableFeatures {
            reorder_mode: ReorderMode::OnDrop,
            ..TableFeatures::default()
        })
        .build()
        .expect("valid schema");

    session.drag_start(&key("age")).expect("known");
    session.drag_over(&key("name")).expect("dragging");

    let first = |s: &TableSession<Record>| s.effective_columns().data_columns()[0].key().clone();
    assert_eq!(first(&session), key("age"));
    assert_eq!(session.state().column_order()[0], key("name"));

    session.drop_column().expect("dragging");
    session.drag_end();
    assert_eq!(session.state().column_order()[0], key("age"));
}

// ===== editing =====

#[test]
fn editing_synthetic_position_is_rejected() {
    let (mut session, _) = local(3);
    assert!(matches!(
        session.start_edit_at(&id("r01"), 1),
        Err(Rejection::NotEditable(_))
    ));
    assert_eq!(
        session.start_edit_at(&id("r01"), 9),
        Err(Rejection::ColumnOutOfRange(9))
    );
}

#[test]
fn editing_read_only_column_is_rejected() {
    let (mut session, _) = local(3);
    assert_eq!(
        session.start_edit(&id("r01"), &key("age")),
        Err(Rejection::NotEditable("age".to_string()))
    );
}

#[test]
fn row_click_suppressed_while_editing_that_row() {
    let (mut session, recorder) = local(3);
    session.start_edit(&id("r01"), &key("name")).expect("editable");

    assert_eq!(session.click_row(&id("r01")), Ok(false));
    assert_eq!(session.click_row(&id("r02")), Ok(true));
    assert_eq!(recorder.events(), vec!["click r02".to_string()]);
}

#[test]
fn failed_save_keeps_edit_open() {
    let (mut session, _) = local(3);
    session.start_edit(&id("r01"), &key("name")).expect("editable");
    session.edit_key(EditKey::Char('!')).expect("editing");
    let EditKeyOutcome::Save(request) = session.edit_key(EditKey::Enter).expect("editing") else {
        panic!("expected a save");
    };
    assert_eq!(request.value, json!("Person 01!"));

    let outcome = session.complete_save(request.ticket, Err(SaveError::new("locked")));

    assert_eq!(outcome, SaveOutcome::Failed(SaveError::new("locked")));
    let cell = session.editing().expect("still editing");
    assert_eq!(cell.input.text(), "Person 01!");
    assert_eq!(cell.last_error.as_deref(), Some("locked"));
}

#[test]
fn editing_disabled_by_feature_flag() {
    let mut session = TableSessionBuilder::new(columns())
        .rows(records(1))
        .features(TableFeatures {
            editable: false,
            ..TableFeatures::default()
        })
        .build()
        .expect("valid schema");

    assert_eq!(
        session.start_edit(&id("r01"), &key("name")),
        Err(Rejection::EditingDisabled)
    );
}

// ===== selection and bulk actions =====

#[test]
fn page_checkbox_selects_only_current_page() {
    let (mut session, recorder) = local(25);

    session.toggle_page_selection().expect("selectable");

    assert_eq!(session.state().selected_rows().len(), 10);
    assert_eq!(session.page_selection(), PageSelection::All);
    assert_eq!(recorder.events(), vec!["selection 10".to_string()]);

    session.next_page().expect("paginated");
    assert_eq!(session.page_selection(), PageSelection::None);
}

#[test]
fn selection_disabled_by_feature_flag() {
    let mut session = TableSessionBuilder::new(columns())
        .rows(records(1))
        .features(TableFeatures {
            selectable: false,
            ..TableFeatures::default()
        })
        .build()
        .expect("valid schema");

    assert_eq!(
        session.toggle_row(&id("r01")),
        Err(Rejection::FeatureDisabled("selection"))
    );
    assert!(!session.effective_columns().has_selection());
}

#[test]
fn bulk_action_sees_selection() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut session = TableSessionBuilder::new(columns())
        .rows(records(5))
        .bulk_action(
            "archive",
            Box::new(move |rows: &[Record]| {
                sink.borrow_mut()
                    .extend(rows.iter().map(|r| r.id().to_string()));
            }),
        )
        .build()
        .expect("valid schema");
    session.toggle_row(&id("r02")).expect("selectable");
    session.toggle_row(&id("r04")).expect("selectable");

    assert_eq!(session.run_bulk_action("archive"), Ok(2));
    assert_eq!(*seen.borrow(), vec!["r02".to_string(), "r04".to_string()]);
    assert_eq!(
        session.run_bulk_action("delete"),
        Err(Rejection::UnknownBulkAction("delete".to_string()))
    );
}

#[test]
fn expansion_toggles_independently_of_selection() {
    let (mut session, _) = local(3);
    session.toggle_expanded(&id("r01")).expect("expandable");

    assert!(session.state().is_expanded(&id("r01")));
    assert!(session.state().selected_rows().is_empty());
}

// ===== export =====

#[test]
fn export_all_ignores_pagination_and_synthetic_columns() {
    let (mut session, recorder) = local(25);
    session.set_status(Some("active")).expect("valid");
    recorder.clear();

    let document = session.export(ExportFormat::Csv, ExportScope::All);

    assert_eq!(document.len(), 12);
    assert_eq!(document.headers, vec!["Name", "Status", "Age"]);
    assert_eq!(recorder.events(), vec!["export csv 12 3".to_string()]);
}

#[test]
fn export_selected_uses_selection() {
    let (mut session, _) = local(5);
    session.toggle_row(&id("r03")).expect("selectable");

    let document = session.export(ExportFormat::Json, ExportScope::Selected);

    assert_eq!(document.len(), 1);
    assert_eq!(document.cell(0, "Name"), Some(&json!("Person 03")));
}

// ===== remote mode =====

#[test]
fn remote_session_starts_loading() {
    let (mut session, _) = remote();

    assert!(session.load_state().is_loading());
    serve(&mut session, &[1, 2], 6);

    assert_eq!(session.load_state(), &LoadState::Ready);
    assert_eq!(page_ids(&session), vec!["r01", "r02"]);
    assert_eq!(session.pagination().map(|p| p.total_pages()), Some(3));
}

#[test]
fn stale_fetch_response_is_dropped() {
    let (mut session, _) = remote();
    let first = session.take_fetch().expect("initial fetch");
    session.click_sort(&key("name")).expect("sortable");
    let second = session.take_fetch().expect("sort fetch");

    let late = FetchResponse {
        rows: vec![record(9)],
        pagination: Pagination::new(1, 2, 1),
    };
    assert!(!session.resolve_fetch(first.ticket, Ok(late)));
    assert!(session.rows().is_empty());

    let fresh = FetchResponse {
        rows: vec![record(1)],
        pagination: Pagination::new(1, 2, 1),
    };
    assert!(session.resolve_fetch(second.ticket, Ok(fresh)));
    assert_eq!(page_ids(&session), vec!["r01"]);
}

#[test]
fn failed_fetch_then_retry() {
    let (mut session, recorder) = remote();
    let request = session.take_fetch().expect("initial fetch");

    session.resolve_fetch(request.ticket, Err(DataError::new("offline")));
    assert_eq!(session.load_state().error_message(), Some("offline"));

    session.retry();

    assert_eq!(recorder.events(), vec!["retry".to_string()]);
    assert!(session.load_state().is_loading());
    let again = session.take_fetch().expect("retried");
    assert_eq!(again.query, request.query);
    assert_ne!(again.ticket, request.ticket);
}

#[test]
fn selection_spans_remote_pages() {
    let (mut session, recorder) = remote();
    serve(&mut session, &[1, 2], 4);
    session.toggle_row(&id("r01")).expect("selectable");

    session.next_page().expect("paginated");
    serve(&mut session, &[3, 4], 4);
    session.toggle_row(&id("r04")).expect("selectable");

    let selected: Vec<String> = session.selected_rows().iter().map(|r| r.id().to_string()).collect();
    assert_eq!(selected, vec!["r04".to_string(), "r01".to_string()]);
    assert_eq!(recorder.events().last().map(String::as_str), Some("selection 2"));
}

#[test]
fn remote_page_change_requests_new_page() {
    let (mut session, recorder) = remote();
    serve(&mut session, &[1, 2], 6);

    session.go_to_page(3).expect("paginated");

    let request = session.take_fetch().expect("page fetch");
    assert_eq!(request.query.page.page(), 3);
    assert_eq!(recorder.events(), vec!["page 3".to_string()]);
}

#[test]
fn shrunken_remote_total_clamps_and_refetches() {
    let (mut session, recorder) = remote();
    serve(&mut session, &[1, 2], 10);
    session.go_to_page(5).expect("paginated");
    serve(&mut session, &[9, 10], 10);
    recorder.clear();

    session.refresh();
    serve(&mut session, &[], 4);

    assert_eq!(session.state().page().page(), 2);
    assert_eq!(recorder.events(), vec!["page 2".to_string()]);
    let request = session.take_fetch().expect("clamped page fetch");
    assert_eq!(request.query.page.page(), 2);
    assert!(session.load_state().is_loading());

    let response = FetchResponse {
        rows: vec![record(3), record(4)],
        pagination: Pagination::for_request(request.query.page, 4),
    };
    assert!(session.resolve_fetch(request.ticket, Ok(response)));
    assert_eq!(page_ids(&session), vec!["r03".to_string(), "r04".to_string()]);

    session.prev_page().expect("paginated");
    assert_eq!(session.take_fetch().map(|r| r.query.page.page()), Some(1));
}

#[test]
fn sort_direction_reaches_remote_query() {
    let (mut session, _) = remote();
    serve(&mut session, &[1, 2], 2);

    session.click_sort(&key("status")).expect("sortable");
    session.click_sort(&key("status")).expect("sortable");

    let request = session.take_fetch().expect("sort fetch");
    assert_eq!(
        request.query.sort.map(|s| s.direction),
        Some(SortDirection::Desc)
    );
}
