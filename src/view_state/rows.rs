//! Local row derivation: filter, sort, paginate.
//!
//! Used when the whole row collection is in memory. In collaborator-driven mode
//! the server has already done this work and rows are displayed as delivered.

use crate::model::filters::STATUS;
use crate::model::row::{compare_values, display_value, value_contains};
use crate::model::{Column, ColumnKey, Filters, PageRequest, Pagination, SortDirection, SortSpec, TableRow};

/// Filtered, sorted rows with the current page cut out.
#[derive(Debug)]
pub struct DerivedRows<'a, R> {
    /// Rows to display (the current page, or everything when unpaginated).
    pub rows: Vec<&'a R>,
    /// Number of rows matching the filters.
    pub total: usize,
    /// Page descriptor, when paginating.
    pub pagination: Option<Pagination>,
}

/// Whether `row` passes every active filter.
///
/// - `search`: case-insensitive substring over every schema column
/// - `status`: case-insensitive equality on the `status` field
/// - anything else: case-insensitive substring on the field of the same name
pub fn row_matches<R: TableRow>(row: &R, schema: &[Column], filters: &Filters) -> bool {
    if let Some(search) = filters.search() {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty()
            && !schema
                .iter()
                .any(|column| value_contains(&row.value(column.key()), &needle))
        {
            return false;
        }
    }

    if let Some(status) = filters.status() {
        if let Ok(key) = ColumnKey::new(STATUS) {
            let actual = display_value(&row.value(&key));
            if !actual.eq_ignore_ascii_case(status.trim()) {
                return false;
            }
        }
    }

    filters.advanced().all(|(name, wanted)| {
        let needle = wanted.trim().to_lowercase();
        match ColumnKey::new(name) {
            Ok(key) => value_contains(&row.value(&key), &needle),
            Err(_) => true,
        }
    })
}

/// Rows passing the filters, in input order.
pub fn filter_rows<'a, R: TableRow>(rows: &'a [R], schema: &[Column], filters: &Filters) -> Vec<&'a R> {
    rows.iter()
        .filter(|row| row_matches(*row, schema, filters))
        .collect()
}

/// Stable sort by the given spec. `None` keeps input order.
pub fn sort_rows<R: TableRow>(rows: &mut [&R], sort: Option<&SortSpec>) {
    let Some(sort) = sort else {
        return;
    };
    rows.sort_by(|a, b| {
        let ordering = compare_values(&a.value(&sort.key), &b.value(&sort.key));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Every matching row in display order, unpaginated.
pub fn filtered_sorted<'a, R: TableRow>(
    rows: &'a [R],
    schema: &[Column],
    filters: &Filters,
    sort: Option<&SortSpec>,
) -> Vec<&'a R> {
    let mut matched = filter_rows(rows, schema, filters);
    sort_rows(&mut matched, sort);
    matched
}

/// Filter, sort and, if `page` is given, paginate.
///
/// The page number is clamped into range, so a request past the last page
/// shows the last page.
pub fn derive_rows<'a, R: TableRow>(
    rows: &'a [R],
    schema: &[Column],
    filters: &Filters,
    sort: Option<&SortSpec>,
    page: Option<PageRequest>,
) -> DerivedRows<'a, R> {
    let matched = filtered_sorted(rows, schema, filters, sort);
    let total = matched.len();

    match page {
        None => DerivedRows {
            rows: matched,
            total,
            pagination: None,
        },
        Some(request) => {
            let pagination = Pagination::for_request(request, total);
            let rows = matched
                .into_iter()
                .skip(pagination.offset())
                .take(pagination.page_size())
                .collect();
            DerivedRows {
                rows,
                total,
                pagination: Some(pagination),
            }
        }
    }
}
