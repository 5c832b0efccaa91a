//! Row type and sorting.

use std::cmp::Ordering;

/// One parsed record, positionally aligned with its mode's fields.
pub type Row = Vec<String>;

/// Sort key for a single cell.
///
/// Numbers order before text so that a column mixing both still has a total
/// order; within each kind values compare naturally.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    pub fn parse(value: &'a str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) => SortKey::Number(n),
            Err(_) => SortKey::Text(value),
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Compares two cell values: numerically if both parse as numbers,
/// lexicographically otherwise.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    SortKey::parse(a).compare(&SortKey::parse(b))
}

/// Sorts rows in place by the 1-based `field`.
///
/// The sort is stable, so rows with equal keys keep their relative order in
/// both directions. A `field` of zero or past the end of a row leaves the
/// order untouched.
///
/// Values that parse as numbers compare numerically, others as strings. In a
/// column mixing both, numbers sort before text (after it when descending).
pub fn sort_rows(rows: &mut [Row], field: usize, descending: bool) {
    let Some(col) = field.checked_sub(1) else {
        return;
    };
    if rows.iter().any(|r| r.len() <= col) {
        return;
    }
    rows.sort_by(|a, b| {
        let cmp = compare_values(&a[col], &b[col]);
        if descending { cmp.reverse() } else { cmp }
    });
}
