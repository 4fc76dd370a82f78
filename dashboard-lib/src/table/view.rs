//! View derivation: filter, sort, paginate.
//!
//! All functions here are pure over a record slice and never reorder or
//! copy records; they hand back references in display order.

use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::ops::Range;

use crate::model::ColumnSpec;
use crate::model::Record;
use crate::model::Value;

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Header indicator for this direction.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Keeps records with a case-insensitive substring match of `term` in any
/// of the given columns. An empty term keeps everything.
pub fn filter<'a>(records: &'a [Record], columns: &[ColumnSpec], term: &str) -> Vec<&'a Record> {
    if term.is_empty() {
        return records.iter().collect();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            columns
                .iter()
                .any(|column| record.display(&column.name).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Comparison key of one cell.
///
/// Variant order is the sort order: missing values first, then numbers,
/// then text. This keeps the comparator total when a column mixes kinds.
#[derive(Debug, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(value) if value.is_blank() => Self::Missing,
            Some(value) => match value.as_number() {
                Some(n) => Self::Number(n),
                None => {
                    let raw = value.to_string();
                    Self::Text {
                        folded: raw.to_lowercase(),
                        raw,
                    }
                }
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Number(_) => 1,
            Self::Text { .. } => 2,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (
                Self::Text { folded: a, raw: ra },
                Self::Text { folded: b, raw: rb },
            ) => a.cmp(b).then_with(|| ra.cmp(rb)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Ascending comparison of two records on `column`.
pub fn compare(a: &Record, b: &Record, column: &str) -> Ordering {
    SortKey::of(a.get(column)).cmp(&SortKey::of(b.get(column)))
}

/// Stable in-place sort of record references.
pub fn sort(rows: &mut [&Record], column: &str, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => rows.sort_by(|a, b| compare(a, b, column)),
        SortDirection::Descending => rows.sort_by(|a, b| compare(b, a, column)),
    }
}

/// Number of pages for `count` rows; never less than one.
pub fn total_pages(count: usize, per_page: NonZeroUsize) -> usize {
    count.div_ceil(per_page.get()).max(1)
}

/// Index range of the 1-based `page`, clipped to `count`.
pub fn page_range(count: usize, page: usize, per_page: NonZeroUsize) -> Range<usize> {
    let per_page = per_page.get();
    let start = page.saturating_sub(1).saturating_mul(per_page).min(count);
    let end = start.saturating_add(per_page).min(count);
    start..end
}
