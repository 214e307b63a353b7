use std::cmp::Ordering;
use std::collections::BTreeSet;

use itertools::Itertools;

use crate::columns::remap_index;
use crate::data::CellValue;
use crate::errors::DashboardError;
use crate::table::{BodyRow, TableStructure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// tablesorter's numeric code: 0 ascending, 1 descending.
    pub fn code(self) -> u8 {
        match self {
            SortDirection::Ascending => 0,
            SortDirection::Descending => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        SortKey {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: usize) -> Self {
        SortKey {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// Sort keys in tablesorter's `sortList` notation, e.g. `[[0,0],[1,1]]`.
pub fn sort_list_literal(keys: &[SortKey]) -> String {
    format!(
        "[{}]",
        keys.iter()
            .map(|k| format!("[{},{}]", k.column, k.direction.code()))
            .join(",")
    )
}

/// Sort keys for the same table after removing the columns at `removed`;
/// keys on removed columns are dropped.
pub fn remap_sort_keys(keys: &[SortKey], removed: &[usize]) -> Vec<SortKey> {
    keys.iter()
        .filter_map(|key| {
            remap_index(key.column, removed).map(|column| SortKey {
                column,
                direction: key.direction,
            })
        })
        .collect()
}

/// Numbers before text, numbers numerically, text case-insensitively.
fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
        (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
        (CellValue::Text(x), CellValue::Text(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
    }
}

fn compare_rows(a: &BodyRow, b: &BodyRow, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| {
            let ordering = match (a.cells.get(key.column), b.cells.get(key.column)) {
                (Some(x), Some(y)) => compare_values(&x.raw, &y.raw),
                _ => Ordering::Equal,
            };
            match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// A built table with click-to-sort semantics.
///
/// Only body rows take part in sorting; the group header and the aggregate
/// row stay where they are. Sorting never re-runs the filters: it reorders the
/// rows that were rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SortableTable {
    table: TableStructure,
    excluded: BTreeSet<usize>,
    sort_list: Vec<SortKey>,
}

impl SortableTable {
    /// Attach sort behavior and apply `default_sort` once.
    pub fn new(
        table: TableStructure,
        default_sort: &[SortKey],
        excluded: impl IntoIterator<Item = usize>,
    ) -> Result<Self, DashboardError> {
        let mut sortable = SortableTable {
            table,
            excluded: excluded.into_iter().collect(),
            sort_list: Vec::new(),
        };
        sortable.sort_by(default_sort)?;
        Ok(sortable)
    }

    pub fn is_sortable(&self, column: usize) -> bool {
        column < self.table.column_count() && !self.excluded.contains(&column)
    }

    /// Every title-row column except the excluded ones.
    pub fn sortable_columns(&self) -> Vec<usize> {
        (0..self.table.column_count())
            .filter(|col| self.is_sortable(*col))
            .collect()
    }

    /// Reorder the body rows by `keys` (first key most significant). The sort
    /// is stable.
    ///
    /// # Errors
    /// Rejects keys naming excluded or out of range columns; the order is then
    /// left unchanged.
    pub fn sort_by(&mut self, keys: &[SortKey]) -> Result<(), DashboardError> {
        if let Some(key) = keys.iter().find(|k| !self.is_sortable(k.column)) {
            return Err(DashboardError::UnsortableColumn { column: key.column });
        }
        self.table.rows.sort_by(|a, b| compare_rows(a, b, keys));
        self.sort_list = keys.to_vec();
        Ok(())
    }

    pub fn table(&self) -> &TableStructure {
        &self.table
    }

    /// Keys of the last applied sort.
    pub fn sort_list(&self) -> &[SortKey] {
        &self.sort_list
    }
}
