use crate::columns::remap_index;
use crate::data::{CellValue, DataRow, ReportDataset};
use crate::defaults::SUMMARY_GROUPS;
use crate::errors::{DashboardError, RowPosition};
use crate::filter::{self, FilterState};
use crate::formatter::ColumnFormatter;
use crate::thresholds::CellStatus;

/// A labelled run of adjacent columns in the group header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub label: String,
    pub span: usize,
}

/// Second header row grouping the per-column titles (statistics table only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroupSpec {
    groups: Vec<ColumnGroup>,
}

impl ColumnGroupSpec {
    pub fn new<S: Into<String>>(groups: impl IntoIterator<Item = (S, usize)>) -> Self {
        ColumnGroupSpec {
            groups: groups
                .into_iter()
                .map(|(label, span)| ColumnGroup {
                    label: label.into(),
                    span,
                })
                .collect(),
        }
    }

    /// Requests / Executions / Response Times / Throughput / Network.
    pub fn summary() -> Self {
        ColumnGroupSpec::new(SUMMARY_GROUPS)
    }

    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    pub fn total_span(&self) -> usize {
        self.groups.iter().map(|g| g.span).sum()
    }

    /// Every group spans at least one column and the spans cover exactly
    /// `column_count` columns.
    pub fn validate(&self, column_count: usize) -> Result<(), DashboardError> {
        if let Some(group) = self.groups.iter().find(|g| g.span == 0) {
            return Err(DashboardError::ZeroSpan {
                label: group.label.clone(),
            });
        }
        let total = self.total_span();
        if total != column_count {
            return Err(DashboardError::GroupSpanMismatch {
                total,
                columns: column_count,
            });
        }
        Ok(())
    }

    /// Spec for the same table after removing the columns at `removed`
    /// (sorted, ascending). Groups losing all their columns disappear.
    pub fn without_columns(&self, removed: &[usize]) -> Self {
        let mut start = 0;
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let kept = (start..start + group.span)
                .filter(|col| remap_index(*col, removed).is_some())
                .count();
            start += group.span;
            if kept > 0 {
                groups.push(ColumnGroup {
                    label: group.label.clone(),
                    span: kept,
                });
            }
        }
        ColumnGroupSpec { groups }
    }
}

/// A rendered cell: display text plus the raw value it was formatted from.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub raw: CellValue,
    pub status: Option<CellStatus>,
}

/// A rendered data row.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    pub cells: Vec<Cell>,
    pub is_controller: bool,
    /// Position of the row in the dataset's items.
    pub source_index: usize,
}

/// A row of the dataset that was not rendered because it does not fit the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedRow {
    pub position: RowPosition,
    pub expected: usize,
    pub actual: usize,
}

impl From<RejectedRow> for DashboardError {
    fn from(row: RejectedRow) -> Self {
        DashboardError::RowArity {
            position: row.position,
            expected: row.expected,
            actual: row.actual,
        }
    }
}

/// Immutable result of a table build. Projectors render it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructure {
    pub group_header: Option<Vec<ColumnGroup>>,
    pub titles: Vec<String>,
    /// Aggregate row, always rendered first and never sorted.
    pub overall: Option<BodyRow>,
    pub rows: Vec<BodyRow>,
    pub rejected_rows: Vec<RejectedRow>,
}

impl TableStructure {
    pub fn column_count(&self) -> usize {
        self.titles.len()
    }

    /// Number of rendered rows: header rows, the aggregate row and body rows.
    pub fn row_count(&self) -> usize {
        self.header_row_count() + usize::from(self.overall.is_some()) + self.rows.len()
    }

    pub fn header_row_count(&self) -> usize {
        usize::from(self.group_header.is_some()) + 1
    }
}

fn format_row(row: &DataRow, source_index: usize, formatter: &ColumnFormatter) -> BodyRow {
    BodyRow {
        cells: row
            .data
            .iter()
            .enumerate()
            .map(|(col, value)| Cell {
                text: formatter.format(col, value),
                raw: value.clone(),
                status: None,
            })
            .collect(),
        is_controller: row.is_controller,
        source_index,
    }
}

fn check_arity(row: &DataRow, position: RowPosition, expected: usize) -> Result<(), RejectedRow> {
    if row.data.len() == expected {
        Ok(())
    } else {
        Err(RejectedRow {
            position,
            expected,
            actual: row.data.len(),
        })
    }
}

/// Build the table for `dataset` under `state`.
///
/// Emits the optional group header, the title row in dataset order, the
/// aggregate row (unfiltered) and every item that passes the filters, in
/// dataset order, formatted with `formatter`. Rows whose arity does not match
/// the titles are skipped and listed in [`TableStructure::rejected_rows`].
///
/// # Errors
/// Fails with a malformed dataset error if `group_spec` does not cover the
/// titles exactly.
pub fn build(
    dataset: &ReportDataset,
    formatter: &ColumnFormatter,
    group_spec: Option<&ColumnGroupSpec>,
    filter_column: Option<usize>,
    state: &FilterState,
) -> Result<TableStructure, DashboardError> {
    let columns = dataset.column_count();

    let group_header = match group_spec {
        Some(spec) => {
            spec.validate(columns)?;
            Some(spec.groups().to_vec())
        }
        None => None,
    };

    let mut rejected_rows = Vec::new();

    let overall = match &dataset.overall {
        Some(row) if row.is_empty() => None,
        Some(row) => match check_arity(row, RowPosition::Overall, columns) {
            Ok(()) => Some(format_row(row, 0, formatter)),
            Err(rejected) => {
                log::warn!("Skipping {}", DashboardError::from(rejected));
                rejected_rows.push(rejected);
                None
            }
        },
        None => None,
    };

    let mut rows = Vec::new();
    for (index, item) in dataset.items.iter().enumerate() {
        if item.is_empty() {
            continue;
        }
        if let Err(rejected) = check_arity(item, RowPosition::Item(index), columns) {
            log::warn!("Skipping {}", DashboardError::from(rejected));
            rejected_rows.push(rejected);
            continue;
        }
        if filter::passes(
            item,
            filter_column,
            dataset.supports_controllers_discrimination,
            state,
        ) {
            rows.push(format_row(item, index, formatter));
        }
    }

    log::debug!(
        "Built table with {} of {} items ({} rejected)",
        rows.len(),
        dataset.items.len(),
        rejected_rows.len()
    );

    Ok(TableStructure {
        group_header,
        titles: dataset.titles.clone(),
        overall,
        rows,
        rejected_rows,
    })
}
