use std::fmt;

/// Where a rejected row sits in its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPosition {
    Overall,
    Item(usize),
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPosition::Overall => f.write_str("aggregate row"),
            RowPosition::Item(index) => write!(f, "item {}", index),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Malformed dataset: {position} has {actual} cells but the table has {expected} columns")]
    RowArity {
        position: RowPosition,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed dataset: column groups span {total} columns but the table has {columns}")]
    GroupSpanMismatch { total: usize, columns: usize },

    #[error("Malformed dataset: column group '{label}' must span at least one column")]
    ZeroSpan { label: String },

    #[error("Invalid series filter '{pattern}'")]
    InvalidFilterExpression {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Column {column} is not sortable")]
    UnsortableColumn { column: usize },
}

impl DashboardError {
    /// Whether the error describes data that does not fit its table.
    pub fn is_malformed_dataset(&self) -> bool {
        matches!(
            self,
            DashboardError::RowArity { .. }
                | DashboardError::GroupSpanMismatch { .. }
                | DashboardError::ZeroSpan { .. }
        )
    }
}
