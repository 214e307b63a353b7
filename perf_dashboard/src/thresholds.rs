use crate::defaults::{ERROR_RATE_COLUMN, RESPONSE_TIME_COLUMN};
use crate::table::TableStructure;

/// Outcome of comparing a cell against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Pass,
    Fail,
}

impl CellStatus {
    /// CSS class used by the report page.
    pub fn css_class(self) -> &'static str {
        match self {
            CellStatus::Pass => "green-text",
            CellStatus::Fail => "red-text",
        }
    }
}

/// Acceptance limits for the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    /// 90th percentile response time in milliseconds.
    pub response_time_ms: Option<f64>,
    /// Error percentage.
    pub error_rate_pct: Option<f64>,
}

impl Thresholds {
    pub fn is_empty(&self) -> bool {
        self.response_time_ms.is_none() && self.error_rate_pct.is_none()
    }

    /// Mark the `90th pct` and `Error %` cells of every body row. A value
    /// passes when it is strictly below its limit. Text cells and the
    /// aggregate row are left alone.
    pub fn highlight(&self, table: &mut TableStructure) {
        let limits = [
            (RESPONSE_TIME_COLUMN, self.response_time_ms),
            (ERROR_RATE_COLUMN, self.error_rate_pct),
        ];

        for (title, limit) in limits {
            let Some(limit) = limit else { continue };
            let Some(column) = table.titles.iter().position(|t| t == title) else {
                log::debug!("No '{}' column to compare against {}", title, limit);
                continue;
            };

            for row in &mut table.rows {
                if let Some(cell) = row.cells.get_mut(column) {
                    cell.status = cell.raw.as_f64().map(|value| {
                        if value < limit {
                            CellStatus::Pass
                        } else {
                            CellStatus::Fail
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataRow, ReportDataset};
    use crate::filter::FilterState;
    use crate::formatter::ColumnFormatter;
    use crate::table::build;

    fn dataset() -> ReportDataset {
        ReportDataset::new(["Label", "Error %", "90th pct"])
            .with_overall(DataRow::sample(vec!["Total".into(), 9.0.into(), 2000.0.into()]))
            .with_items(vec![
                DataRow::sample(vec!["fast".into(), 0.0.into(), 150.0.into()]),
                DataRow::sample(vec!["slow".into(), 12.5.into(), 1500.0.into()]),
                DataRow::sample(vec!["odd".into(), "".into(), 1000.0.into()]),
            ])
    }

    fn statuses(table: &TableStructure, column: usize) -> Vec<Option<CellStatus>> {
        table.rows.iter().map(|r| r.cells[column].status).collect()
    }

    #[test]
    fn test_highlight_body_rows() {
        let mut table = build(
            &dataset(),
            &ColumnFormatter::identity(),
            None,
            Some(0),
            &FilterState::default(),
        )
        .unwrap();

        Thresholds {
            response_time_ms: Some(1000.0),
            error_rate_pct: Some(5.0),
        }
        .highlight(&mut table);

        assert_eq!(
            statuses(&table, 2),
            vec![
                Some(CellStatus::Pass),
                Some(CellStatus::Fail),
                // equal to the limit fails
                Some(CellStatus::Fail)
            ]
        );
        assert_eq!(
            statuses(&table, 1),
            vec![Some(CellStatus::Pass), Some(CellStatus::Fail), None]
        );
        assert!(table
            .overall
            .as_ref()
            .unwrap()
            .cells
            .iter()
            .all(|c| c.status.is_none()));
        assert!(statuses(&table, 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_highlight_without_limits_is_noop() {
        let mut table = build(
            &dataset(),
            &ColumnFormatter::identity(),
            None,
            Some(0),
            &FilterState::default(),
        )
        .unwrap();
        let before = table.clone();

        let thresholds = Thresholds::default();
        assert!(thresholds.is_empty());
        thresholds.highlight(&mut table);
        assert_eq!(table, before);
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(CellStatus::Pass.css_class(), "green-text");
        assert_eq!(CellStatus::Fail.css_class(), "red-text");
    }
}
