use std::collections::BTreeMap;
use std::fmt;

use crate::columns::{hidden_column_indices, remap_index};
use crate::data::{DashboardInput, PassFailRatio, ReportDataset};
use crate::defaults::TOP_ERRORS_MESSAGE_COLUMNS;
use crate::errors::DashboardError;
use crate::filter::{FilterState, FilterUpdate};
use crate::formatter::ColumnFormatter;
use crate::render::Projector;
use crate::sorting::{remap_sort_keys, SortKey, SortableTable};
use crate::table::{self, ColumnGroupSpec};
use crate::thresholds::Thresholds;

/// The report tables of a dashboard, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Summary,
    Errors,
    TopErrors,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Summary, TableKind::Errors, TableKind::TopErrors];

    /// Id of the table element in the report page.
    pub fn element_id(self) -> &'static str {
        match self {
            TableKind::Summary => "statisticsTable",
            TableKind::Errors => "errorsTable",
            TableKind::TopErrors => "top5ErrorsBySamplerTable",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            TableKind::Summary => "Statistics",
            TableKind::Errors => "Errors",
            TableKind::TopErrors => "Top 5 Errors by sampler",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// A dataset together with everything needed to build and sort its table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    kind: TableKind,
    dataset: ReportDataset,
    formatter: ColumnFormatter,
    group_spec: Option<ColumnGroupSpec>,
    filter_column: Option<usize>,
    default_sort: Vec<SortKey>,
    unsortable: Vec<usize>,
    thresholds: Thresholds,
}

impl ReportTable {
    pub fn new(kind: TableKind, dataset: ReportDataset, formatter: ColumnFormatter) -> Self {
        ReportTable {
            kind,
            dataset,
            formatter,
            group_spec: None,
            filter_column: None,
            default_sort: Vec::new(),
            unsortable: Vec::new(),
            thresholds: Thresholds::default(),
        }
    }

    /// Statistics table: grouped header, filtered on the label column,
    /// sorted by label.
    pub fn summary(dataset: ReportDataset) -> Self {
        ReportTable::new(TableKind::Summary, dataset, ColumnFormatter::summary())
            .with_group_spec(ColumnGroupSpec::summary())
            .with_filter_column(0)
            .with_default_sort(vec![SortKey::ascending(0)])
    }

    /// Error breakdown: never filtered, most frequent error first.
    pub fn errors(dataset: ReportDataset) -> Self {
        ReportTable::new(TableKind::Errors, dataset, ColumnFormatter::errors())
            .with_default_sort(vec![SortKey::descending(1)])
    }

    /// Top-5 errors by sampler: filtered on the sampler column, sorted by it.
    /// The per-rank error message columns are not sortable.
    pub fn top_errors(dataset: ReportDataset) -> Self {
        ReportTable::new(TableKind::TopErrors, dataset, ColumnFormatter::top_errors())
            .with_filter_column(0)
            .with_default_sort(vec![SortKey::ascending(0)])
            .with_unsortable_columns(TOP_ERRORS_MESSAGE_COLUMNS.to_vec())
    }

    pub fn with_group_spec(mut self, group_spec: ColumnGroupSpec) -> Self {
        self.group_spec = Some(group_spec);
        self
    }

    pub fn with_filter_column(mut self, column: usize) -> Self {
        self.filter_column = Some(column);
        self
    }

    pub fn with_default_sort(mut self, keys: Vec<SortKey>) -> Self {
        self.default_sort = keys;
        self
    }

    pub fn with_unsortable_columns(mut self, columns: Vec<usize>) -> Self {
        self.unsortable = columns;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Remove the columns titled in `titles`. Formatting rules, group spans,
    /// the filter column and sort keys follow the remaining columns.
    pub fn hide_columns(self, titles: &[String]) -> Self {
        let removed = hidden_column_indices(&self.dataset.titles, titles);
        if removed.is_empty() {
            return self;
        }
        log::debug!("Hiding columns {:?} of the {} table", removed, self.kind);

        ReportTable {
            kind: self.kind,
            dataset: self.dataset.without_columns(&removed),
            formatter: self.formatter.without_columns(&removed),
            group_spec: self.group_spec.map(|spec| spec.without_columns(&removed)),
            filter_column: self
                .filter_column
                .and_then(|column| remap_index(column, &removed)),
            default_sort: remap_sort_keys(&self.default_sort, &removed),
            unsortable: self
                .unsortable
                .iter()
                .filter_map(|column| remap_index(*column, &removed))
                .collect(),
            thresholds: self.thresholds,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn dataset(&self) -> &ReportDataset {
        &self.dataset
    }

    pub fn filter_column(&self) -> Option<usize> {
        self.filter_column
    }

    pub fn default_sort(&self) -> &[SortKey] {
        &self.default_sort
    }

    /// Whether a filter change can alter the rendered rows.
    pub fn is_filterable(&self, state: &FilterState) -> bool {
        self.dataset.supports_controllers_discrimination
            || (self.filter_column.is_some() && !state.filters_only_sample_series())
    }

    /// Build, highlight and apply the default sort.
    pub fn build(&self, state: &FilterState) -> Result<SortableTable, DashboardError> {
        let mut structure = table::build(
            &self.dataset,
            &self.formatter,
            self.group_spec.as_ref(),
            self.filter_column,
            state,
        )?;
        self.thresholds.highlight(&mut structure);
        SortableTable::new(
            structure,
            &self.default_sort,
            self.unsortable.iter().copied(),
        )
    }
}

/// Settings applied when a dashboard is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardOptions {
    pub filter: FilterState,
    pub thresholds: Thresholds,
    /// Statistics table columns to hide, by title.
    pub hidden_columns: Vec<String>,
}

/// Owns the filter state and the rendered tables of one dashboard.
///
/// [`DashboardController::apply_filter`] is the only way to change the
/// state; it rebuilds every table whose rows depend on it. A table that fails
/// to build keeps its error and does not affect the others.
#[derive(Debug)]
pub struct DashboardController {
    state: FilterState,
    tables: Vec<ReportTable>,
    rendered: BTreeMap<TableKind, Result<SortableTable, DashboardError>>,
    ratio: PassFailRatio,
}

impl DashboardController {
    pub fn new(input: DashboardInput, options: DashboardOptions) -> Self {
        let tables = vec![
            ReportTable::summary(input.summary)
                .with_thresholds(options.thresholds)
                .hide_columns(&options.hidden_columns),
            ReportTable::errors(input.errors),
            ReportTable::top_errors(input.top_errors),
        ];
        DashboardController::from_tables(tables, input.ratio, options.filter)
    }

    pub fn from_tables(tables: Vec<ReportTable>, ratio: PassFailRatio, state: FilterState) -> Self {
        let mut controller = DashboardController {
            state,
            tables,
            rendered: BTreeMap::new(),
            ratio,
        };
        controller.rebuild_all();
        controller
    }

    /// Build every table regardless of the filter state.
    pub fn rebuild_all(&mut self) {
        for table in &self.tables {
            let result = table.build(&self.state);
            if let Err(e) = &result {
                log::warn!("Failed to build the {} table: {}", table.kind(), e);
            }
            self.rendered.insert(table.kind(), result);
        }
    }

    /// Change the filter state and rebuild every table that is filterable
    /// under the previous or the new state.
    ///
    /// Returns the tables that were rebuilt, in page order.
    ///
    /// # Errors
    /// An invalid series filter is rejected; the previous state and every
    /// rendered table are kept.
    pub fn apply_filter(&mut self, update: FilterUpdate) -> Result<Vec<TableKind>, DashboardError> {
        let next = self.state.apply(&update)?;
        let previous = std::mem::replace(&mut self.state, next);
        log::info!("Filter changed to {}", self.state.describe());

        let mut rebuilt = Vec::new();
        for table in self
            .tables
            .iter()
            .filter(|t| t.is_filterable(&previous) || t.is_filterable(&self.state))
        {
            let result = table.build(&self.state);
            if let Err(e) = &result {
                log::warn!("Failed to build the {} table: {}", table.kind(), e);
            }
            self.rendered.insert(table.kind(), result);
            rebuilt.push(table.kind());
        }
        Ok(rebuilt)
    }

    /// Re-sort a rendered table. Tables that failed to build are left alone.
    pub fn sort_table(&mut self, kind: TableKind, keys: &[SortKey]) -> Result<(), DashboardError> {
        match self.rendered.get_mut(&kind) {
            Some(Ok(table)) => table.sort_by(keys),
            _ => {
                log::warn!("No rendered {} table to sort", kind);
                Ok(())
            }
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn ratio(&self) -> &PassFailRatio {
        &self.ratio
    }

    pub fn table(&self, kind: TableKind) -> Option<&Result<SortableTable, DashboardError>> {
        self.rendered.get(&kind)
    }

    /// Hand the chart data and every rendered table to `projector`.
    pub fn project(&self, projector: &mut dyn Projector) {
        projector.add_requests_summary(&self.ratio);
        for (kind, table) in &self.rendered {
            projector.add_table(*kind, table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataRow;
    use crate::sorting::SortDirection;
    use crate::test_helpers::{sample_input, summary_dataset};

    fn labels(controller: &DashboardController, kind: TableKind) -> Vec<String> {
        controller
            .table(kind)
            .unwrap()
            .as_ref()
            .unwrap()
            .table()
            .rows
            .iter()
            .map(|r| r.cells[0].text.clone())
            .collect()
    }

    #[test]
    fn test_initial_render_builds_every_table() {
        let controller = DashboardController::new(sample_input(), DashboardOptions::default());
        for kind in TableKind::ALL {
            assert!(controller.table(kind).unwrap().is_ok(), "{} failed", kind);
        }
        assert_eq!(
            labels(&controller, TableKind::Summary),
            vec!["001_GET_", "007_GET_captcha", "008_POST_web/emazad/Account/Login"]
        );
        assert_eq!(controller.ratio(), &PassFailRatio::from_error_percent(2.0));
    }

    #[test]
    fn test_apply_filter_rebuilds_filterable_tables() {
        let mut controller = DashboardController::new(sample_input(), DashboardOptions::default());

        let rebuilt = controller
            .apply_filter(FilterUpdate::series_filter("login"))
            .unwrap();
        assert_eq!(rebuilt, vec![TableKind::Summary]);
        assert_eq!(
            labels(&controller, TableKind::Summary),
            vec!["008_POST_web/emazad/Account/Login"]
        );
        // Top errors do not distinguish controllers, so the bypass keeps every row
        assert_eq!(labels(&controller, TableKind::TopErrors).len(), 2);

        let rebuilt = controller
            .apply_filter(FilterUpdate {
                filters_only_sample_series: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rebuilt, vec![TableKind::Summary, TableKind::TopErrors]);
        assert_eq!(
            labels(&controller, TableKind::TopErrors),
            vec!["008_POST_web/emazad/Account/Login"]
        );
        // Errors table has no series column
        assert_eq!(labels(&controller, TableKind::Errors).len(), 2);
    }

    #[test]
    fn test_restoring_sample_only_filtering_rebuilds_previous_tables() {
        let mut controller = DashboardController::new(sample_input(), DashboardOptions::default());
        controller
            .apply_filter(FilterUpdate {
                series_filter: Some("login".to_string()),
                filters_only_sample_series: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(labels(&controller, TableKind::TopErrors).len(), 1);

        let rebuilt = controller
            .apply_filter(FilterUpdate {
                filters_only_sample_series: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rebuilt, vec![TableKind::Summary, TableKind::TopErrors]);

        let fresh = ReportTable::top_errors(sample_input().top_errors)
            .build(controller.state())
            .unwrap();
        assert_eq!(labels(&controller, TableKind::TopErrors).len(), 2);
        assert_eq!(controller.table(TableKind::TopErrors).unwrap().as_ref().unwrap(), &fresh);
    }

    #[test]
    fn test_invalid_filter_keeps_state_and_tables() {
        let mut controller = DashboardController::new(sample_input(), DashboardOptions::default());
        controller
            .apply_filter(FilterUpdate::series_filter("GET"))
            .unwrap();
        let before = labels(&controller, TableKind::Summary);

        let err = controller
            .apply_filter(FilterUpdate::series_filter("(unclosed"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFilterExpression { .. }));
        assert_eq!(controller.state().series_filter(), "GET");
        assert_eq!(labels(&controller, TableKind::Summary), before);
    }

    #[test]
    fn test_controllers_only_toggle() {
        let mut input = sample_input();
        input.summary.items[1].is_controller = true;
        let mut controller = DashboardController::new(input, DashboardOptions::default());

        controller
            .apply_filter(FilterUpdate::controllers_only(true))
            .unwrap();
        assert_eq!(labels(&controller, TableKind::Summary), vec!["007_GET_captcha"]);

        controller
            .apply_filter(FilterUpdate::controllers_only(false))
            .unwrap();
        assert_eq!(labels(&controller, TableKind::Summary).len(), 3);
    }

    #[test]
    fn test_failed_table_does_not_abort_others() {
        let mut input = sample_input();
        input.summary.titles.pop();
        let controller = DashboardController::new(input, DashboardOptions::default());

        let summary = controller.table(TableKind::Summary).unwrap();
        assert!(summary.as_ref().unwrap_err().is_malformed_dataset());
        assert!(controller.table(TableKind::Errors).unwrap().is_ok());
        assert!(controller.table(TableKind::TopErrors).unwrap().is_ok());
    }

    #[test]
    fn test_errors_table_default_sort() {
        let controller = DashboardController::new(sample_input(), DashboardOptions::default());
        let errors = controller.table(TableKind::Errors).unwrap().as_ref().unwrap();
        assert_eq!(errors.sort_list()[0].direction, SortDirection::Descending);
        let counts: Vec<_> = errors
            .table()
            .rows
            .iter()
            .map(|r| r.cells[1].text.clone())
            .collect();
        assert_eq!(counts, vec!["7", "3"]);
    }

    #[test]
    fn test_hidden_columns_and_thresholds() {
        let options = DashboardOptions {
            thresholds: Thresholds {
                response_time_ms: Some(500.0),
                error_rate_pct: None,
            },
            hidden_columns: vec!["95th pct".to_string(), "99th pct".to_string()],
            ..Default::default()
        };
        let controller = DashboardController::new(sample_input(), options);
        let summary = controller.table(TableKind::Summary).unwrap().as_ref().unwrap();
        let table = summary.table();

        assert_eq!(table.column_count(), 12);
        let spans: usize = table.group_header.as_ref().unwrap().iter().map(|g| g.span).sum();
        assert_eq!(spans, 12);
        assert!(!table.titles.contains(&"95th pct".to_string()));
        // Throughput keeps its fixed-point format after the shift
        assert_eq!(table.overall.as_ref().unwrap().cells[9].text, "0.82");

        let pct = table.titles.iter().position(|t| t == "90th pct").unwrap();
        assert!(table.rows.iter().all(|r| r.cells[pct].status.is_some()));
    }

    #[test]
    fn test_top_errors_message_columns_not_sortable() {
        let mut controller = DashboardController::new(sample_input(), DashboardOptions::default());
        let top_errors = controller.table(TableKind::TopErrors).unwrap().as_ref().unwrap();
        assert_eq!(
            top_errors.sortable_columns(),
            vec![0, 1, 2, 4, 6, 8, 10, 12]
        );

        let err = controller
            .sort_table(TableKind::TopErrors, &[SortKey::ascending(3)])
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnsortableColumn { column: 3 }));
        controller
            .sort_table(TableKind::TopErrors, &[SortKey::descending(2)])
            .unwrap();
        assert_eq!(labels(&controller, TableKind::TopErrors)[0], "007_GET_captcha");
    }

    #[test]
    fn test_sort_table() {
        let mut controller = DashboardController::new(sample_input(), DashboardOptions::default());
        controller
            .sort_table(TableKind::Summary, &[SortKey::descending(1)])
            .unwrap();
        assert_eq!(labels(&controller, TableKind::Summary)[0], "001_GET_");

        assert!(controller
            .sort_table(TableKind::Summary, &[SortKey::ascending(99)])
            .is_err());
    }

    #[test]
    fn test_is_filterable() {
        let state = FilterState::default();
        let discriminating = ReportTable::summary(summary_dataset());
        assert!(discriminating.is_filterable(&state));

        let plain = ReportTable::top_errors(ReportDataset::empty_top_errors());
        assert!(!plain.is_filterable(&state));
        assert!(plain.is_filterable(&state.clone().with_filters_only_sample_series(false)));

        let unfiltered = ReportTable::errors(ReportDataset::empty_errors());
        assert!(!unfiltered.is_filterable(&FilterState::default().with_filters_only_sample_series(false)));
    }

    #[test]
    fn test_hide_columns_remaps_filter_and_sort() {
        let dataset = ReportDataset::new(["Id", "Label", "Count"]).with_items(vec![
            DataRow::sample(vec![1.0.into(), "b".into(), 2.0.into()]),
            DataRow::sample(vec![2.0.into(), "a".into(), 1.0.into()]),
        ]);
        let table = ReportTable::new(TableKind::Summary, dataset, ColumnFormatter::identity())
            .with_filter_column(1)
            .with_default_sort(vec![SortKey::ascending(0), SortKey::descending(2)])
            .hide_columns(&["Id".to_string()]);

        assert_eq!(table.filter_column(), Some(0));
        assert_eq!(table.default_sort(), &[SortKey::descending(1)]);
        assert_eq!(table.dataset().titles, vec!["Label", "Count"]);
    }
}
