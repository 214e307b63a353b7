use regex::{Regex, RegexBuilder};

use crate::data::DataRow;
use crate::defaults::DEFAULT_FILTERS_ONLY_SAMPLE_SERIES;
use crate::errors::DashboardError;

/// Compile a series filter into a case-insensitive regex.
/// Returns `None` for an empty pattern (no filtering).
pub fn compile_series_filter(pattern: &str) -> Result<Option<Regex>, DashboardError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|source| DashboardError::InvalidFilterExpression {
            pattern: pattern.to_string(),
            source,
        })
}

/// Filter settings shared by every table of a dashboard.
///
/// The series filter is compiled when it is set, so a state value always
/// holds a valid expression.
#[derive(Debug, Clone)]
pub struct FilterState {
    series_filter: String,
    regex: Option<Regex>,
    show_controllers_only: bool,
    filters_only_sample_series: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            series_filter: String::new(),
            regex: None,
            show_controllers_only: false,
            filters_only_sample_series: DEFAULT_FILTERS_ONLY_SAMPLE_SERIES,
        }
    }
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.series_filter == other.series_filter
            && self.show_controllers_only == other.show_controllers_only
            && self.filters_only_sample_series == other.filters_only_sample_series
    }
}

impl FilterState {
    pub fn new(
        series_filter: &str,
        show_controllers_only: bool,
        filters_only_sample_series: bool,
    ) -> Result<Self, DashboardError> {
        Ok(FilterState {
            series_filter: series_filter.to_string(),
            regex: compile_series_filter(series_filter)?,
            show_controllers_only,
            filters_only_sample_series,
        })
    }

    pub fn with_series_filter(self, pattern: &str) -> Result<Self, DashboardError> {
        Ok(FilterState {
            series_filter: pattern.to_string(),
            regex: compile_series_filter(pattern)?,
            ..self
        })
    }

    pub fn with_controllers_only(self, show_controllers_only: bool) -> Self {
        FilterState {
            show_controllers_only,
            ..self
        }
    }

    pub fn with_filters_only_sample_series(self, filters_only_sample_series: bool) -> Self {
        FilterState {
            filters_only_sample_series,
            ..self
        }
    }

    /// New state with the fields present in `update` replaced.
    /// On error `self` is left as it was.
    pub fn apply(&self, update: &FilterUpdate) -> Result<Self, DashboardError> {
        let mut next = self.clone();
        if let Some(pattern) = &update.series_filter {
            next = next.with_series_filter(pattern)?;
        }
        if let Some(controllers_only) = update.show_controllers_only {
            next = next.with_controllers_only(controllers_only);
        }
        if let Some(only_samples) = update.filters_only_sample_series {
            next = next.with_filters_only_sample_series(only_samples);
        }
        Ok(next)
    }

    pub fn series_filter(&self) -> &str {
        &self.series_filter
    }

    pub fn show_controllers_only(&self) -> bool {
        self.show_controllers_only
    }

    pub fn filters_only_sample_series(&self) -> bool {
        self.filters_only_sample_series
    }

    /// Human readable description, used in report headers.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.series_filter.is_empty() {
            parts.push(format!("series matching /{}/i", self.series_filter));
        }
        if self.show_controllers_only {
            parts.push("controllers only".to_string());
        }
        if parts.is_empty() {
            "all series".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A partial change of the filter state. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub series_filter: Option<String>,
    pub show_controllers_only: Option<bool>,
    pub filters_only_sample_series: Option<bool>,
}

impl FilterUpdate {
    pub fn series_filter(pattern: impl Into<String>) -> Self {
        FilterUpdate {
            series_filter: Some(pattern.into()),
            ..Default::default()
        }
    }

    pub fn controllers_only(show_controllers_only: bool) -> Self {
        FilterUpdate {
            show_controllers_only: Some(show_controllers_only),
            ..Default::default()
        }
    }
}

/// Check whether a row is rendered under `state`.
///
/// The series regex is tested against the cell at `filter_column` (a table
/// without a series column always passes that test). Datasets that do not
/// distinguish controllers from samples ignore the controller toggle and,
/// while `filters_only_sample_series` is set, the series regex too.
/// Suppressed rows (empty data) never pass.
pub fn passes(
    row: &DataRow,
    filter_column: Option<usize>,
    supports_controllers_discrimination: bool,
    state: &FilterState,
) -> bool {
    if row.is_empty() {
        return false;
    }

    let series_ok = match (&state.regex, filter_column) {
        (None, _) | (_, None) => true,
        _ if state.filters_only_sample_series && !supports_controllers_discrimination => true,
        (Some(regex), Some(column)) => row
            .data
            .get(column)
            .map(|value| regex.is_match(&value.to_string()))
            .unwrap_or(false),
    };

    let controller_ok = !state.show_controllers_only
        || !supports_controllers_discrimination
        || row.is_controller;

    series_ok && controller_ok
}
