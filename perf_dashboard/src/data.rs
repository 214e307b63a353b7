use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// A raw cell value as produced by the report generator.
///
/// Report datasets mix numbers and strings freely (labels, error messages and
/// the empty-string placeholders of sparse rows), so a cell is one or the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric value of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

/// Stringifies the cell the way the report page displays raw values:
/// integral numbers have no fractional part, non-finite numbers are spelled out
/// and magnitudes outside `[1e-6, 1e21)` use exponent notation (`1e+21`).
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_nan() => f.write_str("NaN"),
            CellValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // -0 prints as 0
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) if (1e-6..1e21).contains(&n.abs()) => write!(f, "{}", n),
            CellValue::Number(n) => {
                let exponent = format!("{:e}", n);
                match exponent.split_once('e') {
                    Some((mantissa, exp)) if !exp.starts_with('-') => {
                        write!(f, "{}e+{}", mantissa, exp)
                    }
                    _ => f.write_str(&exponent),
                }
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// One row of a report dataset. An empty `data` marks a suppressed row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRow {
    #[serde(default)]
    pub data: Vec<CellValue>,
    #[serde(default)]
    pub is_controller: bool,
}

impl DataRow {
    pub fn new(data: Vec<CellValue>, is_controller: bool) -> Self {
        DataRow {
            data,
            is_controller,
        }
    }

    pub fn sample(data: Vec<CellValue>) -> Self {
        DataRow::new(data, false)
    }

    pub fn controller(data: Vec<CellValue>) -> Self {
        DataRow::new(data, true)
    }

    /// A row that must never be rendered.
    pub fn suppressed() -> Self {
        DataRow::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy of the row without the cells at `removed` (sorted, ascending).
    fn without_columns(&self, removed: &[usize]) -> DataRow {
        DataRow {
            data: self
                .data
                .iter()
                .enumerate()
                .filter(|(i, _)| removed.binary_search(i).is_err())
                .map(|(_, v)| v.clone())
                .collect(),
            is_controller: self.is_controller,
        }
    }
}

/// Declarative table content: titles, optional aggregate row and per-label rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDataset {
    pub titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<DataRow>,
    #[serde(default)]
    pub items: Vec<DataRow>,
    #[serde(default)]
    pub supports_controllers_discrimination: bool,
}

impl ReportDataset {
    pub fn new<S: Into<String>>(titles: impl IntoIterator<Item = S>) -> Self {
        ReportDataset {
            titles: titles.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_overall(mut self, overall: DataRow) -> Self {
        self.overall = Some(overall);
        self
    }

    pub fn with_items(mut self, items: Vec<DataRow>) -> Self {
        self.items = items;
        self
    }

    pub fn with_controllers_discrimination(mut self, supported: bool) -> Self {
        self.supports_controllers_discrimination = supported;
        self
    }

    pub fn column_count(&self) -> usize {
        self.titles.len()
    }

    /// Empty error breakdown with the standard column titles.
    pub fn empty_errors() -> Self {
        ReportDataset::new(defaults::ERRORS_TITLES.iter().copied())
    }

    /// Empty top-5 errors by sampler table with the standard column titles.
    pub fn empty_top_errors() -> Self {
        ReportDataset::new(defaults::TOP_ERRORS_TITLES.iter().copied())
    }

    /// Copy of the dataset without the columns at `removed` (sorted, ascending).
    /// Suppressed rows stay suppressed.
    pub fn without_columns(&self, removed: &[usize]) -> ReportDataset {
        ReportDataset {
            titles: self
                .titles
                .iter()
                .enumerate()
                .filter(|(i, _)| removed.binary_search(i).is_err())
                .map(|(_, t)| t.clone())
                .collect(),
            overall: self.overall.as_ref().map(|o| o.without_columns(removed)),
            items: self
                .items
                .iter()
                .map(|item| item.without_columns(removed))
                .collect(),
            supports_controllers_discrimination: self.supports_controllers_discrimination,
        }
    }
}

/// Share of passed and failed samples, drives the requests summary chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassFailRatio {
    pub ok_percent: f64,
    pub ko_percent: f64,
}

impl Default for PassFailRatio {
    fn default() -> Self {
        PassFailRatio {
            ok_percent: 100.0,
            ko_percent: 0.0,
        }
    }
}

impl PassFailRatio {
    /// Ratio from an error percentage, clamped to `[0, 100]`.
    pub fn from_error_percent(error_pct: f64) -> Self {
        let ko_percent = if error_pct.is_finite() {
            error_pct.clamp(0.0, 100.0)
        } else {
            0.0
        };
        PassFailRatio {
            ok_percent: 100.0 - ko_percent,
            ko_percent,
        }
    }
}

/// Everything the dashboard renders, as written by the report generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInput {
    pub summary: ReportDataset,
    #[serde(default = "ReportDataset::empty_errors")]
    pub errors: ReportDataset,
    #[serde(default = "ReportDataset::empty_top_errors")]
    pub top_errors: ReportDataset,
    #[serde(flatten)]
    pub ratio: PassFailRatio,
}
