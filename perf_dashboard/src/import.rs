//! Import JMeter's `statistics.json` into a dashboard input.
//!
//! The file maps every label (plus the `Total` aggregate) to its statistics.
//! Each entry becomes one row of the statistics table, in label order.

use std::collections::BTreeMap;
use std::io::{self, Read};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::{CellValue, DashboardInput, DataRow, PassFailRatio, ReportDataset};
use crate::defaults::{SUMMARY_TITLES, TOTAL_LABEL};

/// Statistics of one label as written by JMeter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionStatistics {
    pub transaction: String,
    pub sample_count: f64,
    pub error_count: f64,
    pub error_pct: f64,
    pub mean_res_time: f64,
    pub min_res_time: f64,
    pub max_res_time: f64,
    pub median_res_time: f64,
    pub pct1_res_time: f64,
    pub pct2_res_time: f64,
    pub pct3_res_time: f64,
    pub throughput: f64,
    #[serde(rename = "receivedKBytesPerSec")]
    pub received_kbytes_per_sec: f64,
    #[serde(rename = "sentKBytesPerSec")]
    pub sent_kbytes_per_sec: f64,
}

impl TransactionStatistics {
    /// Row in statistics table column order.
    fn to_row(&self, label: &str) -> DataRow {
        let label = if self.transaction.is_empty() {
            label
        } else {
            &self.transaction
        };
        let values: Vec<CellValue> = vec![
            label.into(),
            self.sample_count.into(),
            self.error_count.into(),
            self.error_pct.into(),
            self.mean_res_time.into(),
            self.min_res_time.into(),
            self.max_res_time.into(),
            self.median_res_time.into(),
            self.pct1_res_time.into(),
            self.pct2_res_time.into(),
            self.pct3_res_time.into(),
            self.throughput.into(),
            self.received_kbytes_per_sec.into(),
            self.sent_kbytes_per_sec.into(),
        ];
        DataRow::sample(values)
    }
}

/// Error share over all labels, for files without a `Total` entry.
fn error_percent(statistics: &BTreeMap<String, TransactionStatistics>) -> f64 {
    let (samples, errors) = statistics
        .values()
        .fold((0.0, 0.0), |(s, e), stat| (s + stat.sample_count, e + stat.error_count));
    if samples > 0.0 {
        errors * 100.0 / samples
    } else {
        0.0
    }
}

/// Build the dashboard input from the content of a `statistics.json`.
///
/// The error breakdown and top errors tables are left empty; the file does
/// not carry them.
pub fn parse_statistics(content: &str) -> Result<DashboardInput> {
    let mut statistics: BTreeMap<String, TransactionStatistics> =
        serde_json::from_str(content).context("Failed to parse JMeter statistics JSON")?;

    let total = statistics.remove(TOTAL_LABEL);
    let ratio = match &total {
        Some(total) => PassFailRatio::from_error_percent(total.error_pct),
        None => {
            log::warn!("No '{}' entry in statistics, computing the error rate", TOTAL_LABEL);
            PassFailRatio::from_error_percent(error_percent(&statistics))
        }
    };

    let items = statistics
        .iter()
        .map(|(label, stat)| stat.to_row(label))
        .collect::<Vec<_>>();
    log::info!("Imported statistics for {} labels", items.len());

    let mut summary = ReportDataset::new(SUMMARY_TITLES.iter().copied())
        .with_items(items)
        .with_controllers_discrimination(true);
    if let Some(total) = total {
        summary = summary.with_overall(total.to_row(TOTAL_LABEL));
    }

    Ok(DashboardInput {
        summary,
        errors: ReportDataset::empty_errors(),
        top_errors: ReportDataset::empty_top_errors(),
        ratio,
    })
}

/// Read input from stdin or file
pub fn read_input(file: &str) -> Result<String> {
    match file {
        "-" => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
        path => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_STATISTICS_JSON: &str = r#"{
        "Total": {"transaction": "Total", "sampleCount": 50, "errorCount": 1, "errorPct": 2.0,
                  "meanResTime": 912.79, "medianResTime": 195.0, "minResTime": 5.0, "maxResTime": 7616.0,
                  "pct1ResTime": 6893.5, "pct2ResTime": 7223.0, "pct3ResTime": 7575.1,
                  "throughput": 0.8245, "receivedKBytesPerSec": 47.24, "sentKBytesPerSec": 1.04},
        "008_POST_Login": {"transaction": "008_POST_Login", "sampleCount": 12, "errorCount": 1, "errorPct": 8.333,
                  "meanResTime": 411.3, "medianResTime": 410.0, "minResTime": 397.0, "maxResTime": 434.0,
                  "pct1ResTime": 431.9, "pct2ResTime": 434.0, "pct3ResTime": 434.0,
                  "throughput": 0.0223, "receivedKBytesPerSec": 0.025, "sentKBytesPerSec": 0.015},
        "001_GET_": {"transaction": "001_GET_", "sampleCount": 38, "errorCount": 0, "errorPct": 0.0,
                  "meanResTime": 178.6, "medianResTime": 165.0, "minResTime": 149.0, "maxResTime": 320.0,
                  "pct1ResTime": 268.4, "pct2ResTime": 320.0, "pct3ResTime": 320.0,
                  "throughput": 0.0222, "receivedKBytesPerSec": 21.43, "sentKBytesPerSec": 0.09}
    }"#;

    #[test]
    fn test_parse_statistics() {
        let input = parse_statistics(SAMPLE_STATISTICS_JSON).unwrap();

        let summary = &input.summary;
        assert_eq!(summary.titles.len(), 14);
        assert!(summary.supports_controllers_discrimination);

        let labels: Vec<_> = summary.items.iter().map(|i| i.data[0].to_string()).collect();
        assert_eq!(labels, vec!["001_GET_", "008_POST_Login"]);
        assert!(summary.items.iter().all(|i| i.data.len() == 14 && !i.is_controller));

        let overall = summary.overall.as_ref().unwrap();
        assert_eq!(overall.data[0], CellValue::from("Total"));
        assert_eq!(overall.data[1], CellValue::from(50.0));
        // Median column comes after Max
        assert_eq!(overall.data[7], CellValue::from(195.0));
        assert_eq!(overall.data[8], CellValue::from(6893.5));

        assert_eq!(input.ratio, PassFailRatio::from_error_percent(2.0));
        assert!(input.errors.items.is_empty());
        assert!(input.top_errors.items.is_empty());
    }

    #[test]
    fn test_parse_statistics_without_total() {
        let content = r#"{
            "a": {"transaction": "a", "sampleCount": 30, "errorCount": 3},
            "b": {"sampleCount": 10, "errorCount": 1}
        }"#;
        let input = parse_statistics(content).unwrap();
        assert!(input.summary.overall.is_none());
        assert_eq!(input.ratio.ko_percent, 10.0);
        // Missing transaction falls back to the key
        assert_eq!(input.summary.items[1].data[0], CellValue::from("b"));
    }

    #[test]
    fn test_parse_statistics_invalid_json() {
        let err = parse_statistics("not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse JMeter statistics JSON"));
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_STATISTICS_JSON).unwrap();
        let content = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(content, SAMPLE_STATISTICS_JSON);
    }

    #[test]
    fn test_read_input_nonexistent_file() {
        let err = read_input("/nonexistent/statistics.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
