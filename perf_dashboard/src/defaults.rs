//! Centralized default values for perf-dashboard.
//!
//! Column titles, table identifiers and fallback settings used when neither
//! the command line nor the configuration provides a value.

// ============================================================================
// Report Layout Defaults
// ============================================================================

/// Column titles of the statistics (summary) table as written by the report generator.
pub const SUMMARY_TITLES: [&str; 14] = [
    "Label",
    "#Samples",
    "FAIL",
    "Error %",
    "Average",
    "Min",
    "Max",
    "Median",
    "90th pct",
    "95th pct",
    "99th pct",
    "Transactions/s",
    "Received",
    "Sent",
];

/// Column groups rendered above the statistics table titles.
pub const SUMMARY_GROUPS: [(&str, usize); 5] = [
    ("Requests", 1),
    ("Executions", 3),
    ("Response Times (ms)", 7),
    ("Throughput", 1),
    ("Network (KB/sec)", 2),
];

/// Column titles of the error breakdown table.
pub const ERRORS_TITLES: [&str; 4] = [
    "Type of error",
    "Number of errors",
    "% in errors",
    "% in all samples",
];

/// Column titles of the top-5 errors by sampler table.
pub const TOP_ERRORS_TITLES: [&str; 13] = [
    "Sample", "#Samples", "#Errors", "Error", "#Errors", "Error", "#Errors", "Error", "#Errors",
    "Error", "#Errors", "Error", "#Errors",
];

/// Error message columns of the top-5 errors table, one per rank.
pub const TOP_ERRORS_MESSAGE_COLUMNS: [usize; 5] = [3, 5, 7, 9, 11];

/// Title of the statistics column compared against the response time threshold.
pub const RESPONSE_TIME_COLUMN: &str = "90th pct";

/// Title of the statistics column compared against the error rate threshold.
pub const ERROR_RATE_COLUMN: &str = "Error %";

/// Label of the aggregate entry in JMeter's statistics.json.
pub const TOTAL_LABEL: &str = "Total";

// ============================================================================
// Filter Defaults
// ============================================================================

/// Whether the series filter only applies to tables that distinguish
/// controllers from samples.
pub const DEFAULT_FILTERS_ONLY_SAMPLE_SERIES: bool = true;

// ============================================================================
// Reporting Defaults
// ============================================================================

/// Title used when neither the CLI nor the config provides one.
pub const DEFAULT_REPORT_TITLE: &str = "Performance Test Report";

/// Name of the repository-local configuration file.
pub const LOCAL_CONFIG_FILE_NAME: &str = ".perfdashboardconfig";

/// Directory below the user config directory holding `config.toml`.
pub const SYSTEM_CONFIG_DIR_NAME: &str = "perf-dashboard";

// ============================================================================
// Chart Defaults
// ============================================================================

/// Slice color for failed requests.
pub const FAIL_COLOR: &str = "#FF6347";

/// Slice color for passed requests.
pub const PASS_COLOR: &str = "#9ACD32";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups_cover_all_titles() {
        let total: usize = SUMMARY_GROUPS.iter().map(|(_, span)| span).sum();
        assert_eq!(total, SUMMARY_TITLES.len());
    }

    #[test]
    fn test_threshold_columns_exist() {
        assert!(SUMMARY_TITLES.contains(&RESPONSE_TIME_COLUMN));
        assert!(SUMMARY_TITLES.contains(&ERROR_RATE_COLUMN));
    }
}
