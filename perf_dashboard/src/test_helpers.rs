//! Sample dashboard data for unit tests, integration tests and benchmarks.

use crate::data::{CellValue, DashboardInput, DataRow, PassFailRatio, ReportDataset};
use crate::defaults::SUMMARY_TITLES;

/// One statistics row: label followed by the 13 numeric columns.
pub fn summary_row(label: &str, values: [f64; 13]) -> DataRow {
    let mut data: Vec<CellValue> = vec![label.into()];
    data.extend(values.into_iter().map(CellValue::from));
    DataRow::sample(data)
}

/// Statistics table with an aggregate row and three labels, not in label order.
pub fn summary_dataset() -> ReportDataset {
    ReportDataset::new(SUMMARY_TITLES.iter().copied())
        .with_overall(summary_row(
            "Total",
            [
                494.0,
                0.0,
                0.0,
                912.7955465587045,
                5.0,
                7616.0,
                195.0,
                6893.5,
                7223.0,
                7575.1,
                0.8245412863177889,
                47.242436080316,
                1.0402267316410208,
            ],
        ))
        .with_items(vec![
            summary_row(
                "008_POST_web/emazad/Account/Login",
                [
                    12.0,
                    1.0,
                    8.333333333333334,
                    411.3333333333333,
                    397.0,
                    434.0,
                    410.0,
                    431.90000000000003,
                    434.0,
                    434.0,
                    0.022378540471590443,
                    0.025416252508261412,
                    0.015275976357071994,
                ],
            ),
            summary_row(
                "007_GET_captcha",
                [
                    13.0,
                    0.0,
                    0.0,
                    104.23076923076923,
                    50.0,
                    445.0,
                    65.0,
                    327.39999999999986,
                    445.0,
                    445.0,
                    0.022268510270922123,
                    0.29888181566298494,
                    0.00948151413879106,
                ],
            ),
            summary_row(
                "001_GET_",
                [
                    469.0,
                    0.0,
                    0.0,
                    178.61538461538458,
                    149.0,
                    320.0,
                    165.0,
                    268.4,
                    320.0,
                    320.0,
                    0.022233395928894176,
                    21.43683675267998,
                    0.09062714317109795,
                ],
            ),
        ])
        .with_controllers_discrimination(true)
}

/// Error breakdown with two error types.
pub fn errors_dataset() -> ReportDataset {
    ReportDataset::empty_errors().with_items(vec![
        DataRow::sample(vec![
            "500/Internal Server Error".into(),
            3.0.into(),
            30.0.into(),
            0.6072874493927125.into(),
        ]),
        DataRow::sample(vec![
            "Non HTTP response code: java.net.SocketTimeoutException".into(),
            7.0.into(),
            70.0.into(),
            1.417004048582996.into(),
        ]),
    ])
}

/// Top-5 errors row for `sampler` with a single error type; unused slots are empty.
pub fn top_errors_row(sampler: &str, samples: f64, errors: f64, error: &str) -> DataRow {
    let mut data: Vec<CellValue> = vec![sampler.into(), samples.into(), errors.into()];
    data.push(error.into());
    data.push(errors.into());
    data.extend(std::iter::repeat(CellValue::from("")).take(8));
    DataRow::sample(data)
}

/// Top-5 errors by sampler with two samplers and the suppressed rows JMeter pads with.
pub fn top_errors_dataset() -> ReportDataset {
    ReportDataset::empty_top_errors()
        .with_overall(top_errors_row("Total", 494.0, 10.0, "500/Internal Server Error"))
        .with_items(vec![
            top_errors_row(
                "008_POST_web/emazad/Account/Login",
                12.0,
                1.0,
                "500/Internal Server Error",
            ),
            DataRow::suppressed(),
            top_errors_row(
                "007_GET_captcha",
                13.0,
                9.0,
                "Non HTTP response code: java.net.SocketTimeoutException",
            ),
            DataRow::suppressed(),
        ])
}

/// Complete dashboard input with a 2% error rate.
pub fn sample_input() -> DashboardInput {
    DashboardInput {
        summary: summary_dataset(),
        errors: errors_dataset(),
        top_errors: top_errors_dataset(),
        ratio: PassFailRatio::from_error_percent(2.0),
    }
}

/// Statistics table with `rows` generated labels, for benchmarks.
pub fn large_summary_dataset(rows: usize) -> ReportDataset {
    let items = (0..rows)
        .map(|i| {
            let base = (i % 97) as f64;
            summary_row(
                &format!("{:04}_GET_endpoint/{}", rows - i, i % 13),
                [
                    12.0 + base,
                    (i % 3) as f64,
                    (i % 3) as f64 * 100.0 / (12.0 + base),
                    100.0 + base * 7.3,
                    10.0 + base,
                    900.0 + base,
                    95.5 + base,
                    500.25 + base,
                    700.125 + base,
                    880.0 + base,
                    0.0224 * (1.0 + base),
                    1.5 + base / 10.0,
                    0.75 + base / 20.0,
                ],
            )
        })
        .collect();

    ReportDataset::new(SUMMARY_TITLES.iter().copied())
        .with_items(items)
        .with_controllers_discrimination(true)
}
