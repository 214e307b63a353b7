use plotly::{common::Marker, layout::Legend, Layout, Pie, Plot};

use crate::data::PassFailRatio;
use crate::defaults::{FAIL_COLOR, PASS_COLOR};

/// Element id of the requests summary chart.
pub const REQUESTS_SUMMARY_ID: &str = "requestsSummary";

/// Decimal shift through the exponent notation, so `1.005` shifted by 2 is
/// exactly `100.5`.
fn shift(value: f64, exponent: i32) -> f64 {
    format!("{}e{}", value, exponent)
        .parse()
        .unwrap_or(value * 10f64.powi(exponent))
}

/// Round `value` to `10^exponent`, halves rounding up (towards +infinity).
pub fn round10(value: f64, exponent: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    shift((shift(value, -exponent) + 0.5).floor(), exponent)
}

/// Pie chart of failed vs passed samples. Slice values are percentages
/// rounded to two decimals.
pub fn requests_summary(ratio: &PassFailRatio) -> Plot {
    let values = vec![round10(ratio.ko_percent, -2), round10(ratio.ok_percent, -2)];
    let trace = Pie::new(values)
        .labels(vec!["FAIL", "PASS"])
        .sort(false)
        .marker(Marker::new().color_array(vec![FAIL_COLOR.to_string(), PASS_COLOR.to_string()]));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().legend(Legend::new()).show_legend(true));
    plot
}

/// Script tags loading plotly.js, and the inline chart (div + script).
pub fn extract_plotly_parts(plot: &Plot) -> (String, String) {
    let plotly_head = Plot::online_cdn_js();
    let plotly_body = plot.to_inline_html(Some(REQUESTS_SUMMARY_ID));
    (plotly_head, plotly_body)
}
