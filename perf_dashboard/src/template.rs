use std::{fs, path::Path};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;

use crate::defaults::DEFAULT_REPORT_TITLE;
use crate::filter::FilterState;
use crate::render::escape_html;

/// Metadata for rendering report templates
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub title: String,
    pub custom_css: String,
    pub timestamp: String,
    pub filter_summary: String,
}

impl ReportMetadata {
    pub fn new(title: Option<String>, custom_css: String, filter: &FilterState) -> ReportMetadata {
        ReportMetadata {
            title: title.unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string()),
            custom_css,
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            filter_summary: filter.describe(),
        }
    }
}

impl Default for ReportMetadata {
    fn default() -> Self {
        ReportMetadata {
            title: DEFAULT_REPORT_TITLE.to_string(),
            custom_css: String::new(),
            timestamp: String::new(),
            filter_summary: String::new(),
        }
    }
}

/// HTML fragments substituted into the page template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSections {
    pub plotly_head: String,
    pub requests_summary: String,
    pub statistics_table: String,
    pub errors_table: String,
    pub top_errors_table: String,
}

/// Default page: jQuery and tablesorter from CDN, pass/fail cell colors.
pub const DEFAULT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{TITLE}}</title>
    <script src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/jquery.tablesorter/2.31.3/js/jquery.tablesorter.combined.min.js"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/jquery.tablesorter/2.31.3/css/theme.blue.min.css">
    <script>
        $(function() {
            $.extend($.tablesorter.defaults, {
                theme: 'blue',
                cssInfoBlock: "tablesorter-no-sort",
                widthFixed: true,
                widgets: ['zebra']
            });
        });
    </script>
    {{PLOTLY_HEAD}}
    <style>
        .green-text { color: green; }
        .red-text { color: red; }
        @media print {
            .green-text { color: green !important; }
            .red-text { color: red !important; }
        }
    </style>
    <style>{{CUSTOM_CSS}}</style>
</head>
<body>
    <h1>{{TITLE}}</h1>
    <p>Generated: {{TIMESTAMP}} &middot; Showing {{FILTER_SUMMARY}}</p>
    <h2>Requests Summary</h2>
    {{REQUESTS_SUMMARY}}
    <h2>Statistics</h2>
    {{STATISTICS_TABLE}}
    <h2>Errors</h2>
    {{ERRORS_TABLE}}
    <h2>Top 5 Errors by sampler</h2>
    {{TOP_ERRORS_TABLE}}
</body>
</html>"#;

/// Apply template with placeholder substitution
pub fn apply_template(
    template: &str,
    sections: &RenderedSections,
    metadata: &ReportMetadata,
) -> Vec<u8> {
    let output = template
        .replace("{{TITLE}}", &escape_html(&metadata.title))
        .replace("{{PLOTLY_HEAD}}", &sections.plotly_head)
        .replace("{{CUSTOM_CSS}}", &metadata.custom_css)
        .replace("{{TIMESTAMP}}", &metadata.timestamp)
        .replace("{{FILTER_SUMMARY}}", &escape_html(&metadata.filter_summary))
        .replace("{{REQUESTS_SUMMARY}}", &sections.requests_summary)
        .replace("{{STATISTICS_TABLE}}", &sections.statistics_table)
        .replace("{{ERRORS_TABLE}}", &sections.errors_table)
        .replace("{{TOP_ERRORS_TABLE}}", &sections.top_errors_table);

    output.into_bytes()
}

/// Load template from file, `None` when no template is configured
pub fn load_template(template_path: Option<&Path>) -> Result<Option<String>> {
    let Some(template_path) = template_path else {
        return Ok(None);
    };

    if !template_path.exists() {
        bail!("Template file not found: {}", template_path.display());
    }

    let template_content = fs::read_to_string(template_path).map_err(|e| {
        anyhow!(
            "Failed to read template file {}: {}",
            template_path.display(),
            e
        )
    })?;

    Ok(Some(template_content))
}

/// Load custom CSS content from file
pub fn load_custom_css(custom_css_path: Option<&Path>) -> Result<String> {
    let Some(css_path) = custom_css_path else {
        return Ok(String::new());
    };

    if !css_path.exists() {
        bail!("Custom CSS file not found: {}", css_path.display());
    }

    fs::read_to_string(css_path).map_err(|e| {
        anyhow!(
            "Failed to read custom CSS file {}: {}",
            css_path.display(),
            e
        )
    })
}
