use std::{borrow::Cow, collections::BTreeMap, path::Path};

use itertools::Itertools;
use plotly::Plot;
use unindent::unindent;

use crate::chart::{extract_plotly_parts, requests_summary};
use crate::dashboard::TableKind;
use crate::data::PassFailRatio;
use crate::errors::DashboardError;
use crate::sorting::{sort_list_literal, SortableTable};
use crate::table::{BodyRow, TableStructure};
use crate::template::{apply_template, RenderedSections, ReportMetadata, DEFAULT_HTML_TEMPLATE};

pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn render_body_row(row: &BodyRow) -> String {
    let cells = row
        .cells
        .iter()
        .map(|cell| match cell.status {
            Some(status) => format!(
                "<td class=\"{}\">{}</td>",
                status.css_class(),
                escape_html(&cell.text)
            ),
            None => format!("<td>{}</td>", escape_html(&cell.text)),
        })
        .join("");
    format!("<tr>{}</tr>", cells)
}

fn render_header(table: &TableStructure, sortable: &SortableTable) -> String {
    let mut header = String::from("<thead>");

    if let Some(groups) = &table.group_header {
        let cells = groups
            .iter()
            .map(|g| {
                format!(
                    "<th colspan=\"{}\" data-sorter=\"false\">{}</th>",
                    g.span,
                    escape_html(&g.label)
                )
            })
            .join("");
        header.push_str(&format!("<tr class=\"tablesorter-no-sort\">{}</tr>", cells));
    }

    let titles = table
        .titles
        .iter()
        .enumerate()
        .map(|(col, title)| {
            if sortable.is_sortable(col) {
                format!("<th>{}</th>", escape_html(title))
            } else {
                format!("<th data-sorter=\"false\">{}</th>", escape_html(title))
            }
        })
        .join("");
    header.push_str(&format!("<tr>{}</tr></thead>", titles));
    header
}

/// Script attaching tablesorter to the table with the current sort.
fn tablesorter_script(element_id: &str, sortable: &SortableTable) -> String {
    unindent(&format!(
        r##"
        <script>
            $(function() {{
                $("#{}").tablesorter({{sortList: {}}});
            }});
        </script>
        "##,
        element_id,
        sort_list_literal(sortable.sort_list())
    ))
}

/// HTML for a built table: header rows, the aggregate body (excluded from
/// sorting) and the regular body, followed by its tablesorter hook.
pub fn render_table_html(kind: TableKind, sortable: &SortableTable) -> String {
    let table = sortable.table();
    let mut html = format!(
        "<table id=\"{}\" class=\"table table-bordered table-condensed tablesorter\">",
        kind.element_id()
    );
    html.push_str(&render_header(table, sortable));

    if let Some(overall) = &table.overall {
        html.push_str("<tbody class=\"tablesorter-no-sort\">");
        html.push_str(&render_body_row(overall));
        html.push_str("</tbody>");
    }

    html.push_str("<tbody>");
    for row in &table.rows {
        html.push_str(&render_body_row(row));
    }
    html.push_str("</tbody></table>\n");
    html.push_str(&tablesorter_script(kind.element_id(), sortable));
    html
}

/// Placeholder shown instead of a table that could not be built.
pub fn render_table_error(kind: TableKind, error: &DashboardError) -> String {
    format!(
        "<div id=\"{}\" class=\"table-error red-text\">Could not render {}: {}</div>",
        kind.element_id(),
        kind.heading(),
        escape_html(&error.to_string())
    )
}

/// Output side of a dashboard. Projectors only read built tables; they
/// never filter or sort.
pub trait Projector {
    fn add_metadata(&mut self, metadata: ReportMetadata, template: Option<String>);
    fn add_requests_summary(&mut self, ratio: &PassFailRatio);
    fn add_table(&mut self, kind: TableKind, table: &Result<SortableTable, DashboardError>);
    fn as_bytes(&self) -> Vec<u8>;
}

pub struct HtmlProjector {
    template: Option<String>,
    metadata: Option<ReportMetadata>,
    chart: Option<Plot>,
    tables: BTreeMap<TableKind, String>,
}

impl HtmlProjector {
    pub fn new() -> HtmlProjector {
        HtmlProjector {
            template: None,
            metadata: None,
            chart: None,
            tables: BTreeMap::new(),
        }
    }
}

impl Default for HtmlProjector {
    fn default() -> Self {
        HtmlProjector::new()
    }
}

impl Projector for HtmlProjector {
    fn add_metadata(&mut self, metadata: ReportMetadata, template: Option<String>) {
        self.metadata = Some(metadata);
        self.template = template;
    }

    fn add_requests_summary(&mut self, ratio: &PassFailRatio) {
        self.chart = Some(requests_summary(ratio));
    }

    fn add_table(&mut self, kind: TableKind, table: &Result<SortableTable, DashboardError>) {
        let html = match table {
            Ok(sortable) => render_table_html(kind, sortable),
            Err(e) => render_table_error(kind, e),
        };
        self.tables.insert(kind, html);
    }

    fn as_bytes(&self) -> Vec<u8> {
        let (plotly_head, requests_summary) = match &self.chart {
            Some(plot) => extract_plotly_parts(plot),
            None => (Plot::online_cdn_js(), String::new()),
        };
        let table = |kind: TableKind| self.tables.get(&kind).cloned().unwrap_or_default();

        let sections = RenderedSections {
            plotly_head,
            requests_summary,
            statistics_table: table(TableKind::Summary),
            errors_table: table(TableKind::Errors),
            top_errors_table: table(TableKind::TopErrors),
        };

        let template = self.template.as_deref().unwrap_or(DEFAULT_HTML_TEMPLATE);
        let default_metadata = ReportMetadata::default();
        let metadata = self.metadata.as_ref().unwrap_or(&default_metadata);

        apply_template(template, &sections, metadata)
    }
}

/// Cell text made safe for a tab separated line.
fn tsv_field(text: &str) -> Cow<'_, str> {
    if text.contains(['\t', '\n', '\r']) {
        Cow::Owned(text.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(text)
    }
}

fn tsv_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(tsv_field).join("\t")
}

/// Tab separated dump of every table: a `# <heading>` line, the titles, the
/// aggregate row and the body rows in their current order.
pub struct TsvProjector {
    blocks: BTreeMap<TableKind, Vec<String>>,
}

impl TsvProjector {
    pub fn new() -> Self {
        TsvProjector {
            blocks: BTreeMap::new(),
        }
    }
}

impl Default for TsvProjector {
    fn default() -> Self {
        TsvProjector::new()
    }
}

impl Projector for TsvProjector {
    fn add_metadata(&mut self, _metadata: ReportMetadata, _template: Option<String>) {
        // TSV output carries no page metadata
    }

    fn add_requests_summary(&mut self, _ratio: &PassFailRatio) {
        // TSV output has no chart
    }

    fn add_table(&mut self, kind: TableKind, table: &Result<SortableTable, DashboardError>) {
        let mut lines = vec![format!("# {}", kind.heading())];
        match table {
            Ok(sortable) => {
                let structure = sortable.table();
                lines.push(tsv_row(structure.titles.iter().map(String::as_str)));
                for row in structure.overall.iter().chain(&structure.rows) {
                    lines.push(tsv_row(row.cells.iter().map(|c| c.text.as_str())));
                }
            }
            Err(e) => lines.push(format!("# error: {}", tsv_field(&e.to_string()))),
        }
        self.blocks.insert(kind, lines);
    }

    fn as_bytes(&self) -> Vec<u8> {
        if self.blocks.is_empty() {
            return Vec::new();
        }
        let mut output = self.blocks.values().map(|lines| lines.join("\n")).join("\n\n");
        output.push('\n');
        output.into_bytes()
    }
}

pub struct ProjectorFactory {}

impl ProjectorFactory {
    pub fn from_file_name(path: &Path) -> Option<Box<dyn Projector>> {
        if path == Path::new("-") {
            return Some(Box::new(TsvProjector::new()) as Box<dyn Projector>);
        }
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "html" => Some(Box::new(HtmlProjector::new()) as Box<dyn Projector>),
            "csv" | "tsv" => Some(Box::new(TsvProjector::new()) as Box<dyn Projector>),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataRow, ReportDataset};
    use crate::filter::FilterState;
    use crate::formatter::ColumnFormatter;
    use crate::sorting::SortKey;
    use crate::table::{build, ColumnGroupSpec};
    use crate::thresholds::Thresholds;

    fn sortable() -> SortableTable {
        let dataset = ReportDataset::new(["Label", "90th pct"])
            .with_overall(DataRow::sample(vec!["Total".into(), 700.0.into()]))
            .with_items(vec![
                DataRow::sample(vec!["<script>".into(), 1200.0.into()]),
                DataRow::sample(vec!["Login".into(), 300.0.into()]),
            ]);
        let mut table = build(
            &dataset,
            &ColumnFormatter::identity(),
            Some(&ColumnGroupSpec::new([("Requests", 1), ("Response Times (ms)", 1)])),
            Some(0),
            &FilterState::default(),
        )
        .unwrap();
        Thresholds {
            response_time_ms: Some(1000.0),
            error_rate_pct: None,
        }
        .highlight(&mut table);
        SortableTable::new(table, &[SortKey::ascending(0)], []).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert!(matches!(escape_html("plain"), Cow::Borrowed("plain")));
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_table_html() {
        let html = render_table_html(TableKind::Summary, &sortable());

        assert!(html.starts_with("<table id=\"statisticsTable\""));
        assert!(html.contains(
            "<tr class=\"tablesorter-no-sort\"><th colspan=\"1\" data-sorter=\"false\">Requests</th>"
        ));
        assert!(html.contains("<tr><th>Label</th><th>90th pct</th></tr></thead>"));
        assert!(html.contains(
            "<tbody class=\"tablesorter-no-sort\"><tr><td>Total</td><td>700</td></tr></tbody>"
        ));
        assert!(html.contains("<td>&lt;script&gt;</td><td class=\"red-text\">1200</td>"));
        assert!(html.contains("<td>Login</td><td class=\"green-text\">300</td>"));
        assert!(html.contains("$(\"#statisticsTable\").tablesorter({sortList: [[0,0]]});"));
        assert!(!html.contains("<td><script>"));

        // Body rows in sorted order, aggregate first
        let total = html.find("Total").unwrap();
        let escaped = html.find("&lt;script&gt;").unwrap();
        let login = html.find("Login").unwrap();
        assert!(total < escaped && escaped < login);
    }

    #[test]
    fn test_excluded_columns_not_sortable_in_page() {
        let table = sortable().table().clone();
        let sortable = SortableTable::new(table, &[], [1]).unwrap();
        let html = render_table_html(TableKind::Summary, &sortable);
        assert!(html.contains("<th data-sorter=\"false\">90th pct</th>"));
        assert!(html.contains("sortList: []"));
    }

    #[test]
    fn test_render_table_error() {
        let html = render_table_error(
            TableKind::Errors,
            &DashboardError::ZeroSpan {
                label: "<x>".to_string(),
            },
        );
        assert!(html.contains("id=\"errorsTable\""));
        assert!(html.contains("&lt;x&gt;"));
    }

    #[test]
    fn test_html_projector_uses_default_template() {
        let mut projector = HtmlProjector::new();
        projector.add_requests_summary(&PassFailRatio::default());
        projector.add_table(TableKind::Summary, &Ok(sortable()));
        let html = String::from_utf8(projector.as_bytes()).unwrap();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Performance Test Report</title>"));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("id=\"statisticsTable\""));
        assert!(!html.contains("{{STATISTICS_TABLE}}"));
    }

    #[test]
    fn test_html_projector_custom_template() {
        let mut projector = HtmlProjector::new();
        projector.add_metadata(
            ReportMetadata {
                title: "Nightly".to_string(),
                ..Default::default()
            },
            Some("<h1>{{TITLE}}</h1>{{ERRORS_TABLE}}".to_string()),
        );
        projector.add_table(
            TableKind::Errors,
            &Err(DashboardError::UnsortableColumn { column: 4 }),
        );
        let html = String::from_utf8(projector.as_bytes()).unwrap();
        assert!(html.starts_with("<h1>Nightly</h1><div id=\"errorsTable\""));
    }

    #[test]
    fn test_tsv_projector() {
        let mut projector = TsvProjector::new();
        assert!(projector.as_bytes().is_empty());

        projector.add_requests_summary(&PassFailRatio::default());
        projector.add_table(TableKind::Summary, &Ok(sortable()));
        projector.add_table(
            TableKind::Errors,
            &Err(DashboardError::UnsortableColumn { column: 4 }),
        );

        let output = String::from_utf8(projector.as_bytes()).unwrap();
        assert_eq!(
            output,
            "# Statistics\nLabel\t90th pct\nTotal\t700\n<script>\t1200\nLogin\t300\n\n\
             # Errors\n# error: Column 4 is not sortable\n"
        );
    }

    #[test]
    fn test_tsv_field() {
        assert_eq!(tsv_field("a\tb\nc"), "a b c");
        assert!(matches!(tsv_field("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_projector_factory() {
        assert!(ProjectorFactory::from_file_name(Path::new("report.html")).is_some());
        assert!(ProjectorFactory::from_file_name(Path::new("report.HTML")).is_some());
        assert!(ProjectorFactory::from_file_name(Path::new("report.csv")).is_some());
        assert!(ProjectorFactory::from_file_name(Path::new("report.tsv")).is_some());
        assert!(ProjectorFactory::from_file_name(Path::new("-")).is_some());
        assert!(ProjectorFactory::from_file_name(Path::new("report.txt")).is_none());
        assert!(ProjectorFactory::from_file_name(Path::new("report")).is_none());
    }
}
