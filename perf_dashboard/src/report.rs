use std::{
    fs::File,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

use crate::config::Settings;
use crate::dashboard::{DashboardController, DashboardOptions};
use crate::data::DashboardInput;
use crate::defaults::DEFAULT_FILTERS_ONLY_SAMPLE_SERIES;
use crate::filter::{FilterState, FilterUpdate};
use crate::import::{parse_statistics, read_input};
use crate::render::ProjectorFactory;
use crate::template::{load_custom_css, load_template, ReportMetadata};
use crate::thresholds::Thresholds;

/// Everything the `render` command was asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub series_filter: String,
    pub controllers_only: bool,
    pub all_series: bool,
    pub template: Option<PathBuf>,
    pub custom_css: Option<PathBuf>,
    pub title: Option<String>,
    pub hidden_columns: Vec<String>,
    pub response_time_threshold: Option<f64>,
    pub error_rate_threshold: Option<f64>,
}

impl RenderRequest {
    /// Dashboard options with command line values taking precedence over
    /// `settings`, and `settings` over the defaults.
    ///
    /// The series filter is not part of the options: it goes through
    /// [`DashboardController::apply_filter`] so an invalid expression is
    /// handled like any other filter change.
    pub fn dashboard_options(&self, settings: &Settings) -> DashboardOptions {
        let filters_only_sample_series = if self.all_series {
            false
        } else {
            settings
                .filters_only_sample_series
                .unwrap_or(DEFAULT_FILTERS_ONLY_SAMPLE_SERIES)
        };

        let mut hidden_columns = self.hidden_columns.clone();
        for title in &settings.hidden_columns {
            if !hidden_columns.contains(title) {
                hidden_columns.push(title.clone());
            }
        }

        DashboardOptions {
            filter: FilterState::default()
                .with_controllers_only(self.controllers_only)
                .with_filters_only_sample_series(filters_only_sample_series),
            thresholds: Thresholds {
                response_time_ms: self.response_time_threshold.or(settings.response_time_ms),
                error_rate_pct: self.error_rate_threshold.or(settings.error_rate_pct),
            },
            hidden_columns,
        }
    }
}

fn is_html(output: &Path) -> bool {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}

/// Write to `output`, or stdout for `-`. A closed stdout is not an error.
pub fn write_output(output: &Path, bytes: &[u8]) -> Result<()> {
    if output == Path::new("-") {
        match io::stdout().write_all(bytes) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            res => res,
        }?;
    } else {
        File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?
            .write_all(bytes)?;
    }
    Ok(())
}

/// Read a dashboard input file (`-` for stdin).
pub fn load_input(input: &Path) -> Result<DashboardInput> {
    let content = read_input(&input.to_string_lossy())?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dashboard input {}", input.display()))
}

/// Build the dashboard and write it in the format implied by the output name.
pub fn render(request: &RenderRequest, settings: &Settings) -> Result<()> {
    let mut projector = ProjectorFactory::from_file_name(&request.output)
        .ok_or(anyhow!("Could not infer output format"))?;

    let input = load_input(&request.input)?;
    let mut controller = DashboardController::new(input, request.dashboard_options(settings));

    if !request.series_filter.is_empty() {
        if let Err(e) = controller.apply_filter(FilterUpdate::series_filter(&request.series_filter))
        {
            log::warn!("{}, rendering without series filter", e);
        }
    }

    if is_html(&request.output) {
        let template_path = request.template.as_ref().or(settings.template.as_ref());
        let template = load_template(template_path.map(PathBuf::as_path))?;

        let css_path = request.custom_css.as_ref().or(settings.custom_css.as_ref());
        let custom_css = load_custom_css(css_path.map(PathBuf::as_path))?;

        let title = request.title.clone().or_else(|| settings.title.clone());
        let metadata = ReportMetadata::new(title, custom_css, controller.state());
        projector.add_metadata(metadata, template);
    }

    controller.project(projector.as_mut());
    write_output(&request.output, &projector.as_bytes())
}

/// Convert a JMeter `statistics.json` into a dashboard input file.
pub fn import(statistics: &Path, output: &Path) -> Result<()> {
    let content = read_input(&statistics.to_string_lossy())?;
    let input = parse_statistics(&content)?;
    let mut json = serde_json::to_string_pretty(&input)?;
    json.push('\n');
    write_output(output, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_takes_precedence() {
        let request = RenderRequest {
            controllers_only: true,
            hidden_columns: vec!["Min".to_string()],
            response_time_threshold: Some(800.0),
            ..Default::default()
        };
        let settings = Settings {
            response_time_ms: Some(1500.0),
            error_rate_pct: Some(5.0),
            filters_only_sample_series: Some(false),
            hidden_columns: vec!["Max".to_string(), "Min".to_string()],
            ..Default::default()
        };

        let options = request.dashboard_options(&settings);
        assert_eq!(options.thresholds.response_time_ms, Some(800.0));
        assert_eq!(options.thresholds.error_rate_pct, Some(5.0));
        assert!(options.filter.show_controllers_only());
        assert!(!options.filter.filters_only_sample_series());
        assert_eq!(options.hidden_columns, vec!["Min", "Max"]);
    }

    #[test]
    fn test_defaults_without_settings() {
        let options = RenderRequest::default().dashboard_options(&Settings::default());
        assert_eq!(options.filter, FilterState::default());
        assert!(options.thresholds.is_empty());
        assert!(options.hidden_columns.is_empty());
    }

    #[test]
    fn test_all_series_overrides_config() {
        let request = RenderRequest {
            all_series: true,
            ..Default::default()
        };
        let settings = Settings {
            filters_only_sample_series: Some(true),
            ..Default::default()
        };
        assert!(!request
            .dashboard_options(&settings)
            .filter
            .filters_only_sample_series());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(Path::new("report.html")));
        assert!(is_html(Path::new("out/REPORT.HTML")));
        assert!(!is_html(Path::new("report.tsv")));
        assert!(!is_html(Path::new("-")));
    }
}
