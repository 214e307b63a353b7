use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, name = "perf-dashboard")]
pub struct Cli {
    /// Increase verbosity level (can be specified multiple times.) The first level sets level
    /// "info", second sets level "debug", and third sets level "trace" for the logger.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CliFilter {
    /// Only show series whose label matches this regular expression (case-insensitive)
    #[arg(short = 'f', long, default_value = "")]
    pub series_filter: String,

    /// Only show controller (transaction group) rows in tables that support it
    #[arg(short = 'c', long)]
    pub controllers_only: bool,

    /// Apply the series filter to every table with a label column, including
    /// tables that do not distinguish controllers from samples
    #[arg(long)]
    pub all_series: bool,
}

#[derive(Args)]
pub struct CliTemplate {
    /// HTML template with placeholders for the report tables
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// CSS file whose content is inlined into the report
    #[arg(long)]
    pub custom_css: Option<PathBuf>,

    /// Title of the generated report
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the dashboard tables and pass/fail chart.
    ///
    /// The output format is chosen by the file extension: `.html` produces the
    /// interactive report page, `.csv`/`.tsv` (or `-` for stdout) produce
    /// tab-separated rows of every rendered table.
    Render {
        /// Dashboard input (JSON with summary, errors and topErrors datasets)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,

        #[command(flatten)]
        filter: CliFilter,

        #[command(flatten)]
        template: CliTemplate,

        /// Remove a column (by title) from the statistics table. Can be repeated.
        #[arg(long = "hide-column")]
        hide_columns: Vec<String>,

        /// 90th percentile response time (ms) under which a request passes
        #[arg(long, value_parser=parse_threshold)]
        response_time_threshold: Option<f64>,

        /// Error percentage under which a request passes
        #[arg(long, value_parser=parse_threshold)]
        error_rate_threshold: Option<f64>,
    },

    /// Convert a JMeter statistics.json into a dashboard input file
    Import {
        /// JMeter statistics.json
        #[arg(short, long)]
        statistics: PathBuf,

        /// Dashboard input file to write (`-` for stdout)
        #[arg(short, long, default_value = "dashboard.json")]
        output: PathBuf,
    },

    /// Show the configuration files and the effective settings
    Config {},
}

fn parse_threshold(s: &str) -> Result<f64> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid threshold: '{}' is not a number", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow!(
            "invalid threshold: '{}' must be a finite, non-negative number",
            s
        ));
    }
    Ok(value)
}
