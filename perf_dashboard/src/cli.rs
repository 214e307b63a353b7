use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::Level;

use crate::config::{self, Settings};
use crate::report::{import, render, RenderRequest};
use perf_dashboard_cli_types::{Cli, Commands};

pub fn handle_calls() -> Result<()> {
    let cli = Cli::parse();
    let logger_level = match cli.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(logger_level.as_str())).init();

    match cli.command {
        Commands::Render {
            input,
            output,
            filter,
            template,
            hide_columns,
            response_time_threshold,
            error_rate_threshold,
        } => {
            let request = RenderRequest {
                input,
                output,
                series_filter: filter.series_filter,
                controllers_only: filter.controllers_only,
                all_series: filter.all_series,
                template: template.template,
                custom_css: template.custom_css,
                title: template.title,
                hidden_columns: hide_columns,
                response_time_threshold,
                error_rate_threshold,
            };
            render(&request, &Settings::load())
        }
        Commands::Import { statistics, output } => import(&statistics, &output),
        Commands::Config {} => show_config_info(),
    }
}

/// Show the configuration files and the effective settings
fn show_config_info() -> Result<()> {
    println!("Performance Dashboard Configuration Information");
    println!("===============================================");

    match config::system_config_path() {
        Some(path) if path.is_file() => println!("System config: {} (exists)", path.display()),
        Some(path) => println!("System config: {} (not found)", path.display()),
        None => println!("System config: no home directory"),
    }

    let local = std::env::current_dir()
        .ok()
        .and_then(|dir| config::find_local_config(&dir));
    match local {
        Some(path) => println!("Local config: {}", path.display()),
        None => println!("Local config: not found"),
    }

    match config::read_hierarchical_config() {
        Ok(conf) => {
            println!("\nConfiguration loaded successfully");
            let settings = Settings::from_config(&conf);
            if let Some(title) = &settings.title {
                println!("  Report title: {}", title);
            }
            if let Some(template) = &settings.template {
                println!("  Report template: {}", template.display());
            }
            if let Some(css) = &settings.custom_css {
                println!("  Custom CSS: {}", css.display());
            }
            if let Some(ms) = settings.response_time_ms {
                println!("  Response time threshold: {} ms", ms);
            }
            if let Some(pct) = settings.error_rate_pct {
                println!("  Error rate threshold: {}%", pct);
            }
            if let Some(only_samples) = settings.filters_only_sample_series {
                println!("  Filters only sample series: {}", only_samples);
            }
            if !settings.hidden_columns.is_empty() {
                println!("  Hidden columns: {}", settings.hidden_columns.join(", "));
            }
        }
        Err(e) => {
            println!("\nConfiguration: Error loading - {}", e);
        }
    }

    Ok(())
}
