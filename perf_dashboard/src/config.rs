use config::{Config, ConfigError, File, FileFormat};
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::defaults::{LOCAL_CONFIG_FILE_NAME, SYSTEM_CONFIG_DIR_NAME};

/// System-wide config location for the given XDG config home or home directory.
fn system_config_path_from(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    match (xdg_config_home, home) {
        (Some(xdg), _) => Some(xdg.join(SYSTEM_CONFIG_DIR_NAME).join("config.toml")),
        (None, Some(home)) => Some(
            home.join(".config")
                .join(SYSTEM_CONFIG_DIR_NAME)
                .join("config.toml"),
        ),
        (None, None) => None,
    }
}

/// `$XDG_CONFIG_HOME/perf-dashboard/config.toml`, or below `~/.config`.
pub fn system_config_path() -> Option<PathBuf> {
    let xdg_config_home = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    system_config_path_from(xdg_config_home.as_deref(), dirs_next::home_dir().as_deref())
}

/// Nearest `.perfdashboardconfig` in `start` or one of its ancestors.
pub fn find_local_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(LOCAL_CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Read configuration from the given files; later files override earlier ones.
/// Missing files are skipped.
pub fn read_config_from(
    system: Option<PathBuf>,
    local: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();

    for path in [system, local].into_iter().flatten() {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }

    builder.build()
}

/// Read hierarchical configuration (system -> local override)
pub fn read_hierarchical_config() -> Result<Config, ConfigError> {
    let local = env::current_dir()
        .ok()
        .and_then(|dir| find_local_config(&dir));
    read_config_from(system_config_path(), local)
}

/// Configured values, all optional. Command line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub title: Option<String>,
    pub template: Option<PathBuf>,
    pub custom_css: Option<PathBuf>,
    pub response_time_ms: Option<f64>,
    pub error_rate_pct: Option<f64>,
    pub filters_only_sample_series: Option<bool>,
    pub hidden_columns: Vec<String>,
}

impl Settings {
    pub fn from_config(config: &Config) -> Settings {
        Settings {
            title: config.get_string("report.title").ok(),
            template: config.get_string("report.template").ok().map(PathBuf::from),
            custom_css: config
                .get_string("report.custom_css")
                .ok()
                .map(PathBuf::from),
            response_time_ms: config.get_float("thresholds.response_time_ms").ok(),
            error_rate_pct: config.get_float("thresholds.error_rate_pct").ok(),
            filters_only_sample_series: config.get_bool("filter.filters_only_sample_series").ok(),
            hidden_columns: config
                .get::<Vec<String>>("summary.hidden_columns")
                .unwrap_or_default(),
        }
    }

    /// Settings from the hierarchical config, or defaults when it cannot be read.
    pub fn load() -> Settings {
        match read_hierarchical_config() {
            Ok(config) => Settings::from_config(&config),
            Err(e) => {
                log::debug!("Could not read hierarchical config: {}", e);
                Settings::default()
            }
        }
    }
}
