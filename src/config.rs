use crate::error::{DamCamError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest timezone correction, in hours, accepted in either direction.
pub const MAX_TIME_DELTA_HOURS: i32 = 23;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,
    pub naming: NamingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub study_area: String,
    pub place: String,
    pub download_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub report_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    pub time_delta_hours: i32,
    pub include_seconds: bool,
    pub image_extension: String,
    pub file_prefix: String,
    pub folder_prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub overwrite_existing: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            study_area: "ED".to_string(),
            place: "Dam0".to_string(),
            download_prefix: "D1".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("DCIM"),
            output_root: PathBuf::from("Renamed"),
            report_dir: PathBuf::from("Reports"),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            time_delta_hours: 0,
            include_seconds: false,
            image_extension: "JPG".to_string(),
            file_prefix: "RCNX".to_string(),
            folder_prefix: "RECNX".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DamCamError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DamCamError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| DamCamError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["damcam.toml", ".damcam.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!("Loading configuration from {}", default_path);
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_root) = cli_args.input_root {
            self.paths.input_root = input_root.clone();
        }

        if let Some(ref output_root) = cli_args.output_root {
            self.paths.output_root = output_root.clone();
        }

        if let Some(ref report_dir) = cli_args.report_dir {
            self.paths.report_dir = report_dir.clone();
        }

        if let Some(ref study_area) = cli_args.study_area {
            self.site.study_area = study_area.trim().to_string();
        }

        if let Some(ref place) = cli_args.place {
            self.site.place = place.trim().to_string();
        }

        if let Some(ref prefix) = cli_args.download_prefix {
            self.site.download_prefix = prefix.trim().to_string();
        }

        if let Some(delta) = cli_args.time_delta_hours {
            self.naming.time_delta_hours = delta;
        }

        if cli_args.include_seconds {
            self.naming.include_seconds = true;
        }

        if cli_args.overwrite_existing {
            self.output.overwrite_existing = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DamCamError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| DamCamError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("study_area", &self.site.study_area),
            ("place", &self.site.place),
            ("download_prefix", &self.site.download_prefix),
        ] {
            if value.is_empty() {
                return Err(DamCamError::Config {
                    message: format!("Site code '{}' must not be empty", name),
                });
            }
            if value.contains(['/', '\\']) {
                return Err(DamCamError::Config {
                    message: format!("Site code '{}' must not contain path separators: {}", name, value),
                });
            }
        }

        for (name, value) in [
            ("input_root", &self.paths.input_root),
            ("output_root", &self.paths.output_root),
            ("report_dir", &self.paths.report_dir),
        ] {
            if value.as_os_str().is_empty() {
                return Err(DamCamError::Config {
                    message: format!("Path '{}' must not be empty", name),
                });
            }
        }

        if !self.paths.input_root.is_dir() {
            return Err(DamCamError::Config {
                message: format!(
                    "Input root does not exist or is not a directory: {}",
                    self.paths.input_root.display()
                ),
            });
        }

        if self.naming.time_delta_hours.abs() > MAX_TIME_DELTA_HOURS {
            return Err(DamCamError::Config {
                message: format!(
                    "Time delta must be within [-{max}, {max}] hours, got {}",
                    self.naming.time_delta_hours,
                    max = MAX_TIME_DELTA_HOURS
                ),
            });
        }

        if self.naming.image_extension.is_empty() {
            return Err(DamCamError::Config {
                message: "Image extension must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub study_area: Option<String>,
    pub place: Option<String>,
    pub download_prefix: Option<String>,
    pub time_delta_hours: Option<i32>,
    pub include_seconds: bool,
    pub overwrite_existing: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_root(mut self, input_root: Option<PathBuf>) -> Self {
        self.input_root = input_root;
        self
    }

    pub fn with_output_root(mut self, output_root: Option<PathBuf>) -> Self {
        self.output_root = output_root;
        self
    }

    pub fn with_report_dir(mut self, report_dir: Option<PathBuf>) -> Self {
        self.report_dir = report_dir;
        self
    }

    pub fn with_study_area(mut self, study_area: Option<String>) -> Self {
        self.study_area = study_area;
        self
    }

    pub fn with_place(mut self, place: Option<String>) -> Self {
        self.place = place;
        self
    }

    pub fn with_download_prefix(mut self, prefix: Option<String>) -> Self {
        self.download_prefix = prefix;
        self
    }

    pub fn with_time_delta_hours(mut self, delta: Option<i32>) -> Self {
        self.time_delta_hours = delta;
        self
    }

    pub fn with_include_seconds(mut self, include: bool) -> Self {
        self.include_seconds = include;
        self
    }

    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }
}
