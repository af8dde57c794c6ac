use crate::config::{CliOverrides, Config, MAX_TIME_DELTA_HOURS};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "damcam")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rename and archive DamCam camera-trap images")]
#[command(
    long_about = "damcam copies every image from the camera folders under an input root \
                  into per-download folders, renaming each file after its site codes and \
                  capture time, and writes one CSV manifest per camera folder."
)]
#[command(after_help = "EXAMPLES:\n  \
    damcam ./DCIM --study-area ED --place Dam0 --download-prefix D1\n  \
    damcam ./DCIM --output ./Renamed --reports ./Reports --time-delta 1 --seconds\n  \
    damcam --config sibbald.toml --dry-run\n  \
    damcam --generate-config --config damcam.toml")]
pub struct Cli {
    /// Folder holding the camera folders (100RECNX, 101RECNX, ...)
    pub input_root: Option<PathBuf>,

    /// Study area code, e.g. ED
    #[arg(long)]
    pub study_area: Option<String>,

    /// Place code, e.g. Dam0
    #[arg(long)]
    pub place: Option<String>,

    /// Download name prefix; the folder letter is appended (D1 -> D1A)
    #[arg(long)]
    pub download_prefix: Option<String>,

    /// Root folder for renamed images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Folder for CSV reports
    #[arg(short, long)]
    pub reports: Option<PathBuf>,

    /// Hours subtracted from capture times before naming
    #[arg(
        long,
        allow_negative_numbers = true,
        value_parser = parse_time_delta
    )]
    pub time_delta: Option<i32>,

    /// Include seconds in the encoded capture time
    #[arg(long)]
    pub seconds: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite images left by an earlier run
    #[arg(long, help = "Overwrite destination files that already exist")]
    pub force: bool,

    /// Show the renaming plan without copying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_root(self.input_root.clone())
            .with_output_root(self.output.clone())
            .with_report_dir(self.reports.clone())
            .with_study_area(self.study_area.clone())
            .with_place(self.place.clone())
            .with_download_prefix(self.download_prefix.clone())
            .with_time_delta_hours(self.time_delta)
            .with_include_seconds(self.seconds)
            .with_overwrite_existing(self.force)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn parse_time_delta(s: &str) -> std::result::Result<i32, String> {
    let hours: i32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number of hours: {}", s))?;

    if hours.abs() > MAX_TIME_DELTA_HOURS {
        return Err(format!(
            "Time delta must be within [-{max}, {max}] hours",
            max = MAX_TIME_DELTA_HOURS
        ));
    }

    Ok(hours)
}
