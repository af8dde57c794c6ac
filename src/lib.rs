pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, NamingConfig, OutputConfig, PathsConfig, SiteConfig};
pub use error::{DamCamError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{
    BatchProcessor, BatchProgress, PassSummary, Report, ReportRow, ReportWriter, RowStatus,
    RunSummary,
};
pub use naming::{CaptureReason, DeploymentContext, FolderClassifier, NameEncoder, ReasonRule};
pub use scanner::{FileTimes, ImageFile, ImageScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::fs;
use std::path::Path;
use std::time::Instant;

/// Main library interface: runs one renaming job over an input root.
pub struct DamCam {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl DamCam {
    /// Create a new instance; installs the Ctrl+C handler.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create an instance without touching process signal handlers.
    pub fn new_without_signals(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(config, output_mode, verbose, quiet, GracefulShutdown::new_for_test())
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Process every camera folder under the input root, strictly in order.
    ///
    /// The first error aborts the run. The summary of the folders finished
    /// before it is printed either way.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new();

        self.output_formatter.start_operation(&format!(
            "Renaming images under {}",
            self.config.paths.input_root.display()
        ));

        let result = self.process_all(&mut summary);
        summary.duration = started.elapsed();
        self.progress_manager.clear();

        match result {
            Ok(()) => {
                tracing::info!(
                    "Run finished: {} folders, {} images, {} collisions",
                    summary.passes.len(),
                    summary.total_images(),
                    summary.total_collisions()
                );
                self.output_formatter.print_run_summary(&summary);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Run aborted: {}", e);
                summary.error = Some(e.user_message());
                self.output_formatter.print_run_summary(&summary);
                Err(e)
            }
        }
    }

    fn process_all(&self, summary: &mut RunSummary) -> Result<()> {
        let folders = scanner::list_subfolders(&self.config.paths.input_root)?;
        if folders.is_empty() {
            self.output_formatter.warning(&format!(
                "No camera folders found under {}",
                self.config.paths.input_root.display()
            ));
        }

        let classifier = self.folder_classifier();
        let writer = ReportWriter::new(self.config.paths.report_dir.clone());

        for folder in folders {
            let outcome = self
                .shutdown
                .check_shutdown()
                .and_then(|_| self.process_subfolder(&folder, &classifier, Some(&writer)));

            match outcome {
                Ok((pass, _)) => summary.passes.push(pass),
                Err(e) => {
                    summary.failed_folder = Some(folder);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Compute every folder's rows without copying files or writing reports.
    pub fn plan(&self) -> Result<Vec<Report>> {
        let classifier = self.folder_classifier();
        let mut reports = Vec::new();

        for folder in scanner::list_subfolders(&self.config.paths.input_root)? {
            let (_, report) = self.process_subfolder(&folder, &classifier, None)?;
            reports.push(report);
        }

        Ok(reports)
    }

    /// One pass over a camera folder. Without a writer nothing on disk is
    /// touched.
    fn process_subfolder(
        &self,
        folder: &Path,
        classifier: &FolderClassifier,
        writer: Option<&ReportWriter>,
    ) -> Result<(PassSummary, Report)> {
        let dry_run = writer.is_none();
        let folder_name = folder
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DamCamError::InvalidPath {
                path: format!("Not a UTF-8 folder name: {}", folder.display()),
            })?;

        let download = classifier.download_id(folder_name)?;
        let dest_dir = self.config.paths.output_root.join(&download);
        if !dry_run {
            fs::create_dir_all(&dest_dir).map_err(|e| DamCamError::write_failure(&dest_dir, e))?;
        }

        let context = self.deployment_context(download, classifier.aux_folder(folder_name));
        tracing::info!("Folder {} -> {}", folder.display(), dest_dir.display());
        self.output_formatter.info(&format!(
            "{} -> {} (folder code {})",
            folder_name, context.download, context.aux_folder
        ));

        let encoder = NameEncoder::from_config(&context, &self.config.naming);
        let processor = BatchProcessor::new(encoder, ImageScanner::from_config(&self.config.naming))
            .with_overwrite_existing(self.config.output.overwrite_existing)
            .with_dry_run(dry_run)
            .with_shutdown(&self.shutdown);

        let file_progress = self.progress_manager.create_file_progress(folder_name);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &BatchProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let (report, progress) =
            match processor.process_folder(folder, &dest_dir, Some(&progress_callback)) {
                Ok(result) => result,
                Err(e) => {
                    file_progress.abandon_with_message(format!("failed: {}", e));
                    return Err(e);
                }
            };

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("{} images", report.len()),
            progress.elapsed(),
        );

        if report.collisions() > 0 {
            self.progress_manager.suspend(|| {
                self.output_formatter.warning(&format!(
                    "{}: {} images share a destination name with an earlier image and were not copied (see Status column)",
                    folder_name,
                    report.collisions()
                ))
            });
        }

        let report_path = match writer {
            Some(writer) => Some(writer.write(&report)?),
            None => None,
        };

        let pass = PassSummary::from_report(
            folder.to_path_buf(),
            dest_dir,
            &report,
            &progress,
            report_path,
        );
        Ok((pass, report))
    }

    fn folder_classifier(&self) -> FolderClassifier {
        FolderClassifier::new(self.config.site.download_prefix.clone())
            .with_folder_prefix(self.config.naming.folder_prefix.clone())
    }

    fn deployment_context(&self, download: String, aux_folder: String) -> DeploymentContext {
        DeploymentContext {
            study_area: self.config.site.study_area.clone(),
            place: self.config.site.place.clone(),
            download,
            aux_folder,
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        let path = output_path.as_ref();
        fs::write(path, sample_config).map_err(|e| DamCamError::write_failure(path, e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &DamCamError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
