use crate::archive::{BatchProgress, Report, RowStatus};
use crate::naming::{CaptureReason, ReasonRule};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassSummary {
    pub source_folder: PathBuf,
    pub download: String,
    pub aux_folder: String,
    pub destination_dir: PathBuf,
    pub report_path: Option<PathBuf>,
    pub images: usize,
    pub copied: usize,
    pub collisions: usize,
    pub bytes_copied: u64,
    pub time_captures: usize,
    pub motion_captures: usize,
}

impl PassSummary {
    pub fn from_report(
        source_folder: PathBuf,
        destination_dir: PathBuf,
        report: &Report,
        progress: &BatchProgress,
        report_path: Option<PathBuf>,
    ) -> Self {
        let time_captures = report
            .rows
            .iter()
            .filter(|r| r.capture_reason(ReasonRule::Scheduled) == CaptureReason::Time)
            .count();

        Self {
            source_folder,
            download: report.context.download.clone(),
            aux_folder: report.context.aux_folder.clone(),
            destination_dir,
            report_path,
            images: report.len(),
            copied: report
                .rows
                .iter()
                .filter(|r| r.status == RowStatus::Copied)
                .count(),
            collisions: report.collisions(),
            bytes_copied: progress.bytes_copied,
            time_captures,
            motion_captures: report.len() - time_captures,
        }
    }
}

/// Outcome of a whole run, including the passes that finished before a
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub passes: Vec<PassSummary>,
    pub failed_folder: Option<PathBuf>,
    pub error: Option<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            duration: Duration::ZERO,
            passes: Vec::new(),
            failed_folder: None,
            error: None,
        }
    }

    pub fn total_images(&self) -> usize {
        self.passes.iter().map(|p| p.images).sum()
    }

    pub fn total_copied(&self) -> usize {
        self.passes.iter().map(|p| p.copied).sum()
    }

    pub fn total_collisions(&self) -> usize {
        self.passes.iter().map(|p| p.collisions).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
