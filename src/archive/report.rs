use crate::error::{DamCamError, Result};
use crate::naming::{CaptureReason, DeploymentContext, ReasonRule};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp layout used in report cells.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV header. The leading empty column holds the row index.
pub const REPORT_HEADERS: [&str; 12] = [
    "",
    "OldPath",
    "NewName",
    "NewPath",
    "ModTime",
    "CreatedTime",
    "StudyArea",
    "Place",
    "Download",
    "AuxFolder",
    "Status",
    "CollidesWith",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Copied,
    /// Destination already claimed earlier in the same pass; not copied.
    Collision,
    /// Planned only (dry run).
    Planned,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Copied => "copied",
            RowStatus::Collision => "collision",
            RowStatus::Planned => "planned",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub old_path: PathBuf,
    pub new_name: String,
    pub new_path: PathBuf,
    pub mod_time: NaiveDateTime,
    pub created_time: NaiveDateTime,
    pub context: DeploymentContext,
    pub status: RowStatus,
    pub collides_with: Option<PathBuf>,
}

impl ReportRow {
    pub fn is_collision(&self) -> bool {
        self.status == RowStatus::Collision
    }

    pub fn capture_reason(&self, rule: ReasonRule) -> CaptureReason {
        CaptureReason::classify(self.mod_time, rule)
    }

    fn record(&self, index: usize) -> Vec<String> {
        vec![
            index.to_string(),
            self.old_path.display().to_string(),
            self.new_name.clone(),
            self.new_path.display().to_string(),
            self.mod_time.format(TIMESTAMP_FORMAT).to_string(),
            self.created_time.format(TIMESTAMP_FORMAT).to_string(),
            self.context.study_area.clone(),
            self.context.place.clone(),
            self.context.download.clone(),
            self.context.aux_folder.clone(),
            self.status.as_str().to_string(),
            self.collides_with
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ]
    }
}

/// Rows of one subfolder pass, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub context: DeploymentContext,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(context: DeploymentContext) -> Self {
        Self {
            context,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn collisions(&self) -> usize {
        self.rows.iter().filter(|r| r.is_collision()).count()
    }

    pub fn file_name(&self) -> String {
        self.context.report_file_name()
    }
}

/// Writes pass reports as CSV files into one directory.
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(report_dir: P) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn path_for(&self, report: &Report) -> PathBuf {
        self.report_dir.join(report.file_name())
    }

    /// Write `report`, replacing any earlier file of the same name.
    pub fn write(&self, report: &Report) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir)
            .map_err(|e| DamCamError::write_failure(&self.report_dir, e))?;

        let path = self.path_for(report);
        let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_write_error(&path, e))?;

        writer.write_record(REPORT_HEADERS)?;
        for (index, row) in report.rows.iter().enumerate() {
            writer.write_record(row.record(index))?;
        }
        writer.flush().map_err(|e| DamCamError::write_failure(&path, e))?;

        tracing::info!("Wrote {} report rows to {}", report.len(), path.display());
        Ok(path)
    }
}

fn csv_write_error(path: &Path, error: csv::Error) -> DamCamError {
    if error.is_io_error() {
        if let csv::ErrorKind::Io(source) = error.into_kind() {
            return DamCamError::write_failure(path, source);
        }
        return DamCamError::InvalidPath {
            path: path.display().to_string(),
        };
    }
    DamCamError::Csv(error)
}
