use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DamCamError {
    #[error("Cannot read {path}")]
    InaccessiblePath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Folder {folder} does not map to a download: {reason}")]
    UnmappedFolder { folder: String, reason: String },

    #[error("Destination already exists: {path}")]
    DestinationExists { path: String },

    #[error("Cannot write {path}")]
    WriteFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl DamCamError {
    pub fn inaccessible(path: &Path, source: std::io::Error) -> Self {
        DamCamError::InaccessiblePath {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write_failure(path: &Path, source: std::io::Error) -> Self {
        DamCamError::WriteFailure {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn unmapped<S: Into<String>>(folder: &str, reason: S) -> Self {
        DamCamError::UnmappedFolder {
            folder: folder.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            DamCamError::Cancelled => 130,
            DamCamError::UnmappedFolder { .. } => 3,
            DamCamError::InaccessiblePath { .. } => 4,
            DamCamError::WriteFailure { .. } => 5,
            DamCamError::DestinationExists { .. } => 6,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DamCamError {
    fn user_message(&self) -> String {
        match self {
            DamCamError::InaccessiblePath { path, source } => {
                format!("Cannot read {}: {}", path, source)
            }
            DamCamError::UnmappedFolder { folder, reason } => {
                format!("Folder '{}' cannot be classified: {}", folder, reason)
            }
            DamCamError::DestinationExists { path } => {
                format!("Refusing to overwrite existing file: {}", path)
            }
            DamCamError::WriteFailure { path, source } => {
                format!("Cannot write {}: {}", path, source)
            }
            DamCamError::Csv(err) => {
                format!("Failed to write report: {}", err)
            }
            DamCamError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            DamCamError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            DamCamError::Cancelled => "Run was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DamCamError::InaccessiblePath { .. } => Some(
                "Check that the file still exists and that you have read permission on the input folder.".to_string()
            ),
            DamCamError::UnmappedFolder { .. } => Some(
                "Camera folders must be named like 100RECNX .. 125RECNX. Move or rename unexpected folders out of the input root.".to_string()
            ),
            DamCamError::DestinationExists { .. } => Some(
                "These images were probably renamed by an earlier run. Remove the output folder or pass --force to overwrite.".to_string()
            ),
            DamCamError::WriteFailure { .. } => Some(
                "Ensure the output and report directories are writable and the disk is not full.".to_string()
            ),
            DamCamError::Config { .. } => Some(
                "Check your configuration file (see --generate-config) and command-line flags.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DamCamError {
    fn from(error: toml::de::Error) -> Self {
        DamCamError::Config {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for DamCamError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        match error.into_io_error() {
            Some(source) => DamCamError::InaccessiblePath { path, source },
            None => DamCamError::InvalidPath {
                path: format!("filesystem loop detected at {}", path),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DamCamError>;
