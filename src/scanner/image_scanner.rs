use crate::config::NamingConfig;
use crate::error::{DamCamError, Result};
use crate::scanner::FileTimes;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One camera image and the timestamps read from its filesystem entry.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub source_path: PathBuf,
    pub file_name: String,
    pub times: FileTimes,
}

impl ImageFile {
    pub fn read(source_path: &Path) -> Result<Self> {
        let file_name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DamCamError::InvalidPath {
                path: format!("Not a UTF-8 file name: {}", source_path.display()),
            })?
            .to_string();
        let times = FileTimes::read(source_path)?;

        Ok(Self {
            source_path: source_path.to_path_buf(),
            file_name,
            times,
        })
    }

    pub fn modified(&self) -> NaiveDateTime {
        self.times.modified
    }

    pub fn created(&self) -> NaiveDateTime {
        self.times.created
    }
}

/// Lists camera images directly inside a folder (no recursion).
pub struct ImageScanner {
    extension: String,
}

impl ImageScanner {
    pub fn new<S: Into<String>>(extension: S) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn from_config(naming: &NamingConfig) -> Self {
        Self::new(naming.image_extension.clone())
    }

    /// Exact, case-sensitive extension match: `JPG` does not match `x.jpg`.
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }

    /// Image paths directly inside `folder`, sorted by file name.
    pub fn scan_folder(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !folder.is_dir() {
            return Err(DamCamError::InvalidPath {
                path: format!("{} is not a directory", folder.display()),
            });
        }

        let mut images = Vec::new();
        for entry in single_level(folder) {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_image(entry.path()) {
                images.push(entry.into_path());
            }
        }

        tracing::debug!("Found {} images in {}", images.len(), folder.display());
        Ok(images)
    }
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn list_subfolders(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(DamCamError::InvalidPath {
            path: format!("{} is not a directory", root.display()),
        });
    }

    let mut folders = Vec::new();
    for entry in single_level(root) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }
    Ok(folders)
}

fn single_level(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}
