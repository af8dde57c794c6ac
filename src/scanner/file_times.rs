use crate::error::{DamCamError, Result};
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

/// Filesystem timestamps of one image, local time, whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub modified: NaiveDateTime,
    pub created: NaiveDateTime,
}

impl FileTimes {
    /// Read both timestamps. A missing or unreadable file is
    /// `InaccessiblePath`.
    pub fn read(path: &Path) -> Result<Self> {
        let metadata =
            std::fs::metadata(path).map_err(|e| DamCamError::inaccessible(path, e))?;
        Self::from_metadata(path, &metadata)
    }

    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let modified = metadata
            .modified()
            .map_err(|e| DamCamError::inaccessible(path, e))?;
        let created = created_time(metadata).unwrap_or(modified);

        Ok(Self {
            modified: to_local(modified),
            created: to_local(created),
        })
    }
}

/// Birth time where the platform reports one, else the inode change time.
fn created_time(metadata: &Metadata) -> Option<SystemTime> {
    metadata.created().ok().or_else(|| change_time(metadata))
}

#[cfg(unix)]
fn change_time(metadata: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    let secs = u64::try_from(metadata.ctime()).ok()?;
    SystemTime::UNIX_EPOCH.checked_add(std::time::Duration::from_secs(secs))
}

#[cfg(not(unix))]
fn change_time(_metadata: &Metadata) -> Option<SystemTime> {
    None
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    let local: DateTime<Local> = time.into();
    let naive = local.naive_local();
    naive.with_nanosecond(0).unwrap_or(naive)
}
