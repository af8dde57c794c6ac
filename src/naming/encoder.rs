use crate::config::NamingConfig;
use crate::naming::DeploymentContext;
use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Hours at which the cameras take their scheduled time-lapse shot.
pub const SCHEDULED_HOURS: [u32; 3] = [0, 8, 16];

/// Builds destination filenames of the form
/// `{study}_{place}_{download}_{folder}__{date}__{original}.{ext}`.
pub struct NameEncoder<'a> {
    context: &'a DeploymentContext,
    time_delta_hours: i32,
    include_seconds: bool,
    extension: String,
    file_prefix: String,
}

impl<'a> NameEncoder<'a> {
    pub fn new(context: &'a DeploymentContext) -> Self {
        let defaults = NamingConfig::default();
        Self {
            context,
            time_delta_hours: defaults.time_delta_hours,
            include_seconds: defaults.include_seconds,
            extension: defaults.image_extension,
            file_prefix: defaults.file_prefix,
        }
    }

    pub fn from_config(context: &'a DeploymentContext, naming: &NamingConfig) -> Self {
        Self::new(context)
            .with_time_delta_hours(naming.time_delta_hours)
            .with_include_seconds(naming.include_seconds)
            .with_extension(naming.image_extension.clone())
            .with_file_prefix(naming.file_prefix.clone())
    }

    pub fn with_time_delta_hours(mut self, hours: i32) -> Self {
        self.time_delta_hours = hours;
        self
    }

    pub fn with_include_seconds(mut self, include: bool) -> Self {
        self.include_seconds = include;
        self
    }

    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_file_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn context(&self) -> &DeploymentContext {
        self.context
    }

    /// Encode the destination filename for an image modified at `modified`.
    pub fn encode(&self, modified: NaiveDateTime, original_name: &str) -> String {
        let date = date_part(modified, self.time_delta_hours, self.include_seconds);
        format!(
            "{}__{}__{}.{}",
            self.context.key(),
            date,
            self.strip_original(original_name),
            self.extension
        )
    }

    /// Original name without its image extension and camera-firmware prefix.
    pub fn strip_original(&self, original_name: &str) -> String {
        let stem = original_name
            .strip_suffix(&self.extension)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(original_name);
        strip_prefix_all(stem, &self.file_prefix)
    }
}

/// `YYYY_M_D__H_MIN[_S]` with unpadded components, after shifting the
/// timestamp back by `time_delta_hours`.
pub fn date_part(timestamp: NaiveDateTime, time_delta_hours: i32, include_seconds: bool) -> String {
    let shifted = timestamp - Duration::hours(i64::from(time_delta_hours));

    let mut date = format!(
        "{}_{}_{}__{}_{}",
        shifted.year(),
        shifted.month(),
        shifted.day(),
        shifted.hour(),
        shifted.minute()
    );
    if include_seconds {
        date.push_str(&format!("_{}", shifted.second()));
    }
    date
}

/// Remove every occurrence of `marker` from `name`.
pub fn strip_prefix_all(name: &str, marker: &str) -> String {
    if marker.is_empty() {
        return name.to_string();
    }
    name.replace(marker, "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureReason {
    Time,
    Motion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonRule {
    /// Only the 00:00, 08:00 and 16:00 shots count as scheduled.
    Scheduled,
    /// Any shot taken exactly on the hour counts as scheduled.
    AnyHour,
}

impl CaptureReason {
    pub fn classify(timestamp: NaiveDateTime, rule: ReasonRule) -> Self {
        let on_the_hour = timestamp.minute() == 0 && timestamp.second() == 0;
        let hour_ok = match rule {
            ReasonRule::Scheduled => SCHEDULED_HOURS.contains(&timestamp.hour()),
            ReasonRule::AnyHour => true,
        };

        if on_the_hour && hour_ok {
            CaptureReason::Time
        } else {
            CaptureReason::Motion
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureReason::Time => "Time",
            CaptureReason::Motion => "Motion",
        }
    }
}

impl std::fmt::Display for CaptureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
