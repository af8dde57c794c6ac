use serde::{Deserialize, Serialize};

/// Site codes shared by every image of one subfolder pass.
///
/// Built once per subfolder and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub study_area: String,
    pub place: String,
    pub download: String,
    pub aux_folder: String,
}

impl DeploymentContext {
    pub fn new<S: Into<String>>(study_area: S, place: S, download: S, aux_folder: S) -> Self {
        Self {
            study_area: study_area.into(),
            place: place.into(),
            download: download.into(),
            aux_folder: aux_folder.into(),
        }
    }

    /// `{study_area}_{place}_{download}_{aux_folder}`, the stem shared by
    /// encoded image names and the pass report.
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.study_area, self.place, self.download, self.aux_folder
        )
    }

    pub fn report_file_name(&self) -> String {
        format!("{}.csv", self.key())
    }
}
