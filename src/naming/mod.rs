pub mod context;
pub mod encoder;
pub mod folder;

pub use context::DeploymentContext;
pub use encoder::{date_part, strip_prefix_all, CaptureReason, NameEncoder, ReasonRule};
pub use folder::FolderClassifier;
