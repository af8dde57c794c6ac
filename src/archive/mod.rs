pub mod batch;
pub mod report;
pub mod summary;

pub use batch::{BatchProcessor, BatchProgress};
pub use report::{Report, ReportRow, ReportWriter, RowStatus};
pub use summary::{PassSummary, RunSummary};
