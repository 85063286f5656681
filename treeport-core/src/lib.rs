pub mod crawl;
pub mod error;
pub mod map;
pub mod report;

pub use crawl::{ReportOptions, ReportOutcome, execute_report};
pub use error::ReportError;
pub use map::{ReportRow, RowTransform};
