//! Library-wide passes: paginated preview, apply, and statistics.

pub mod processor;
pub mod request;
pub mod response;

pub use processor::BatchProcessor;
pub use request::{ApplyRequest, PreviewRequest};
pub use response::{
    ApplyItem, ApplyResponse, ApplyStatus, FolderSummary, LibraryStats, PreviewItem,
    PreviewResponse, PreviewStatus, RuleSummary,
};
