//! Rule-based classification of media library items into folders.

pub mod batch;
pub mod conditions;
pub mod config;
pub mod db;
pub mod error;
pub mod evaluator;
pub mod importer;
pub mod library;
pub mod logging;

pub use batch::{
    ApplyRequest, ApplyResponse, BatchProcessor, LibraryStats, PreviewRequest, PreviewResponse,
};
pub use conditions::{ConditionMatcher, MatcherRegistry};
pub use config::{load_config, Condition, ConditionValue, Config, Rule};
pub use db::{Database, RuleDraft, RuleRepository, SqliteLibrary};
pub use error::{ConfigError, ImportError, MediaFoldError, Result, RuleError, StoreError};
pub use evaluator::{MatchResult, RuleEvaluator, UploadContext, UploadOutcome};
pub use importer::{ImportReport, MediaImporter};
pub use library::{
    AttachmentFilter, AttachmentMetadata, FolderSink, ImageMeta, MediaCatalog, MediaItem,
    MetadataProvider, RuleSource, StaticRules,
};
