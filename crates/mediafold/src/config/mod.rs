pub mod loader;
pub mod schema;

pub use loader::{default_database_path, load_config, load_config_from_str, resolve_database_path};
pub use schema::{
    AttachmentId, Condition, ConditionValue, Config, FolderId, LoggingConfig, PreviewDefaults,
    Rule, UploadConfig,
};
