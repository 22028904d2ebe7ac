//! Condition matchers, one per condition `type`.
//!
//! A matcher is a pure predicate over an item and one condition record. It
//! must never fail: missing or malformed parameters make it return `false`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::schema::Condition;
use crate::library::MediaItem;

pub mod author;
pub mod compare;
pub mod dimensions;
pub mod exif;
pub mod file_size;
pub mod filename;
pub mod keywords;
pub mod mime;

pub use author::AuthorMatcher;
pub use dimensions::DimensionsMatcher;
pub use exif::{ExifCameraMatcher, ExifDateMatcher};
pub use file_size::FileSizeMatcher;
pub use filename::FilenameRegexMatcher;
pub use keywords::IptcKeywordsMatcher;
pub use mime::MimeTypeMatcher;

pub trait ConditionMatcher: Send + Sync {
    /// The `type` string this matcher is registered under.
    fn condition_type(&self) -> &str;

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool;
}

/// Matchers keyed by condition type.
#[derive(Clone)]
pub struct MatcherRegistry {
    matchers: HashMap<String, Arc<dyn ConditionMatcher>>,
}

impl MatcherRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            matchers: HashMap::new(),
        }
    }

    /// All built-in condition types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(FilenameRegexMatcher::new());
        registry.register(MimeTypeMatcher);
        registry.register(DimensionsMatcher);
        registry.register(FileSizeMatcher);
        registry.register(ExifCameraMatcher);
        registry.register(ExifDateMatcher);
        registry.register(AuthorMatcher);
        registry.register(IptcKeywordsMatcher);
        registry
    }

    /// Adds a matcher, replacing any existing one for the same type.
    pub fn register<M: ConditionMatcher + 'static>(&mut self, matcher: M) -> &mut Self {
        self.matchers
            .insert(matcher.condition_type().to_string(), Arc::new(matcher));
        self
    }

    pub fn get(&self, condition_type: &str) -> Option<&dyn ConditionMatcher> {
        self.matchers.get(condition_type).map(|m| m.as_ref())
    }

    pub fn contains(&self, condition_type: &str) -> bool {
        self.matchers.contains_key(condition_type)
    }

    /// Registered types, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.matchers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::library::{AttachmentMetadata, MediaItem};

    pub fn item(metadata: AttachmentMetadata) -> MediaItem {
        MediaItem::new(1, metadata)
    }
}
