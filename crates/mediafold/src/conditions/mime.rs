use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::ConditionMatcher;

/// `mime_type`: exact match, or prefix match for `type/*` values.
pub struct MimeTypeMatcher;

impl ConditionMatcher for MimeTypeMatcher {
    fn condition_type(&self) -> &str {
        "mime_type"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(pattern) = condition.text_value() else {
            return false;
        };
        let Some(mime_type) = item.metadata.mime_type.as_deref().filter(|m| !m.is_empty()) else {
            return false;
        };

        if pattern.contains("/*") {
            let prefix = pattern.replace("/*", "/");
            return mime_type.starts_with(&prefix);
        }

        mime_type == pattern
    }
}
