use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::ConditionMatcher;

/// `iptc_keywords`: the value is a comma-separated list; the condition holds
/// when any listed keyword is a case-insensitive substring of any keyword
/// embedded in the file.
pub struct IptcKeywordsMatcher;

impl ConditionMatcher for IptcKeywordsMatcher {
    fn condition_type(&self) -> &str {
        "iptc_keywords"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = condition.text_value() else {
            return false;
        };

        let keywords = &item.metadata.image_meta.keywords;
        if keywords.is_empty() {
            return false;
        }
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        value
            .to_lowercase()
            .split(',')
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .any(|target| keywords.iter().any(|keyword| keyword.contains(target)))
    }
}
