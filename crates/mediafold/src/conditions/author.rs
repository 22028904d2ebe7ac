use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::ConditionMatcher;

/// `author`: the uploading user's id. Both sides are coerced to integers,
/// so `"5"` and `5` are the same author.
pub struct AuthorMatcher;

impl ConditionMatcher for AuthorMatcher {
    fn condition_type(&self) -> &str {
        "author"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = condition.value.as_ref().filter(|v| !v.is_empty()) else {
            return false;
        };
        let Some(author_id) = item.metadata.author_id else {
            return false;
        };

        author_id.unsigned_abs() == value.as_uint()
    }
}
