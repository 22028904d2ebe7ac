use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::compare::compare;
use super::ConditionMatcher;

const BYTES_PER_KB: u64 = 1024;

/// `file_size`: condition values are kilobytes, item sizes are bytes.
pub struct FileSizeMatcher;

impl ConditionMatcher for FileSizeMatcher {
    fn condition_type(&self) -> &str {
        "file_size"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = &condition.value else {
            return false;
        };

        let operator = condition.operator_or("gt");
        let value = value.as_uint().saturating_mul(BYTES_PER_KB);
        let value_end = condition
            .value_end
            .as_ref()
            .map(|v| v.as_uint().saturating_mul(BYTES_PER_KB))
            .unwrap_or(0);

        let actual = item.metadata.filesize.unwrap_or(0);
        if actual == 0 {
            return false;
        }

        compare(actual, operator, value, value_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::test_support::item;
    use crate::library::AttachmentMetadata;

    const MB: u64 = 1024 * 1024;

    fn sized(filesize: Option<u64>) -> MediaItem {
        item(AttachmentMetadata {
            filesize,
            ..Default::default()
        })
    }

    #[test]
    fn test_between_in_kilobytes() {
        let condition = Condition::new("file_size")
            .with_operator("between")
            .with_value(2048)
            .with_value_end(5120);
        assert!(FileSizeMatcher.matches(&sized(Some(3 * MB)), &condition));
        assert!(!FileSizeMatcher.matches(&sized(Some(10 * MB)), &condition));
        assert!(FileSizeMatcher.matches(&sized(Some(2 * MB)), &condition));
        assert!(FileSizeMatcher.matches(&sized(Some(5 * MB)), &condition));
    }

    #[test]
    fn test_greater_and_less_than() {
        let larger = Condition::new("file_size").with_operator("gt").with_value(1024);
        assert!(FileSizeMatcher.matches(&sized(Some(MB + 1)), &larger));
        assert!(!FileSizeMatcher.matches(&sized(Some(MB)), &larger));

        let smaller = Condition::new("file_size").with_operator("lte").with_value("100");
        assert!(FileSizeMatcher.matches(&sized(Some(100 * 1024)), &smaller));
        assert!(!FileSizeMatcher.matches(&sized(Some(100 * 1024 + 1)), &smaller));
    }

    #[test]
    fn test_unknown_or_zero_size_never_matches() {
        let condition = Condition::new("file_size").with_operator("lt").with_value(1024);
        assert!(!FileSizeMatcher.matches(&sized(None), &condition));
        assert!(!FileSizeMatcher.matches(&sized(Some(0)), &condition));
    }

    #[test]
    fn test_missing_value() {
        let condition = Condition::new("file_size").with_operator("gt");
        assert!(!FileSizeMatcher.matches(&sized(Some(MB)), &condition));
    }
}
