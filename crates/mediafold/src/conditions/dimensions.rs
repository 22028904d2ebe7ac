use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::compare::compare;
use super::ConditionMatcher;

/// `dimensions`: compares width, height, or the smaller of the two (`both`).
pub struct DimensionsMatcher;

impl ConditionMatcher for DimensionsMatcher {
    fn condition_type(&self) -> &str {
        "dimensions"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let (Some(value), Some(dimension)) = (&condition.value, &condition.dimension) else {
            return false;
        };

        let operator = condition.operator_or("gt");
        let value = value.as_uint();
        let value_end = condition.value_end.as_ref().map(|v| v.as_uint()).unwrap_or(0);

        let width = item.metadata.width.map(u64::from);
        let height = item.metadata.height.map(u64::from);
        let actual = match dimension.as_str() {
            "width" => width.unwrap_or(0),
            "height" => height.unwrap_or(0),
            // "At least N x N" has to hold for the smaller side.
            "both" => width.unwrap_or(0).min(height.unwrap_or(0)),
            _ => 0,
        };

        if actual == 0 {
            return false;
        }

        compare(actual, operator, value, value_end)
    }
}
