use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::ConditionMatcher;

/// `exif_camera`: case-insensitive substring of the camera model.
pub struct ExifCameraMatcher;

impl ConditionMatcher for ExifCameraMatcher {
    fn condition_type(&self) -> &str {
        "exif_camera"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = condition.text_value() else {
            return false;
        };
        let Some(camera) = item
            .metadata
            .image_meta
            .camera
            .as_deref()
            .filter(|c| !c.is_empty())
        else {
            return false;
        };

        camera.to_lowercase().contains(&value.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOperator {
    After,
    Before,
    On,
    Between,
    Year,
    Month,
}

impl DateOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "after" => Some(Self::After),
            "before" => Some(Self::Before),
            "on" => Some(Self::On),
            "between" => Some(Self::Between),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    /// Compares epoch seconds. `on`, `year` and `month` truncate both sides
    /// to the UTC calendar day, year, or year and month.
    pub fn compare(self, actual: i64, value: i64, value_end: i64) -> bool {
        match self {
            Self::After => actual > value,
            Self::Before => actual < value,
            Self::Between => actual >= value && actual <= value_end,
            Self::On => same_calendar(actual, value, |d| (d.year(), d.ordinal())),
            Self::Year => same_calendar(actual, value, |d| d.year()),
            Self::Month => same_calendar(actual, value, |d| (d.year(), d.month())),
        }
    }
}

fn same_calendar<K, F>(a: i64, b: i64, key: F) -> bool
where
    K: PartialEq,
    F: Fn(&DateTime<Utc>) -> K,
{
    match (DateTime::from_timestamp(a, 0), DateTime::from_timestamp(b, 0)) {
        (Some(a), Some(b)) => key(&a) == key(&b),
        _ => false,
    }
}

/// Parses a condition date into UTC epoch seconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY/MM/DD`, `YYYY-MM`, `YYYY` and `@<epoch>`. Partial dates resolve to
/// their first instant.
pub fn parse_date(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(epoch) = s.strip_prefix('@') {
        return epoch.parse().ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return start_of_day(date);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return start_of_day(date);
    }

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).and_then(start_of_day);
    }

    None
}

fn start_of_day(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp())
}

/// `exif_date`: compares the capture timestamp against a date.
pub struct ExifDateMatcher;

impl ConditionMatcher for ExifDateMatcher {
    fn condition_type(&self) -> &str {
        "exif_date"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = condition.text_value() else {
            return false;
        };
        let actual = item.metadata.image_meta.created_timestamp.unwrap_or(0);
        if actual == 0 {
            return false;
        }

        let Some(operator) = DateOperator::parse(condition.operator_or("after")) else {
            return false;
        };
        let Some(value) = parse_date(&value) else {
            return false;
        };
        let value_end = condition
            .value_end
            .as_ref()
            .and_then(|v| parse_date(&v.as_text()))
            .unwrap_or(0);

        operator.compare(actual, value, value_end)
    }
}
