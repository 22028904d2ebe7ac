use moka::sync::Cache;
use regex::{Regex, RegexBuilder};

use crate::config::schema::Condition;
use crate::library::MediaItem;

use super::ConditionMatcher;

const PATTERN_CACHE_CAPACITY: u64 = 512;

/// How a stored filename pattern was understood.
#[derive(Debug, Clone)]
pub enum FilenamePattern {
    Regex(Regex),
    /// The value did not compile as a regex but looked like a shell glob.
    Glob(Regex),
    Invalid,
}

impl FilenamePattern {
    /// Compiles `raw` as a case-insensitive regex. If that fails and the
    /// value contains `*` or `?`, it is read as a glob instead.
    pub fn compile(raw: &str) -> Self {
        if let Ok(regex) = case_insensitive(raw) {
            return Self::Regex(regex);
        }

        if !raw.contains(['*', '?']) {
            return Self::Invalid;
        }

        match case_insensitive(&glob_to_regex(raw)) {
            Ok(regex) => Self::Glob(regex),
            Err(_) => Self::Invalid,
        }
    }

    pub fn is_match(&self, filename: &str) -> bool {
        match self {
            Self::Regex(regex) | Self::Glob(regex) => regex.is_match(filename),
            Self::Invalid => false,
        }
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Escapes every metacharacter, then turns `*` into `.*` and `?` into `.`.
/// The result is unanchored, like the regex form.
pub fn glob_to_regex(glob: &str) -> String {
    regex::escape(glob).replace(r"\*", ".*").replace(r"\?", ".")
}

/// `filename_regex`: matches the item's basename.
pub struct FilenameRegexMatcher {
    patterns: Cache<String, FilenamePattern>,
}

impl FilenameRegexMatcher {
    pub fn new() -> Self {
        Self {
            patterns: Cache::new(PATTERN_CACHE_CAPACITY),
        }
    }

    fn pattern(&self, raw: &str) -> FilenamePattern {
        self.patterns
            .get_with(raw.to_string(), || FilenamePattern::compile(raw))
    }
}

impl Default for FilenameRegexMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionMatcher for FilenameRegexMatcher {
    fn condition_type(&self) -> &str {
        "filename_regex"
    }

    fn matches(&self, item: &MediaItem, condition: &Condition) -> bool {
        let Some(value) = condition.text_value() else {
            return false;
        };
        let Some(filename) = item.metadata.basename() else {
            return false;
        };

        let raw = value.trim();
        if raw.is_empty() {
            return false;
        }

        self.pattern(raw).is_match(filename)
    }
}
