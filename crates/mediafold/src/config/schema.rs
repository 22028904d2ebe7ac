use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a media library item.
pub type AttachmentId = i64;

/// Identifier of a destination folder.
pub type FolderId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub preview: PreviewDefaults,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Defaults applied to preview requests that leave a field unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewDefaults {
    #[serde(default = "default_preview_limit")]
    pub limit: u32,
    #[serde(default = "default_max_scan")]
    pub max_scan: u32,
    #[serde(default)]
    pub target_matches: Option<u32>,
}

fn default_preview_limit() -> u32 {
    50
}

fn default_max_scan() -> u32 {
    500
}

impl Default for PreviewDefaults {
    fn default() -> Self {
        Self {
            limit: default_preview_limit(),
            max_scan: default_max_scan(),
            target_matches: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Leave items alone on upload when another component already filed them.
    #[serde(default = "default_true")]
    pub skip_if_assigned: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            skip_if_assigned: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub folder_id: FolderId,
    #[serde(default = "default_priority")]
    pub priority: i64,
    /// Stored and round-tripped, but evaluation stops at the first match
    /// whatever its value.
    #[serde(default)]
    pub stop_processing: bool,
    #[serde(default)]
    pub enabled: bool,
}

fn default_priority() -> i64 {
    10
}

/// One typed clause of a rule.
///
/// Every parameter is optional so that malformed records still load; the
/// matcher for `condition_type` decides what it needs and fails closed when a
/// parameter is missing. Unknown fields are kept in `extra` for custom
/// matchers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_end: Option<ConditionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Condition {
    pub fn new(condition_type: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<ConditionValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_value_end(mut self, value_end: impl Into<ConditionValue>) -> Self {
        self.value_end = Some(value_end.into());
        self
    }

    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    pub fn with_dimension(mut self, dimension: &str) -> Self {
        self.dimension = Some(dimension.to_string());
        self
    }

    /// The operator, or `default` when none was stored.
    pub fn operator_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.operator.as_deref().unwrap_or(default)
    }

    /// The value as text, if present and non-empty.
    pub fn text_value(&self) -> Option<String> {
        self.value
            .as_ref()
            .filter(|v| !v.is_empty())
            .map(ConditionValue::as_text)
    }
}

/// A parameter value as it comes out of storage: rule records written by
/// different clients hold either strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl ConditionValue {
    /// Coerces to a non-negative integer: numbers are made absolute, strings
    /// are parsed from their leading digits, anything else is 0.
    pub fn as_uint(&self) -> u64 {
        match self {
            Self::Int(n) => n.unsigned_abs(),
            Self::Float(f) => f.abs().trunc() as u64,
            Self::Text(s) => leading_integer(s.trim()),
            Self::Bool(b) => u64::from(*b),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => if *b { "1" } else { "" }.to_string(),
        }
    }

    /// Empty in the loose sense stored records use: blank text, zero, false.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Int(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(s) => s.is_empty() || s == "0",
            Self::Bool(b) => !b,
        }
    }
}

fn leading_integer(s: &str) -> u64 {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let digits: String = unsigned.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConditionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
