use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::conditions::exif::parse_date;
use crate::config::schema::{Condition, Config, Rule};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

const SUPPORTED_VERSION: &str = "1.0";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Returns the canonical database path: `~/.mediafold/data/mediafold.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mediafold").join("data").join("mediafold.db"))
}

/// The configured database path, falling back to the per-user default.
pub fn resolve_database_path(config: &Config) -> Option<PathBuf> {
    config
        .database_path
        .as_ref()
        .map(PathBuf::from)
        .or_else(default_database_path)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let mut rule_ids = HashSet::new();
    for rule in &config.rules {
        if !rule_ids.insert(&rule.id) {
            return Err(ConfigError::InvalidRule {
                id: rule.id.clone(),
                reason: "Duplicate rule ID".to_string(),
            });
        }

        validate_rule(rule)?;
    }

    Ok(())
}

fn validate_rule(rule: &Rule) -> Result<(), ConfigError> {
    if rule.name.trim().is_empty() {
        return Err(ConfigError::InvalidRule {
            id: rule.id.clone(),
            reason: "Rule name must not be empty".to_string(),
        });
    }

    if let Some(index) = first_invalid_range(&rule.conditions) {
        return Err(ConfigError::InvalidRule {
            id: rule.id.clone(),
            reason: format!(
                "Condition {} ({}): value_end must be greater than value for 'between'",
                index, rule.conditions[index].condition_type
            ),
        });
    }

    Ok(())
}

/// Index of the first `between` condition whose range is empty or inverted.
/// Date ranges are compared as instants; a side that does not parse leaves
/// the range alone.
pub(crate) fn first_invalid_range(conditions: &[Condition]) -> Option<usize> {
    conditions.iter().position(|condition| {
        if condition.operator.as_deref() != Some("between") {
            return false;
        }
        let (Some(start), Some(end)) = (&condition.value, &condition.value_end) else {
            return true;
        };
        match condition.condition_type.as_str() {
            "dimensions" | "file_size" => end.as_uint() <= start.as_uint(),
            "exif_date" => match (parse_date(&start.as_text()), parse_date(&end.as_text())) {
                (Some(start), Some(end)) => end <= start,
                _ => false,
            },
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/tmp/mediafold.db",
            "preview": { "limit": 25, "max_scan": 1000 },
            "rules": [
                {
                    "id": "rule_photos",
                    "name": "Photos",
                    "folder_id": 3,
                    "priority": 1,
                    "enabled": true,
                    "conditions": [{ "type": "mime_type", "value": "image/*" }]
                }
            ]
        }"#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.preview.limit, 25);
        assert_eq!(config.preview.max_scan, 1000);
        assert!(config.upload.skip_if_assigned);
        assert_eq!(
            resolve_database_path(&config),
            Some(PathBuf::from("/tmp/mediafold.db"))
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert!(config.rules.is_empty());
        assert_eq!(config.preview.limit, 50);
        assert_eq!(config.preview.max_scan, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unsupported_version() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_missing_version_fails_schema() {
        let err = load_config_from_str(r#"{ "rules": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_rule_without_type_fails_schema() {
        let config_json = r#"
        {
            "version": "1.0",
            "rules": [
                { "id": "r1", "name": "Broken", "conditions": [{ "value": "x" }] }
            ]
        }"#;
        let err = load_config_from_str(config_json).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_duplicate_rule_ids() {
        let config_json = r#"
        {
            "version": "1.0",
            "rules": [
                { "id": "dup", "name": "One", "conditions": [] },
                { "id": "dup", "name": "Two", "conditions": [] }
            ]
        }"#;
        let err = load_config_from_str(config_json).unwrap_err();
        match err {
            ConfigError::InvalidRule { id, reason } => {
                assert_eq!(id, "dup");
                assert!(reason.contains("Duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inverted_between_range_rejected() {
        let config_json = r#"
        {
            "version": "1.0",
            "rules": [
                {
                    "id": "sizes",
                    "name": "Mid size",
                    "conditions": [
                        { "type": "file_size", "operator": "between", "value": 5120, "value_end": 2048 }
                    ]
                }
            ]
        }"#;
        let err = load_config_from_str(config_json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { .. }));
    }

    #[test]
    fn test_first_invalid_range() {
        let conditions = vec![
            Condition::new("dimensions")
                .with_operator("between")
                .with_value(100)
                .with_value_end(200),
            Condition::new("exif_date")
                .with_operator("between")
                .with_value("2024-06-01")
                .with_value_end("2024-01-01"),
        ];
        assert_eq!(first_invalid_range(&conditions), Some(1));
        assert_eq!(first_invalid_range(&conditions[..1]), None);
    }

    #[test]
    fn test_date_ranges_compare_as_instants() {
        let range = |start: &str, end: &str| {
            vec![Condition::new("exif_date")
                .with_operator("between")
                .with_value(start)
                .with_value_end(end)]
        };

        // Mixed formats, chronologically ordered.
        assert_eq!(first_invalid_range(&range("@1700000000", "2024-01-01")), None);
        assert_eq!(first_invalid_range(&range("2023-12", "2024/01/01")), None);
        // Mixed formats, inverted.
        assert_eq!(first_invalid_range(&range("2024-06-01", "2024/01/01")), Some(0));
        assert_eq!(first_invalid_range(&range("2024-01-01", "2024-01-01")), Some(0));
        // Unparseable sides are left to the matcher.
        assert_eq!(first_invalid_range(&range("someday", "2024-01-01")), None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/mediafold.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with("mediafold.db"));
        assert!(path.to_string_lossy().contains(".mediafold"));
    }
}
