//! Rule repository: the rule collection kept as one JSON document in the
//! `options` table.
//!
//! Every write is a read-modify-write of the whole collection inside a
//! single transaction, so concurrent writers never interleave.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use uuid::Uuid;

use super::{Database, DatabaseError};
use crate::config::loader::first_invalid_range;
use crate::config::schema::{Condition, ConditionValue, FolderId, Rule};
use crate::error::{RuleError, StoreError};
use crate::library::{sort_by_priority, RuleSource};

const RULES_OPTION: &str = "rules";
const DEFAULT_PRIORITY: i64 = 10;

/// Caller-supplied fields for creating or replacing a rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub folder_id: FolderId,
    /// `None` on create appends after existing rules; on update keeps the
    /// current priority.
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub stop_processing: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// SQLite-backed rule store.
#[derive(Clone)]
pub struct RuleRepository {
    db: Database,
}

impl RuleRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All rules in evaluation order.
    pub fn list(&self) -> Result<Vec<Rule>, DatabaseError> {
        self.db.with_conn(read_rules)
    }

    /// Creates a rule with a fresh `rule_xxxxxxxx` id.
    pub fn create(&self, draft: RuleDraft) -> Result<Rule, RuleError> {
        let priority = draft.priority;
        let mut rule = prepare_rule(draft, String::new())?;

        self.db.with_transaction(|conn| {
            let mut rules = read_rules(conn)?;
            rule.id = generate_id(&rules);
            if priority.is_none() {
                rule.priority = rules.len() as i64 + 1;
            }
            rules.push(rule.clone());
            write_rules(conn, rules)?;
            Ok::<_, RuleError>(())
        })?;

        log::info!("Created rule '{}' ({})", rule.name, rule.id);
        Ok(rule)
    }

    /// Replaces every field of an existing rule except its id.
    pub fn update(&self, id: &str, draft: RuleDraft) -> Result<Rule, RuleError> {
        let priority = draft.priority;
        let mut prepared = prepare_rule(draft, id.to_string())?;

        self.db.with_transaction(|conn| {
            let mut rules = read_rules(conn)?;
            let existing = rules
                .iter_mut()
                .find(|rule| rule.id == id)
                .ok_or_else(|| RuleError::NotFound(id.to_string()))?;
            if priority.is_none() {
                prepared.priority = existing.priority;
            }
            *existing = prepared.clone();
            write_rules(conn, rules)?;
            Ok::<_, RuleError>(())
        })?;

        log::info!("Updated rule '{}' ({})", prepared.name, prepared.id);
        Ok(prepared)
    }

    pub fn delete(&self, id: &str) -> Result<(), RuleError> {
        self.db.with_transaction(|conn| {
            let mut rules = read_rules(conn)?;
            let before = rules.len();
            rules.retain(|rule| rule.id != id);
            if rules.len() == before {
                return Err(RuleError::NotFound(id.to_string()));
            }
            write_rules(conn, rules)?;
            Ok(())
        })?;

        log::info!("Deleted rule {}", id);
        Ok(())
    }

    /// Renumbers priorities: listed ids get 1..n in the given order, unknown
    /// ids are ignored and unlisted rules follow in their current order.
    pub fn reorder(&self, order: &[String]) -> Result<Vec<Rule>, RuleError> {
        self.db.with_transaction(|conn| {
            let mut remaining = read_rules(conn)?;
            let mut reordered = Vec::with_capacity(remaining.len());

            for id in order {
                if let Some(pos) = remaining.iter().position(|rule| &rule.id == id) {
                    reordered.push(remaining.remove(pos));
                }
            }
            reordered.append(&mut remaining);

            for (index, rule) in reordered.iter_mut().enumerate() {
                rule.priority = index as i64 + 1;
            }

            write_rules(conn, reordered.clone())?;
            Ok(reordered)
        })
    }

    /// Stores `rules` as the initial collection when the store holds none.
    /// Returns how many rules were written.
    pub fn seed_rules(&self, rules: &[Rule]) -> Result<usize, RuleError> {
        let mut prepared = Vec::with_capacity(rules.len());
        for rule in rules {
            let draft = RuleDraft {
                name: rule.name.clone(),
                conditions: rule.conditions.clone(),
                folder_id: rule.folder_id,
                priority: Some(rule.priority),
                stop_processing: rule.stop_processing,
                enabled: rule.enabled,
            };
            prepared.push(prepare_rule(draft, rule.id.clone())?);
        }

        let seeded = self.db.with_transaction(|conn| {
            if !read_rules(conn)?.is_empty() {
                return Ok::<_, RuleError>(0);
            }
            let count = prepared.len();
            write_rules(conn, prepared)?;
            Ok(count)
        })?;

        if seeded > 0 {
            log::info!("Seeded rule store with {} rules", seeded);
        }
        Ok(seeded)
    }
}

impl RuleSource for RuleRepository {
    fn get_all(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.list()?)
    }
}

fn read_rules(conn: &Connection) -> Result<Vec<Rule>, DatabaseError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM options WHERE name = ?1",
            params![RULES_OPTION],
            |r| r.get(0),
        )
        .optional()?;

    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut rules: Vec<Rule> = match serde_json::from_str(&raw) {
        Ok(rules) => rules,
        Err(e) => {
            log::warn!("Stored rules are unreadable, treating as empty: {}", e);
            return Ok(Vec::new());
        }
    };
    sort_by_priority(&mut rules);
    Ok(rules)
}

fn write_rules(conn: &Connection, mut rules: Vec<Rule>) -> Result<(), DatabaseError> {
    sort_by_priority(&mut rules);
    let json = serde_json::to_string(&rules)?;
    conn.execute(
        "INSERT INTO options (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        params![RULES_OPTION, json],
    )?;
    Ok(())
}

/// Normalises a draft into a stored rule.
fn prepare_rule(draft: RuleDraft, id: String) -> Result<Rule, RuleError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(RuleError::EmptyName);
    }

    let conditions = sanitize_conditions(draft.conditions);
    if let Some(index) = first_invalid_range(&conditions) {
        return Err(RuleError::InvalidRange {
            index,
            condition_type: conditions[index].condition_type.clone(),
        });
    }

    Ok(Rule {
        id,
        name,
        conditions,
        folder_id: draft.folder_id.abs(),
        priority: draft.priority.map(i64::abs).unwrap_or(DEFAULT_PRIORITY),
        stop_processing: draft.stop_processing,
        enabled: draft.enabled,
    })
}

/// Drops conditions without a type and normalises parameters per type.
/// Extra fields are kept for custom matchers.
pub fn sanitize_conditions(conditions: Vec<Condition>) -> Vec<Condition> {
    conditions
        .into_iter()
        .filter_map(|mut condition| {
            let condition_type = condition.condition_type.trim().to_lowercase();
            if condition_type.is_empty() {
                return None;
            }

            match condition_type.as_str() {
                "dimensions" | "file_size" => {
                    condition.operator = Some(normalized_key(condition.operator, "gt"));
                    if condition_type == "dimensions" {
                        condition.dimension = Some(normalized_key(condition.dimension, "width"));
                    }
                    condition.value = Some(to_uint(condition.value));
                    condition.value_end = Some(to_uint(condition.value_end));
                }
                "exif_date" => {
                    condition.operator = Some(normalized_key(condition.operator, "after"));
                    condition.value = Some(to_trimmed_text(condition.value));
                    condition.value_end = Some(to_trimmed_text(condition.value_end));
                }
                "author" => {
                    condition.value = Some(to_uint(condition.value));
                }
                _ => {
                    condition.value = Some(to_trimmed_text(condition.value));
                }
            }

            condition.condition_type = condition_type;
            Some(condition)
        })
        .collect()
}

fn normalized_key(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn to_uint(value: Option<ConditionValue>) -> ConditionValue {
    let n = value.map(|v| v.as_uint()).unwrap_or(0);
    ConditionValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn to_trimmed_text(value: Option<ConditionValue>) -> ConditionValue {
    let text = value.map(|v| v.as_text()).unwrap_or_default();
    ConditionValue::Text(text.trim().to_string())
}

fn generate_id(existing: &[Rule]) -> String {
    loop {
        let simple = Uuid::new_v4().simple().to_string();
        let id = format!("rule_{}", &simple[..8]);
        if !existing.iter().any(|rule| rule.id == id) {
            return id;
        }
    }
}
