use crate::config::schema::Rule;
use crate::error::StoreError;

use super::{sort_by_priority, RuleSource};

/// A fixed rule set, e.g. the `rules` section of a config file.
#[derive(Debug, Clone, Default)]
pub struct StaticRules {
    rules: Vec<Rule>,
}

impl StaticRules {
    pub fn new(mut rules: Vec<Rule>) -> Self {
        sort_by_priority(&mut rules);
        Self { rules }
    }
}

impl RuleSource for StaticRules {
    fn get_all(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.rules.clone())
    }
}
