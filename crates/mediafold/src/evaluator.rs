//! First-match rule evaluation and the upload boundary.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::conditions::{ConditionMatcher, MatcherRegistry};
use crate::config::schema::{AttachmentId, FolderId, Rule};
use crate::error::StoreError;
use crate::library::{sort_by_priority, FolderSink, MediaItem, RuleSource};

/// The rule that claimed an item and the folder it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub folder_id: FolderId,
    pub rule: Rule,
}

impl MatchResult {
    fn from_rule(rule: &Rule) -> Self {
        Self {
            folder_id: rule.folder_id,
            rule: rule.clone(),
        }
    }
}

/// Why metadata for an item is being (re)generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadContext {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Only fresh uploads are classified.
    NotNewUpload,
    /// The item already had folders and the skip policy said to keep them.
    AlreadyAssigned(Vec<FolderId>),
    NoMatch,
    Assigned(MatchResult),
    /// A rule matched but the folder could not be applied.
    AssignFailed(MatchResult),
}

/// Sent to listeners after a rule-driven assignment.
#[derive(Debug, Clone, Copy)]
pub struct FolderAssignment<'a> {
    pub attachment_id: AttachmentId,
    pub folder_id: FolderId,
    pub rule: &'a Rule,
}

/// Decides whether an upload that already has folders should be left alone.
/// Receives the item id and its current folder ids.
pub type SkipIfAssignedHook = Arc<dyn Fn(AttachmentId, &[FolderId]) -> bool + Send + Sync>;

pub type AssignmentListener = Arc<dyn Fn(&FolderAssignment<'_>) + Send + Sync>;

/// Evaluates rules against items.
///
/// Holds only the matcher registry and its collaborators; every call reads
/// the rule set afresh. Custom matchers are registered while building, before
/// the evaluator is shared.
pub struct RuleEvaluator {
    rules: Arc<dyn RuleSource>,
    sink: Arc<dyn FolderSink>,
    matchers: MatcherRegistry,
    skip_if_assigned: SkipIfAssignedHook,
    listeners: Vec<AssignmentListener>,
}

impl RuleEvaluator {
    pub fn new(rules: Arc<dyn RuleSource>, sink: Arc<dyn FolderSink>) -> Self {
        Self {
            rules,
            sink,
            matchers: MatcherRegistry::with_builtin(),
            skip_if_assigned: Arc::new(|_: AttachmentId, _: &[FolderId]| true),
            listeners: Vec::new(),
        }
    }

    /// Adds a matcher for a new condition type, or replaces a built-in one.
    pub fn with_matcher<M: ConditionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matchers.register(matcher);
        self
    }

    pub fn with_skip_if_assigned(mut self, skip: bool) -> Self {
        self.skip_if_assigned = Arc::new(move |_: AttachmentId, _: &[FolderId]| skip);
        self
    }

    pub fn with_skip_if_assigned_hook(mut self, hook: SkipIfAssignedHook) -> Self {
        self.skip_if_assigned = hook;
        self
    }

    pub fn with_assignment_listener(mut self, listener: AssignmentListener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn matchers(&self) -> &MatcherRegistry {
        &self.matchers
    }

    pub fn rule_source(&self) -> &Arc<dyn RuleSource> {
        &self.rules
    }

    pub fn folder_sink(&self) -> &Arc<dyn FolderSink> {
        &self.sink
    }

    /// Reads the rules one evaluation pass works on.
    ///
    /// With `rule_id`, only that rule (enabled or not); an unknown id yields
    /// an empty set. Otherwise every enabled rule, ascending by priority.
    pub fn load_rules(&self, rule_id: Option<&str>) -> Result<Vec<Rule>, StoreError> {
        let mut rules = match rule_id {
            Some(id) => self.rules.get(id)?.into_iter().collect(),
            None => self.rules.get_enabled()?,
        };
        sort_by_priority(&mut rules);

        for rule in &rules {
            for condition in &rule.conditions {
                if !self.matchers.contains(&condition.condition_type) {
                    warn!(
                        rule_id = %rule.id,
                        condition_type = %condition.condition_type,
                        "Unknown condition type is ignored; the rule will not filter on it"
                    );
                }
            }
        }

        Ok(rules)
    }

    /// Returns the first rule that matches `item`, if any.
    pub fn evaluate(
        &self,
        item: &MediaItem,
        rule_id: Option<&str>,
    ) -> Result<Option<MatchResult>, StoreError> {
        let rules = self.load_rules(rule_id)?;
        Ok(self.first_match(&rules, item))
    }

    /// First match over an already loaded, already ordered rule set. Later
    /// rules are not looked at once one matches.
    pub fn first_match(&self, rules: &[Rule], item: &MediaItem) -> Option<MatchResult> {
        let result = rules
            .iter()
            .find(|rule| self.rule_matches(rule, item))
            .map(MatchResult::from_rule);

        match &result {
            Some(m) => debug!(
                attachment_id = item.id,
                rule_id = %m.rule.id,
                folder_id = m.folder_id,
                "Rule matched"
            ),
            None => trace!(attachment_id = item.id, "No rule matched"),
        }

        result
    }

    /// All conditions must hold. A rule without conditions never matches;
    /// a condition of an unregistered type is skipped.
    pub fn rule_matches(&self, rule: &Rule, item: &MediaItem) -> bool {
        if rule.conditions.is_empty() {
            return false;
        }

        rule.conditions
            .iter()
            .all(|condition| match self.matchers.get(&condition.condition_type) {
                Some(matcher) => matcher.matches(item, condition),
                None => {
                    trace!(
                        rule_id = %rule.id,
                        condition_type = %condition.condition_type,
                        "Skipping unknown condition"
                    );
                    true
                }
            })
    }

    /// Classifies a freshly uploaded item.
    pub fn evaluate_on_upload(
        &self,
        item: &MediaItem,
        context: UploadContext,
    ) -> Result<UploadOutcome, StoreError> {
        if context != UploadContext::Create {
            return Ok(UploadOutcome::NotNewUpload);
        }

        let existing = self.sink.folders_of(item.id)?;
        if !existing.is_empty() && (self.skip_if_assigned)(item.id, &existing) {
            debug!(attachment_id = item.id, ?existing, "Upload already filed, skipping rules");
            return Ok(UploadOutcome::AlreadyAssigned(existing));
        }

        let Some(result) = self.evaluate(item, None)? else {
            return Ok(UploadOutcome::NoMatch);
        };
        if result.folder_id == 0 {
            return Ok(UploadOutcome::NoMatch);
        }

        if self.assign_folder(item.id, result.folder_id, &result.rule)? {
            Ok(UploadOutcome::Assigned(result))
        } else {
            Ok(UploadOutcome::AssignFailed(result))
        }
    }

    /// Files the item into `folder_id` on behalf of `rule`.
    ///
    /// Returns `false` when the folder no longer exists; the item keeps
    /// whatever it had.
    pub fn assign_folder(
        &self,
        attachment_id: AttachmentId,
        folder_id: FolderId,
        rule: &Rule,
    ) -> Result<bool, StoreError> {
        if self.sink.folder(folder_id)?.is_none() {
            warn!(attachment_id, folder_id, rule_id = %rule.id, "Target folder does not exist");
            return Ok(false);
        }

        if !self.sink.assign(attachment_id, folder_id)? {
            warn!(attachment_id, folder_id, rule_id = %rule.id, "Folder assignment refused");
            return Ok(false);
        }

        info!(attachment_id, folder_id, rule_id = %rule.id, "Assigned folder");

        let assignment = FolderAssignment {
            attachment_id,
            folder_id,
            rule,
        };
        for listener in &self.listeners {
            listener(&assignment);
        }

        Ok(true)
    }
}

impl std::fmt::Debug for RuleEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEvaluator")
            .field("matchers", &self.matchers)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
