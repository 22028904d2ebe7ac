use serde::{Deserialize, Serialize};

use crate::config::schema::{AttachmentId, FolderId, Rule};

/// Shown when a matched rule points at a folder that no longer exists.
pub const UNKNOWN_FOLDER_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: String,
    pub name: String,
}

impl From<&Rule> for RuleSummary {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub id: FolderId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    WillAssign,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewItem {
    pub attachment_id: AttachmentId,
    pub title: String,
    pub filename: String,
    pub thumbnail: Option<String>,
    pub matched_rule: Option<RuleSummary>,
    pub target_folder: Option<FolderSummary>,
    pub status: PreviewStatus,
}

/// One preview page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// Items scanned by this call.
    pub total: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub items: Vec<PreviewItem>,
    /// Unscanned items remain; the next page starts at `offset + items.len()`.
    pub has_more: bool,
}

impl PreviewResponse {
    pub fn next_offset(&self, offset: u64) -> u64 {
        offset.saturating_add(self.items.len() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Assigned,
    Skipped,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyItem {
    pub attachment_id: AttachmentId,
    pub status: ApplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApplyItem {
    pub(crate) fn assigned(
        attachment_id: AttachmentId,
        folder_id: FolderId,
        folder_name: String,
        rule: &Rule,
    ) -> Self {
        Self {
            attachment_id,
            status: ApplyStatus::Assigned,
            folder_id: Some(folder_id),
            folder_name: Some(folder_name),
            rule_id: Some(rule.id.clone()),
            rule_name: Some(rule.name.clone()),
            message: None,
        }
    }

    pub(crate) fn skipped(attachment_id: AttachmentId) -> Self {
        Self::with_message(attachment_id, ApplyStatus::Skipped, "No matching rule")
    }

    pub(crate) fn error(attachment_id: AttachmentId, message: impl Into<String>) -> Self {
        Self::with_message(attachment_id, ApplyStatus::Error, message)
    }

    fn with_message(
        attachment_id: AttachmentId,
        status: ApplyStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            attachment_id,
            status,
            folder_id: None,
            folder_name: None,
            rule_id: None,
            rule_name: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub total: u64,
    pub assigned: u64,
    pub skipped: u64,
    pub errors: u64,
    pub items: Vec<ApplyItem>,
}

impl ApplyResponse {
    pub(crate) fn record(&mut self, item: ApplyItem) {
        match item.status {
            ApplyStatus::Assigned => self.assigned += 1,
            ApplyStatus::Skipped => self.skipped += 1,
            ApplyStatus::Error => self.errors += 1,
        }
        self.items.push(item);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total: u64,
    pub assigned: u64,
    pub unassigned: u64,
    pub folders: u64,
    pub rules: u64,
    pub rules_enabled: u64,
}
