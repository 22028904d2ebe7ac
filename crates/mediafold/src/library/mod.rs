//! Collaborator contracts the engine runs against.
//!
//! The evaluator and batch processor never reach for storage directly; they
//! are handed implementations of these traits. `crate::db` provides the
//! SQLite-backed ones and [`StaticRules`] serves rules loaded from config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::schema::{AttachmentId, FolderId, Rule};
use crate::error::StoreError;

pub mod static_rules;

pub use static_rules::StaticRules;

/// EXIF/IPTC fields extracted from the file at upload time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default)]
    pub camera: Option<String>,
    /// Capture time as UTC epoch seconds.
    #[serde(default)]
    pub created_timestamp: Option<i64>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Everything a condition may inspect about one library item.
/// Missing fields mean the corresponding condition cannot match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Size in bytes.
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Stored file name or path; matchers look at its basename.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image_meta: ImageMeta,
}

impl AttachmentMetadata {
    /// Basename of the stored filename.
    pub fn basename(&self) -> Option<&str> {
        let filename = self.filename.as_deref()?;
        Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
    }
}

/// An item under evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: AttachmentId,
    pub metadata: AttachmentMetadata,
}

impl MediaItem {
    pub fn new(id: AttachmentId, metadata: AttachmentMetadata) -> Self {
        Self { id, metadata }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// Selects which library items a batch pass walks over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentFilter {
    /// Only items that carry no folder yet.
    pub unassigned_only: bool,
    /// Exact mime type, a bare top-level type (`image`) or `type/*`.
    pub mime_type: Option<String>,
    /// Restrict to these ids.
    pub ids: Option<Vec<AttachmentId>>,
}

/// Raw counts behind the library statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryCounts {
    pub total: u64,
    pub assigned: u64,
    pub folders: u64,
}

/// Ordered source of rule records.
pub trait RuleSource: Send + Sync {
    /// All rules, ascending by priority.
    fn get_all(&self) -> Result<Vec<Rule>, StoreError>;

    /// Enabled rules, ascending by priority with ties in insertion order.
    fn get_enabled(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|rule| rule.enabled)
            .collect())
    }

    fn get(&self, id: &str) -> Result<Option<Rule>, StoreError> {
        Ok(self.get_all()?.into_iter().find(|rule| rule.id == id))
    }
}

pub trait MetadataProvider: Send + Sync {
    /// Metadata for an item, or `None` when the item is unknown.
    fn metadata(&self, id: AttachmentId) -> Result<Option<AttachmentMetadata>, StoreError>;
}

/// Applies folder assignments.
pub trait FolderSink: Send + Sync {
    fn folder(&self, id: FolderId) -> Result<Option<Folder>, StoreError>;

    /// Folders the item currently belongs to.
    fn folders_of(&self, item: AttachmentId) -> Result<Vec<FolderId>, StoreError>;

    /// Puts the item in exactly this folder. Returns `false` without touching
    /// the item when the folder does not exist. Repeating the call is a no-op.
    fn assign(&self, item: AttachmentId, folder: FolderId) -> Result<bool, StoreError>;
}

/// Lists library items for batch passes.
pub trait MediaCatalog: Send + Sync {
    /// Ids matching `filter` in ascending id order, skipping `offset` and
    /// returning at most `limit` when given.
    fn query(
        &self,
        filter: &AttachmentFilter,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<AttachmentId>, StoreError>;

    fn counts(&self) -> Result<LibraryCounts, StoreError>;
}

/// Stable sort by ascending priority.
pub fn sort_by_priority(rules: &mut [Rule]) {
    rules.sort_by_key(|rule| rule.priority);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        let metadata = AttachmentMetadata {
            filename: Some("2024/05/IMG_1234.jpg".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.basename(), Some("IMG_1234.jpg"));
    }

    #[test]
    fn test_basename_missing() {
        assert_eq!(AttachmentMetadata::default().basename(), None);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let rule = |id: &str, priority: i64| Rule {
            id: id.to_string(),
            name: id.to_string(),
            conditions: vec![],
            folder_id: 1,
            priority,
            stop_processing: true,
            enabled: true,
        };
        let mut rules = vec![rule("b", 5), rule("a", 1), rule("c", 5), rule("d", 1)];
        sort_by_priority(&mut rules);

        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "b", "c"]);
    }
}
