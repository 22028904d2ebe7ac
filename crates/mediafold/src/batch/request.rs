use serde::{Deserialize, Serialize};

use crate::config::schema::{AttachmentId, PreviewDefaults};
use crate::library::AttachmentFilter;

pub const LIMIT_RANGE: (u32, u32) = (1, 200);
pub const MAX_SCAN_RANGE: (u32, u32) = (50, 5000);
pub const TARGET_MATCHES_RANGE: (u32, u32) = (1, 200);

fn default_true() -> bool {
    true
}

fn default_limit() -> u32 {
    50
}

fn default_max_scan() -> u32 {
    500
}

/// Arguments for one preview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    #[serde(default = "default_true")]
    pub unassigned_only: bool,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
    /// Keep scanning until this many items matched (bounded by `max_scan`).
    #[serde(default)]
    pub target_matches: Option<u32>,
    #[serde(default = "default_max_scan")]
    pub max_scan: u32,
    /// Preview a single rule, whether or not it is enabled.
    #[serde(default)]
    pub rule_id: Option<String>,
}

impl Default for PreviewRequest {
    fn default() -> Self {
        Self {
            unassigned_only: true,
            mime_type: None,
            limit: default_limit(),
            offset: 0,
            target_matches: None,
            max_scan: default_max_scan(),
            rule_id: None,
        }
    }
}

impl PreviewRequest {
    /// A request seeded from configured preview defaults.
    pub fn from_defaults(defaults: &PreviewDefaults) -> Self {
        Self {
            limit: defaults.limit,
            max_scan: defaults.max_scan,
            target_matches: defaults.target_matches,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Copy with every numeric bound clamped into its allowed range.
    pub fn clamped(&self) -> Self {
        Self {
            limit: clamp(self.limit, LIMIT_RANGE),
            max_scan: clamp(self.max_scan, MAX_SCAN_RANGE),
            target_matches: self.target_matches.map(|t| clamp(t, TARGET_MATCHES_RANGE)),
            mime_type: non_blank(&self.mime_type),
            rule_id: non_blank(&self.rule_id),
            ..self.clone()
        }
    }

    pub fn filter(&self) -> AttachmentFilter {
        AttachmentFilter {
            unassigned_only: self.unassigned_only,
            mime_type: non_blank(&self.mime_type),
            ids: None,
        }
    }
}

/// Arguments for an apply pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    #[serde(default = "default_true")]
    pub unassigned_only: bool,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// When non-empty, exactly these items are processed regardless of
    /// whether they already carry a folder.
    #[serde(default)]
    pub attachment_ids: Option<Vec<AttachmentId>>,
}

impl Default for ApplyRequest {
    fn default() -> Self {
        Self {
            unassigned_only: true,
            mime_type: None,
            attachment_ids: None,
        }
    }
}

impl ApplyRequest {
    pub fn for_items(ids: Vec<AttachmentId>) -> Self {
        Self {
            attachment_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn filter(&self) -> AttachmentFilter {
        match self.attachment_ids.as_ref().filter(|ids| !ids.is_empty()) {
            Some(ids) => AttachmentFilter {
                unassigned_only: false,
                mime_type: non_blank(&self.mime_type),
                ids: Some(ids.clone()),
            },
            None => AttachmentFilter {
                unassigned_only: self.unassigned_only,
                mime_type: non_blank(&self.mime_type),
                ids: None,
            },
        }
    }
}

fn clamp(value: u32, (min, max): (u32, u32)) -> u32 {
    value.clamp(min, max)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
