use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::config::schema::{AttachmentId, Rule};
use crate::error::StoreError;
use crate::evaluator::{MatchResult, RuleEvaluator};
use crate::library::{AttachmentMetadata, MediaCatalog, MediaItem, MetadataProvider};

use super::request::{ApplyRequest, PreviewRequest};
use super::response::{
    ApplyItem, ApplyResponse, FolderSummary, LibraryStats, PreviewItem, PreviewResponse,
    PreviewStatus, RuleSummary, UNKNOWN_FOLDER_NAME,
};

/// Runs the evaluator across the library, either as a read-only preview or
/// as an apply pass that commits assignments.
pub struct BatchProcessor {
    evaluator: Arc<RuleEvaluator>,
    metadata: Arc<dyn MetadataProvider>,
    catalog: Arc<dyn MediaCatalog>,
}

impl BatchProcessor {
    pub fn new(
        evaluator: Arc<RuleEvaluator>,
        metadata: Arc<dyn MetadataProvider>,
        catalog: Arc<dyn MediaCatalog>,
    ) -> Self {
        Self {
            evaluator,
            metadata,
            catalog,
        }
    }

    pub fn evaluator(&self) -> &Arc<RuleEvaluator> {
        &self.evaluator
    }

    /// Scans one page without changing anything.
    ///
    /// Without `target_matches` the page is `limit` items. With it, pages of
    /// `limit` are fetched until that many items matched. No call looks at
    /// more than `max_scan` items; every scanned item is returned.
    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, StoreError> {
        let request = request.clamped();
        let _span = info_span!(
            "batch.preview",
            offset = request.offset,
            limit = request.limit,
            target_matches = ?request.target_matches,
            rule_id = ?request.rule_id,
        )
        .entered();

        let rules = self.evaluator.load_rules(request.rule_id.as_deref())?;
        let filter = request.filter();
        let page_size = u64::from(request.limit);
        // `max_scan` caps every call, with or without a match target.
        let max_scan = u64::from(request.max_scan);
        let budget = match request.target_matches {
            Some(_) => max_scan,
            None => page_size.min(max_scan),
        };
        let target = request.target_matches.map(u64::from);

        let mut response = PreviewResponse::default();
        'scan: loop {
            let want = (budget - response.total).min(page_size);
            // One extra id tells whether anything lies beyond this page.
            let page = self
                .catalog
                .query(
                    &filter,
                    request.offset.saturating_add(response.total),
                    Some(want + 1),
                )?;
            let exhausted = page.len() as u64 <= want;

            for id in page.into_iter().take(want as usize) {
                if target.is_some_and(|t| response.matched >= t) {
                    response.has_more = true;
                    break 'scan;
                }
                let item = self.preview_item(id, &rules);
                match item.status {
                    PreviewStatus::WillAssign => response.matched += 1,
                    PreviewStatus::NoMatch => response.unmatched += 1,
                }
                response.total += 1;
                response.items.push(item);
            }

            if exhausted {
                break;
            }
            if response.total >= budget || target.is_some_and(|t| response.matched >= t) {
                response.has_more = true;
                break;
            }
        }

        info!(
            scanned = response.total,
            matched = response.matched,
            has_more = response.has_more,
            "Preview page complete"
        );
        Ok(response)
    }

    fn preview_item(&self, id: AttachmentId, rules: &[Rule]) -> PreviewItem {
        let metadata = match self.metadata.metadata(id) {
            Ok(metadata) => metadata.unwrap_or_default(),
            Err(e) => {
                warn!(
                    attachment_id = id,
                    error = %e,
                    "Metadata unavailable, previewing without it"
                );
                AttachmentMetadata::default()
            }
        };
        let title = metadata.title.clone().unwrap_or_default();
        let filename = metadata.basename().unwrap_or_default().to_string();
        let thumbnail = metadata.thumbnail.clone();

        let item = MediaItem::new(id, metadata);
        let Some(MatchResult { folder_id, rule }) = self.evaluator.first_match(rules, &item) else {
            debug!(attachment_id = id, "Preview: no match");
            return PreviewItem {
                attachment_id: id,
                title,
                filename,
                thumbnail,
                matched_rule: None,
                target_folder: None,
                status: PreviewStatus::NoMatch,
            };
        };

        let folder_name = self
            .evaluator
            .folder_sink()
            .folder(folder_id)
            .ok()
            .flatten()
            .map(|folder| folder.name)
            .unwrap_or_else(|| UNKNOWN_FOLDER_NAME.to_string());

        debug!(attachment_id = id, rule_id = %rule.id, folder_id, "Preview: will assign");
        PreviewItem {
            attachment_id: id,
            title,
            filename,
            thumbnail,
            matched_rule: Some(RuleSummary::from(&rule)),
            target_folder: Some(FolderSummary {
                id: folder_id,
                name: folder_name,
            }),
            status: PreviewStatus::WillAssign,
        }
    }

    /// Evaluates and assigns every item the request selects. Per-item
    /// failures are tallied as errors and never stop the pass.
    pub fn apply(&self, request: &ApplyRequest) -> Result<ApplyResponse, StoreError> {
        let _span = info_span!(
            "batch.apply",
            unassigned_only = request.unassigned_only,
            mime_type = ?request.mime_type,
        )
        .entered();

        let rules = self.evaluator.load_rules(None)?;
        let ids = self.catalog.query(&request.filter(), 0, None)?;

        let mut response = ApplyResponse {
            total: ids.len() as u64,
            ..Default::default()
        };
        for id in ids {
            response.record(self.apply_one(id, &rules));
        }

        info!(
            total = response.total,
            assigned = response.assigned,
            skipped = response.skipped,
            errors = response.errors,
            "Apply pass complete"
        );
        Ok(response)
    }

    fn apply_one(&self, id: AttachmentId, rules: &[Rule]) -> ApplyItem {
        let metadata = match self.metadata.metadata(id) {
            Ok(metadata) => metadata.unwrap_or_default(),
            Err(e) => {
                warn!(attachment_id = id, error = %e, "Metadata unavailable");
                return ApplyItem::error(id, format!("Failed to read metadata: {e}"));
            }
        };

        let item = MediaItem::new(id, metadata);
        let Some(MatchResult { folder_id, rule }) = self.evaluator.first_match(rules, &item) else {
            return ApplyItem::skipped(id);
        };

        match self.evaluator.assign_folder(id, folder_id, &rule) {
            Ok(true) => {
                let folder_name = self
                    .evaluator
                    .folder_sink()
                    .folder(folder_id)
                    .ok()
                    .flatten()
                    .map(|folder| folder.name)
                    .unwrap_or_default();
                ApplyItem::assigned(id, folder_id, folder_name, &rule)
            }
            Ok(false) => ApplyItem::error(id, "Failed to assign folder"),
            Err(e) => {
                warn!(attachment_id = id, folder_id, error = %e, "Folder assignment failed");
                ApplyItem::error(id, format!("Failed to assign folder: {e}"))
            }
        }
    }

    pub fn get_stats(&self) -> Result<LibraryStats, StoreError> {
        let counts = self.catalog.counts()?;
        let rules = self.evaluator.rule_source().get_all()?;
        let rules_enabled = rules.iter().filter(|rule| rule.enabled).count() as u64;

        Ok(LibraryStats {
            total: counts.total,
            assigned: counts.assigned,
            unassigned: counts.total.saturating_sub(counts.assigned),
            folders: counts.folders,
            rules: rules.len() as u64,
            rules_enabled,
        })
    }
}
