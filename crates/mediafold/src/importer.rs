//! Brings files from a directory into the library and files them by rule.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::schema::AttachmentId;
use crate::db::SqliteLibrary;
use crate::error::{ImportError, StoreError};
use crate::evaluator::{RuleEvaluator, UploadContext, UploadOutcome};
use crate::library::{AttachmentMetadata, MediaItem};

/// One file that made it into the library.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedFile {
    pub path: PathBuf,
    pub attachment_id: AttachmentId,
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<ImportedFile>,
    pub failed: Vec<PathBuf>,
}

impl ImportReport {
    /// Files that a rule placed into a folder.
    pub fn assigned(&self) -> usize {
        self.imported
            .iter()
            .filter(|file| matches!(file.outcome, UploadOutcome::Assigned(_)))
            .count()
    }
}

pub struct MediaImporter {
    library: SqliteLibrary,
    evaluator: Arc<RuleEvaluator>,
    author_id: Option<i64>,
}

impl MediaImporter {
    pub fn new(library: SqliteLibrary, evaluator: Arc<RuleEvaluator>) -> Self {
        Self {
            library,
            evaluator,
            author_id: None,
        }
    }

    /// Records every imported item as uploaded by this user.
    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Imports the files directly inside `dir`. Subdirectories and hidden
    /// files are skipped; unreadable files are listed in the report.
    pub fn import_dir(&self, dir: &Path) -> Result<ImportReport, ImportError> {
        std::fs::metadata(dir).map_err(|e| ImportError::ReadFile {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut report = ImportReport::default();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    report.failed.push(path);
                    continue;
                }
            };

            if !entry.file_type().is_file() || is_hidden(entry.path()) {
                continue;
            }

            match self.import_file(entry.path()) {
                Ok(file) => report.imported.push(file),
                Err(ImportError::ReadFile { path, source }) => {
                    warn!("Failed to read {}: {}", path.display(), source);
                    report.failed.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Imported {} files from {} ({} filed by rules, {} failed)",
            report.imported.len(),
            dir.display(),
            report.assigned(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Adds one file to the library and runs the upload rules on it.
    pub fn import_file(&self, path: &Path) -> Result<ImportedFile, ImportError> {
        let metadata = self.read_metadata(path)?;
        let attachment_id = self
            .library
            .add_attachment(&metadata)
            .map_err(StoreError::from)?;

        let item = MediaItem::new(attachment_id, metadata);
        let outcome = self
            .evaluator
            .evaluate_on_upload(&item, UploadContext::Create)?;
        debug!("Imported {} as {}: {:?}", path.display(), attachment_id, outcome);

        Ok(ImportedFile {
            path: path.to_path_buf(),
            attachment_id,
            outcome,
        })
    }

    fn read_metadata(&self, path: &Path) -> Result<AttachmentMetadata, ImportError> {
        let stat = std::fs::metadata(path).map_err(|e| ImportError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mime_type = mime_guess::from_path(path).first().map(|m| m.to_string());

        // Files that only look like images keep unknown dimensions.
        let (width, height) = match mime_type.as_deref() {
            Some(mime) if mime.starts_with("image/") => match image::image_dimensions(path) {
                Ok((w, h)) => (Some(w), Some(h)),
                Err(e) => {
                    debug!("No dimensions for {}: {}", path.display(), e);
                    (None, None)
                }
            },
            _ => (None, None),
        };

        Ok(AttachmentMetadata {
            width,
            height,
            filesize: Some(stat.len()),
            mime_type,
            filename: Some(path.to_string_lossy().into_owned()),
            author_id: self.author_id,
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            thumbnail: None,
            image_meta: Default::default(),
        })
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
