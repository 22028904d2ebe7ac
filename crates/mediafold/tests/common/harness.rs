//! Isolated library for integration tests.
//!
//! Each `LibraryHarness` owns an in-memory database with the rule store,
//! the library tables, and a temp directory for file fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use mediafold::config::schema::{AttachmentId, FolderId, Rule};
use mediafold::db::{Database, RuleRepository, SqliteLibrary};
use mediafold::library::{AttachmentMetadata, FolderSink};
use mediafold::{BatchProcessor, RuleEvaluator};

pub struct LibraryHarness {
    temp_dir: TempDir,
    pub db: Database,
    pub library: SqliteLibrary,
    pub rules: RuleRepository,
}

impl LibraryHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_in_memory().expect("Failed to open database");
        Self {
            temp_dir,
            library: SqliteLibrary::new(db.clone()),
            rules: RuleRepository::new(db.clone()),
            db,
        }
    }

    /// Harness whose rule store starts with `rules`.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let harness = Self::new();
        harness.rules.seed_rules(&rules).expect("Failed to seed rules");
        harness
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a fixture file into the temp directory.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub fn folder(&self, name: &str) -> FolderId {
        self.library
            .create_folder(name, None)
            .expect("Failed to create folder")
    }

    pub fn add(&self, metadata: AttachmentMetadata) -> AttachmentId {
        self.library
            .add_attachment(&metadata)
            .expect("Failed to add attachment")
    }

    /// Adds items in order and returns their ids.
    pub fn add_all(&self, items: Vec<AttachmentMetadata>) -> Vec<AttachmentId> {
        items.into_iter().map(|m| self.add(m)).collect()
    }

    pub fn folders_of(&self, id: AttachmentId) -> Vec<FolderId> {
        self.library.folders_of(id).expect("Failed to read folders")
    }

    pub fn evaluator(&self) -> RuleEvaluator {
        RuleEvaluator::new(
            Arc::new(self.rules.clone()),
            Arc::new(self.library.clone()),
        )
    }

    pub fn processor(&self) -> BatchProcessor {
        let library = Arc::new(self.library.clone());
        BatchProcessor::new(Arc::new(self.evaluator()), library.clone(), library)
    }
}
