//! SQLite-backed media library: metadata, folders and listing in one handle.

use super::{attachment_repo, folder_repo, Database, DatabaseError};
use crate::config::schema::{AttachmentId, FolderId};
use crate::error::StoreError;
use crate::library::{
    AttachmentFilter, AttachmentMetadata, Folder, FolderSink, LibraryCounts, MediaCatalog,
    MetadataProvider,
};

#[derive(Clone)]
pub struct SqliteLibrary {
    db: Database,
}

impl SqliteLibrary {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Adds an item to the library.
    pub fn add_attachment(&self, meta: &AttachmentMetadata) -> Result<AttachmentId, DatabaseError> {
        attachment_repo::insert(&self.db, meta)
    }

    pub fn create_folder(
        &self,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Result<FolderId, DatabaseError> {
        folder_repo::create(&self.db, name, parent_id)
    }

    pub fn list_folders(&self) -> Result<Vec<Folder>, DatabaseError> {
        folder_repo::list(&self.db)
    }
}

impl MetadataProvider for SqliteLibrary {
    fn metadata(&self, id: AttachmentId) -> Result<Option<AttachmentMetadata>, StoreError> {
        let row = attachment_repo::find_by_id(&self.db, id)?;
        Ok(row.map(attachment_repo::AttachmentRow::into_metadata))
    }
}

impl FolderSink for SqliteLibrary {
    fn folder(&self, id: FolderId) -> Result<Option<Folder>, StoreError> {
        Ok(folder_repo::find_by_id(&self.db, id)?)
    }

    fn folders_of(&self, item: AttachmentId) -> Result<Vec<FolderId>, StoreError> {
        Ok(folder_repo::folders_of(&self.db, item)?)
    }

    fn assign(&self, item: AttachmentId, folder: FolderId) -> Result<bool, StoreError> {
        Ok(folder_repo::assign(&self.db, item, folder)?)
    }
}

impl MediaCatalog for SqliteLibrary {
    fn query(
        &self,
        filter: &AttachmentFilter,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<AttachmentId>, StoreError> {
        Ok(attachment_repo::query_ids(&self.db, filter, offset, limit)?)
    }

    fn counts(&self) -> Result<LibraryCounts, StoreError> {
        Ok(LibraryCounts {
            total: attachment_repo::count(&self.db)?,
            assigned: folder_repo::count_assigned(&self.db)?,
            folders: folder_repo::count(&self.db)?,
        })
    }
}
