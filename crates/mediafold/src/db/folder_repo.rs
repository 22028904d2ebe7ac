//! Folder repository: folders and the item-to-folder assignment table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::config::schema::{AttachmentId, FolderId};
use crate::library::Folder;

fn folder_from_row(row: &Row<'_>) -> Result<Folder, rusqlite::Error> {
    Ok(Folder {
        id: row.get("id")?,
        name: row.get("name")?,
        parent_id: row.get("parent_id")?,
    })
}

/// Creates a folder and returns its id.
pub fn create(
    db: &Database,
    name: &str,
    parent_id: Option<FolderId>,
) -> Result<FolderId, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO folders (name, parent_id) VALUES (?1, ?2)",
            params![name, parent_id],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn find_by_id(db: &Database, id: FolderId) -> Result<Option<Folder>, DatabaseError> {
    db.with_conn(|conn| {
        let folder = conn
            .query_row(
                "SELECT id, name, parent_id FROM folders WHERE id = ?1",
                params![id],
                folder_from_row,
            )
            .optional()?;
        Ok(folder)
    })
}

/// All folders ordered by name.
pub fn list(db: &Database) -> Result<Vec<Folder>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT id, name, parent_id FROM folders ORDER BY name, id")?;
        let folders = stmt
            .query_map([], folder_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(folders)
    })
}

/// Deletes a folder; items assigned to it become unassigned.
pub fn delete(db: &Database, id: FolderId) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM folders WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
}

pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let total = conn.query_row("SELECT COUNT(*) FROM folders", [], |r| r.get(0))?;
        Ok(total)
    })
}

/// Number of items that carry a folder.
pub fn count_assigned(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let total = conn.query_row(
            "SELECT COUNT(DISTINCT attachment_id) FROM attachment_folders",
            [],
            |r| r.get(0),
        )?;
        Ok(total)
    })
}

/// Folder ids the item belongs to.
pub fn folders_of(
    db: &Database,
    attachment_id: AttachmentId,
) -> Result<Vec<FolderId>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT folder_id FROM attachment_folders WHERE attachment_id = ?1 ORDER BY folder_id",
        )?;
        let ids = stmt
            .query_map(params![attachment_id], |r| r.get(0))?
            .collect::<Result<Vec<FolderId>, _>>()?;
        Ok(ids)
    })
}

/// Places the item in exactly this folder, replacing any previous one.
///
/// Returns `false` and leaves the item untouched when either the folder or
/// the attachment does not exist.
pub fn assign(
    db: &Database,
    attachment_id: AttachmentId,
    folder_id: FolderId,
) -> Result<bool, DatabaseError> {
    db.with_transaction(|conn| {
        let folder_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?1)",
            params![folder_id],
            |r| r.get(0),
        )?;
        let attachment_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM attachments WHERE id = ?1)",
            params![attachment_id],
            |r| r.get(0),
        )?;
        if !folder_exists || !attachment_exists {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO attachment_folders (attachment_id, folder_id) VALUES (?1, ?2)
             ON CONFLICT(attachment_id) DO UPDATE SET
                folder_id = excluded.folder_id,
                assigned_at = CASE WHEN folder_id = excluded.folder_id
                                   THEN assigned_at ELSE datetime('now') END",
            params![attachment_id, folder_id],
        )?;
        Ok(true)
    })
}

/// Removes the item from its folder.
pub fn unassign(db: &Database, attachment_id: AttachmentId) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "DELETE FROM attachment_folders WHERE attachment_id = ?1",
            params![attachment_id],
        )?;
        Ok(affected > 0)
    })
}
