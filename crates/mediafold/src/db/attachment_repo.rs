//! Attachment repository: library items and their stored metadata.

use rusqlite::types::ToSql;
use rusqlite::{params, Row};

use super::{Database, DatabaseError};
use crate::config::schema::AttachmentId;
use crate::library::{AttachmentFilter, AttachmentMetadata, ImageMeta};

/// A raw attachment row.
#[derive(Debug, Clone)]
pub struct AttachmentRow {
    pub id: AttachmentId,
    pub title: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub author_id: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filesize: Option<u64>,
    pub camera: Option<String>,
    pub created_timestamp: Option<i64>,
    /// JSON array of strings.
    pub keywords: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

impl AttachmentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            filename: row.get("filename")?,
            mime_type: row.get("mime_type")?,
            author_id: row.get("author_id")?,
            width: row.get("width")?,
            height: row.get("height")?,
            filesize: row.get("filesize")?,
            camera: row.get("camera")?,
            created_timestamp: row.get("created_timestamp")?,
            keywords: row.get("keywords")?,
            thumbnail: row.get("thumbnail")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Decodes the row into the metadata shape matchers consume.
    /// A malformed keyword column reads as no keywords.
    pub fn into_metadata(self) -> AttachmentMetadata {
        let keywords = serde_json::from_str(&self.keywords).unwrap_or_else(|e| {
            log::warn!("Attachment {} has unreadable keywords: {}", self.id, e);
            Vec::new()
        });

        AttachmentMetadata {
            width: self.width,
            height: self.height,
            filesize: self.filesize,
            mime_type: self.mime_type,
            filename: self.filename,
            author_id: self.author_id,
            title: self.title,
            thumbnail: self.thumbnail,
            image_meta: ImageMeta {
                camera: self.camera,
                created_timestamp: self.created_timestamp,
                keywords,
            },
        }
    }
}

/// Inserts a new attachment and returns its id.
pub fn insert(db: &Database, meta: &AttachmentMetadata) -> Result<AttachmentId, DatabaseError> {
    let keywords = serde_json::to_string(&meta.image_meta.keywords)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO attachments (title, filename, mime_type, author_id, width, height,
             filesize, camera, created_timestamp, keywords, thumbnail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                meta.title,
                meta.filename,
                meta.mime_type,
                meta.author_id,
                meta.width,
                meta.height,
                meta.filesize,
                meta.image_meta.camera,
                meta.image_meta.created_timestamp,
                keywords,
                meta.thumbnail,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Finds an attachment row by id.
pub fn find_by_id(
    db: &Database,
    id: AttachmentId,
) -> Result<Option<AttachmentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM attachments WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], AttachmentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Deletes an attachment. Its folder assignment goes with it.
pub fn delete(db: &Database, id: AttachmentId) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM attachments WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
}

/// Ids matching `filter`, ascending, after skipping `offset`.
pub fn query_ids(
    db: &Database,
    filter: &AttachmentFilter,
    offset: u64,
    limit: Option<u64>,
) -> Result<Vec<AttachmentId>, DatabaseError> {
    if matches!(&filter.ids, Some(ids) if ids.is_empty()) {
        return Ok(Vec::new());
    }
    // SQLite reads a negative OFFSET as zero, so an offset past i64::MAX
    // would restart from the first row.
    let Ok(offset) = i64::try_from(offset) else {
        return Ok(Vec::new());
    };

    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if filter.unassigned_only {
            conditions.push(
                "NOT EXISTS (SELECT 1 FROM attachment_folders af \
                 WHERE af.attachment_id = attachments.id)"
                    .to_string(),
            );
        }

        if let Some(mime) = filter.mime_type.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            match mime_prefix(mime) {
                Some(prefix) => {
                    conditions.push(format!(
                        "substr(mime_type, 1, ?{}) = ?{}",
                        param_values.len() + 1,
                        param_values.len() + 2
                    ));
                    param_values.push(Box::new(prefix.len() as i64));
                    param_values.push(Box::new(prefix));
                }
                None => {
                    conditions.push(format!("mime_type = ?{}", param_values.len() + 1));
                    param_values.push(Box::new(mime.to_string()));
                }
            }
        }

        // One JSON array parameter keeps long id lists under the host
        // parameter limit.
        if let Some(ids) = &filter.ids {
            conditions.push(format!(
                "id IN (SELECT value FROM json_each(?{}))",
                param_values.len() + 1
            ));
            param_values.push(Box::new(serde_json::to_string(ids)?));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // SQLite wants a LIMIT before OFFSET; -1 means unbounded.
        let limit = limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1);
        param_values.push(Box::new(limit));
        param_values.push(Box::new(offset));
        let sql = format!(
            "SELECT id FROM attachments {} ORDER BY id ASC LIMIT ?{} OFFSET ?{}",
            where_clause,
            param_values.len() - 1,
            param_values.len()
        );

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_ref.as_slice(), |r| r.get(0))?
            .collect::<Result<Vec<AttachmentId>, _>>()?;
        Ok(ids)
    })
}

/// `image` and `image/*` select everything under `image/`; anything else
/// with a slash is an exact type.
fn mime_prefix(filter: &str) -> Option<String> {
    if let Some(top) = filter.strip_suffix("/*") {
        return Some(format!("{top}/"));
    }
    if filter.contains('/') {
        None
    } else {
        Some(format!("{filter}/"))
    }
}

/// Total number of attachments.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let total = conn.query_row("SELECT COUNT(*) FROM attachments", [], |r| r.get(0))?;
        Ok(total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(filename: &str, mime: &str) -> AttachmentMetadata {
        AttachmentMetadata {
            filename: Some(filename.to_string()),
            mime_type: Some(mime.to_string()),
            ..Default::default()
        }
    }

    fn seeded() -> (Database, Vec<AttachmentId>) {
        let db = Database::open_in_memory().unwrap();
        let ids = [
            meta("a.jpg", "image/jpeg"),
            meta("b.png", "image/png"),
            meta("c.mp4", "video/mp4"),
            meta("d.pdf", "application/pdf"),
        ]
        .iter()
        .map(|m| insert(&db, m).unwrap())
        .collect();
        (db, ids)
    }

    #[test]
    fn test_insert_and_read_back_metadata() {
        let db = Database::open_in_memory().unwrap();
        let original = AttachmentMetadata {
            width: Some(1920),
            height: Some(1080),
            filesize: Some(2_500_000),
            mime_type: Some("image/jpeg".to_string()),
            filename: Some("2024/06/IMG_0001.jpg".to_string()),
            author_id: Some(3),
            title: Some("Beach".to_string()),
            thumbnail: None,
            image_meta: ImageMeta {
                camera: Some("Canon EOS R5".to_string()),
                created_timestamp: Some(1_718_000_000),
                keywords: vec!["beach".to_string(), "summer".to_string()],
            },
        };

        let id = insert(&db, &original).unwrap();
        let row = find_by_id(&db, id).unwrap().unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.into_metadata(), original);
    }

    #[test]
    fn test_find_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(find_by_id(&db, 42).unwrap().is_none());
    }

    #[test]
    fn test_query_orders_and_pages() {
        let (db, ids) = seeded();
        let filter = AttachmentFilter::default();

        assert_eq!(query_ids(&db, &filter, 0, None).unwrap(), ids);
        assert_eq!(query_ids(&db, &filter, 1, Some(2)).unwrap(), ids[1..3].to_vec());
        assert!(query_ids(&db, &filter, 10, Some(2)).unwrap().is_empty());
    }

    #[test]
    fn test_query_mime_filters() {
        let (db, ids) = seeded();
        let by = |mime: &str| {
            let filter = AttachmentFilter {
                mime_type: Some(mime.to_string()),
                ..Default::default()
            };
            query_ids(&db, &filter, 0, None).unwrap()
        };

        assert_eq!(by("image"), ids[0..2].to_vec());
        assert_eq!(by("image/*"), ids[0..2].to_vec());
        assert_eq!(by("image/png"), vec![ids[1]]);
        assert_eq!(by("video"), vec![ids[2]]);
        assert!(by("audio").is_empty());
    }

    #[test]
    fn test_query_by_ids() {
        let (db, ids) = seeded();
        let filter = AttachmentFilter {
            ids: Some(vec![ids[3], ids[0], 999]),
            ..Default::default()
        };
        assert_eq!(query_ids(&db, &filter, 0, None).unwrap(), vec![ids[0], ids[3]]);

        let empty = AttachmentFilter {
            ids: Some(Vec::new()),
            ..Default::default()
        };
        assert!(query_ids(&db, &empty, 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_query_by_many_ids() {
        let (db, ids) = seeded();
        // More ids than SQLite accepts as separate parameters.
        let mut wanted: Vec<AttachmentId> = (1_000..41_000).collect();
        wanted.push(ids[2]);
        let filter = AttachmentFilter {
            ids: Some(wanted),
            ..Default::default()
        };
        assert_eq!(query_ids(&db, &filter, 0, None).unwrap(), vec![ids[2]]);
    }

    #[test]
    fn test_query_offset_beyond_i64_is_empty() {
        let (db, _) = seeded();
        let filter = AttachmentFilter::default();
        assert!(query_ids(&db, &filter, u64::MAX, Some(3)).unwrap().is_empty());
        assert!(query_ids(&db, &filter, i64::MAX as u64 + 1, None)
            .unwrap()
            .is_empty());
        assert!(query_ids(&db, &filter, i64::MAX as u64, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_delete() {
        let (db, ids) = seeded();
        assert!(delete(&db, ids[0]).unwrap());
        assert!(!delete(&db, ids[0]).unwrap());
        assert_eq!(count(&db).unwrap(), 3);
    }

    #[test]
    fn test_unreadable_keywords_become_empty() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db, &meta("x.jpg", "image/jpeg")).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE attachments SET keywords = 'oops' WHERE id = ?1", [id])?;
            Ok(())
        })
        .unwrap();

        let metadata = find_by_id(&db, id).unwrap().unwrap().into_metadata();
        assert!(metadata.image_meta.keywords.is_empty());
    }
}
