//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use mediafold::config::schema::{Condition, FolderId, Rule};
use mediafold::library::AttachmentMetadata;

/// Builder for creating `Rule` instances.
pub struct RuleBuilder {
    id: String,
    name: String,
    conditions: Vec<Condition>,
    folder_id: FolderId,
    priority: i64,
    stop_processing: bool,
    enabled: bool,
}

impl RuleBuilder {
    /// Create an enabled rule with the given ID filing into `folder_id`.
    pub fn new(id: &str, folder_id: FolderId) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            conditions: vec![],
            folder_id,
            priority: 10,
            stop_processing: false,
            enabled: true,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn stop_processing(mut self) -> Self {
        self.stop_processing = true;
        self
    }

    /// Append an arbitrary condition.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filename(self, pattern: &str) -> Self {
        self.condition(Condition::new("filename_regex").with_value(pattern))
    }

    pub fn mime(self, mime: &str) -> Self {
        self.condition(Condition::new("mime_type").with_value(mime))
    }

    pub fn dimension(self, dimension: &str, operator: &str, value: i64) -> Self {
        self.condition(
            Condition::new("dimensions")
                .with_dimension(dimension)
                .with_operator(operator)
                .with_value(value),
        )
    }

    /// File size range in kilobytes, inclusive.
    pub fn size_between_kb(self, min: i64, max: i64) -> Self {
        self.condition(
            Condition::new("file_size")
                .with_operator("between")
                .with_value(min)
                .with_value_end(max),
        )
    }

    pub fn camera(self, camera: &str) -> Self {
        self.condition(Condition::new("exif_camera").with_value(camera))
    }

    pub fn taken(self, operator: &str, date: &str) -> Self {
        self.condition(
            Condition::new("exif_date")
                .with_operator(operator)
                .with_value(date),
        )
    }

    pub fn author(self, author: impl Into<mediafold::ConditionValue>) -> Self {
        self.condition(Condition::new("author").with_value(author))
    }

    pub fn keywords(self, keywords: &str) -> Self {
        self.condition(Condition::new("iptc_keywords").with_value(keywords))
    }

    pub fn build(self) -> Rule {
        Rule {
            id: self.id,
            name: self.name,
            conditions: self.conditions,
            folder_id: self.folder_id,
            priority: self.priority,
            stop_processing: self.stop_processing,
            enabled: self.enabled,
        }
    }
}

/// Builder for item metadata as the library would report it.
#[derive(Default)]
pub struct MetadataBuilder {
    metadata: AttachmentMetadata,
}

impl MetadataBuilder {
    pub fn new(filename: &str) -> Self {
        Self {
            metadata: AttachmentMetadata {
                filename: Some(filename.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn mime(mut self, mime: &str) -> Self {
        self.metadata.mime_type = Some(mime.to_string());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.metadata.width = Some(width);
        self.metadata.height = Some(height);
        self
    }

    pub fn bytes(mut self, filesize: u64) -> Self {
        self.metadata.filesize = Some(filesize);
        self
    }

    pub fn author(mut self, author_id: i64) -> Self {
        self.metadata.author_id = Some(author_id);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.metadata.title = Some(title.to_string());
        self
    }

    pub fn camera(mut self, camera: &str) -> Self {
        self.metadata.image_meta.camera = Some(camera.to_string());
        self
    }

    /// Capture time as UTC epoch seconds.
    pub fn taken_at(mut self, timestamp: i64) -> Self {
        self.metadata.image_meta.created_timestamp = Some(timestamp);
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.metadata.image_meta.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn build(self) -> AttachmentMetadata {
        self.metadata
    }
}

/// A JPEG photo of the given size in bytes.
pub fn photo(filename: &str, filesize: u64) -> AttachmentMetadata {
    MetadataBuilder::new(filename)
        .mime("image/jpeg")
        .bytes(filesize)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder_defaults() {
        let rule = RuleBuilder::new("raw", 3).filename("\\.cr2$").build();
        assert_eq!(rule.id, "raw");
        assert_eq!(rule.folder_id, 3);
        assert_eq!(rule.priority, 10);
        assert!(rule.enabled);
        assert_eq!(rule.conditions.len(), 1);
    }

    #[test]
    fn test_metadata_builder() {
        let meta = MetadataBuilder::new("a.jpg")
            .size(10, 20)
            .keywords(&["x"])
            .camera("Canon")
            .build();
        assert_eq!(meta.width, Some(10));
        assert_eq!(meta.image_meta.keywords, vec!["x"]);
        assert_eq!(meta.image_meta.camera.as_deref(), Some("Canon"));
    }
}
