use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text_utils::parse_date_time;

pub mod content_file;
pub mod front_matter;
pub mod markdown;
pub mod html_renderer;
pub mod toc;

/// One entry of the post manifest (`index.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub category: String,
    /// ISO-8601 instant, `2025-03-29T00:00:00.000Z`
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub read_time: String,
    /// Path of the markdown source under the serving root, e.g. `/_posts/2025-03-29-sites.md`
    pub file: String,
}

impl PostRecord {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_date_time(&self.date).ok()
    }
}

/// A manifest entry together with its markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub record: PostRecord,
    pub content: String,
}

/// Newest first. Records whose date cannot be read go last; equal dates keep their order.
pub fn sort_by_date_desc(records: &mut [PostRecord]) {
    records.sort_by(|a, b| match (a.instant(), b.instant()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::record;

    #[test]
    fn test_sort_by_date_desc() {
        let mut records = vec![
            record("a", "Study", "2024-01-01T00:00:00.000Z"),
            record("b", "Study", "2025-03-29T00:00:00.000Z"),
            record("c", "CS", "2024-01-01T00:00:00.000Z"),
            record("d", "CS", "not a date"),
            record("e", "CS", "2024-06-01T12:00:00.000Z"),
        ];
        sort_by_date_desc(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn test_record_json_field_names() {
        let mut post = record("2025-03-29-sites", "Project", "2025-03-29T00:00:00.000Z");
        post.read_time = "3분".to_string();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["readTime"], "3분");
        assert_eq!(json["file"], "/_posts/2025-03-29-sites.md");
        assert!(json.get("read_time").is_none());
    }

    #[test]
    fn test_record_defaults_when_missing() {
        let json = r#"{"id":"x","title":"T","category":"CS","date":"2024-01-01T00:00:00.000Z","file":"/_posts/x.md"}"#;
        let post: PostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(post.excerpt, "");
        assert!(post.tags.is_empty());
        assert_eq!(post.read_time, "");
    }
}
