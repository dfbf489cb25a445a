use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::{fmt, fs};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use spdlog::{debug, info, warn};

use crate::config::{Config, InvalidDatePolicy};
use crate::content::content_file::ContentFile;
use crate::content::front_matter::FrontMatter;
use crate::content::PostRecord;
use crate::post_list::PostList;
use crate::read_time::estimate_read_time;
use crate::text_utils::{format_iso, parse_date_value, value_to_string};

const REQUIRED_FIELDS: [&str; 3] = ["title", "date", "category"];

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingFields(Vec<&'static str>),
    InvalidFrontMatter(String),
    InvalidDate(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields(fields) => write!(f, "missing {} (title/date/category are required)", fields.join(", ")),
            SkipReason::InvalidFrontMatter(e) => write!(f, "{}", e),
            SkipReason::InvalidDate(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub struct SkippedPost {
    pub file: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct BuildReport {
    pub index_path: PathBuf,
    pub accepted: usize,
    pub skipped: Vec<SkippedPost>,
}

/// Turns a directory of markdown posts into `index.json`.
pub struct ManifestBuilder {
    pub content_dir: PathBuf,
    pub public_dir: PathBuf,
    pub index_file: String,
    pub chars_per_minute: usize,
    pub on_invalid_date: InvalidDatePolicy,
}

struct DatedRecord {
    date: DateTime<Utc>,
    record: PostRecord,
}

impl ManifestBuilder {
    pub fn new(config: &Config) -> Self {
        ManifestBuilder {
            content_dir: config.paths.content_dir.clone(),
            public_dir: config.paths.public_dir.clone(),
            index_file: config.paths.index_file.clone(),
            chars_per_minute: config.build.chars_per_minute,
            on_invalid_date: config.build.on_invalid_date,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.content_dir.join(&self.index_file)
    }

    /// Rebuilds the manifest from scratch and overwrites the index file.
    pub fn build(&self) -> Result<BuildReport> {
        let (records, skipped) = self.collect()?;

        let index_path = self.index_path();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&index_path, json)
            .with_context(|| format!("Error writing manifest {}", index_path.display()))?;

        info!("[ok] generated {} ({} posts)", index_path.display(), records.len());

        Ok(BuildReport {
            index_path,
            accepted: records.len(),
            skipped,
        })
    }

    /// Accepted records, newest first, and the posts that were left out.
    pub fn collect(&self) -> Result<(Vec<PostRecord>, Vec<SkippedPost>)> {
        fs::create_dir_all(&self.content_dir)
            .with_context(|| format!("Error creating content directory {}", self.content_dir.display()))?;

        let post_list = PostList { root_dir: self.content_dir.clone() };
        let files = post_list.retrieve_files()
            .with_context(|| format!("Error listing posts in {}", self.content_dir.display()))?;

        let mut dated = vec![];
        let mut skipped = vec![];
        for file_path in files {
            let content_file = ContentFile::from_file(file_path.clone())
                .with_context(|| format!("Error reading post {}", file_path.display()))?;

            match self.to_record(&content_file) {
                Ok(record) => {
                    debug!("Post {} from {}", record.record.id, content_file.file_name);
                    dated.push(record);
                }
                Err(SkipReason::InvalidDate(e)) if self.on_invalid_date == InvalidDatePolicy::Abort => {
                    bail!("Invalid date in {}: {}", file_path.display(), e);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", content_file.file_name, reason);
                    skipped.push(SkippedPost {
                        file: file_path,
                        reason,
                    });
                }
            }
        }

        // Stable: posts with the same date keep the directory order
        dated.sort_by(|a, b| b.date.cmp(&a.date));
        let records = dated.into_iter().map(|d| d.record).collect();

        Ok((records, skipped))
    }

    fn to_record(&self, content_file: &ContentFile) -> Result<DatedRecord, SkipReason> {
        let front_matter = FrontMatter::parse(&content_file.raw_content)
            .map_err(|e| SkipReason::InvalidFrontMatter(e.to_string()))?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS.iter()
            .filter(|field| !front_matter.has(field))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(SkipReason::MissingFields(missing));
        }

        let text = |key: &str| front_matter.get(key).and_then(value_to_string);

        let date = match front_matter.get("date") {
            Some(value) => parse_date_value(value).map_err(SkipReason::InvalidDate)?,
            None => return Err(SkipReason::MissingFields(vec!["date"])),
        };

        let tags = match front_matter.get("tags") {
            Some(Value::Array(tags)) => tags.iter()
                .map(|tag| value_to_string(tag).unwrap_or_else(|| "null".to_string()))
                .collect(),
            _ => vec![],
        };

        let read_time = text("readTime")
            .unwrap_or_else(|| estimate_read_time(&front_matter.body, self.chars_per_minute));

        let record = PostRecord {
            id: text("id").unwrap_or_else(|| content_file.base_name().to_string()),
            title: text("title").unwrap_or_default(),
            excerpt: text("excerpt").unwrap_or_default(),
            category: text("category").unwrap_or_default(),
            date: format_iso(&date),
            tags,
            read_time,
            file: content_file.public_path(&self.public_dir),
        };

        Ok(DatedRecord { date, record })
    }
}

pub fn read_manifest(index_path: &Path) -> Result<Vec<PostRecord>> {
    let json = fs::read_to_string(index_path)
        .with_context(|| format!("Error reading manifest {}", index_path.display()))?;
    let records = serde_json::from_str(&json)
        .with_context(|| format!("Error parsing manifest {}", index_path.display()))?;
    Ok(records)
}
