use anyhow::{Context, Result};
use spdlog::{error, info};

use crate::content::front_matter::strip_front_matter;
use crate::content::{sort_by_date_desc, PostDetail, PostRecord};
use crate::read_time::{estimate_read_time, DEFAULT_CHARS_PER_MINUTE};

pub mod source;

use source::ContentSource;

/// Label of the category entry that lists every post.
pub const ALL_CATEGORIES: &str = "전체보기";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Named(String),
}

impl CategoryFilter {
    /// `전체보기` and `all` (any case) select every category.
    pub fn parse(name: &str) -> Self {
        if name == ALL_CATEGORIES || name.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(name.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Client side view of the published posts: the manifest kept in memory and
/// post bodies fetched on demand. Nothing is cached besides the manifest.
pub struct ContentRepository<S> {
    source: S,
    index_path: String,
    chars_per_minute: usize,
    posts: Vec<PostRecord>,
}

impl<S: ContentSource> ContentRepository<S> {
    pub fn new(source: S, index_path: &str) -> Self {
        ContentRepository {
            source,
            index_path: index_path.to_string(),
            chars_per_minute: DEFAULT_CHARS_PER_MINUTE,
            posts: vec![],
        }
    }

    pub fn with_chars_per_minute(mut self, chars_per_minute: usize) -> Self {
        self.chars_per_minute = chars_per_minute;
        self
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    /// Fetches the manifest and keeps it, newest first whatever order the file had.
    pub async fn try_load_manifest(&mut self) -> Result<&[PostRecord]> {
        let json = self.source.fetch_text(&self.index_path).await?;
        let mut posts: Vec<PostRecord> = serde_json::from_str(&json)
            .with_context(|| format!("Error parsing manifest {}", self.index_path))?;
        sort_by_date_desc(&mut posts);

        info!("Loaded {} posts from {}", posts.len(), self.index_path);
        self.posts = posts;
        Ok(&self.posts)
    }

    /// Like [`Self::try_load_manifest`], but a failure is logged and gives an empty list.
    /// The posts loaded before stay in place.
    pub async fn load_manifest(&mut self) -> Vec<PostRecord> {
        match self.try_load_manifest().await {
            Ok(posts) => posts.to_vec(),
            Err(e) => {
                error!("posts manifest load error: {:#}", e);
                vec![]
            }
        }
    }

    pub async fn try_load_detail(&self, record: &PostRecord) -> Result<PostDetail> {
        let raw = self.source.fetch_text(&record.file).await?;
        let content = strip_front_matter(&raw).to_string();

        let mut record = record.clone();
        if record.read_time.is_empty() {
            record.read_time = estimate_read_time(&content, self.chars_per_minute);
        }

        Ok(PostDetail { record, content })
    }

    /// Like [`Self::try_load_detail`], but a failure is logged and gives `None`.
    pub async fn load_detail(&self, record: &PostRecord) -> Option<PostDetail> {
        match self.try_load_detail(record).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                error!("post load error for {}: {:#}", record.id, e);
                None
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&PostRecord> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Posts in `category` whose title, excerpt or one of the tags contains
    /// `query`, ignoring case. An empty query matches everything.
    pub fn filter(&self, category: &CategoryFilter, query: &str) -> Vec<&PostRecord> {
        let query = query.to_lowercase();
        self.posts.iter()
            .filter(|post| category.matches(&post.category))
            .filter(|post| {
                post.title.to_lowercase().contains(&query)
                    || post.excerpt.to_lowercase().contains(&query)
                    || post.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn category_count(&self, category: &CategoryFilter) -> usize {
        self.posts.iter().filter(|post| category.matches(&post.category)).count()
    }

    /// Every category with its number of posts, in order of first appearance.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut categories: Vec<CategoryCount> = vec![];
        for post in self.posts.iter() {
            match categories.iter_mut().find(|c| c.name == post.category) {
                Some(entry) => entry.count += 1,
                None => categories.push(CategoryCount {
                    name: post.category.clone(),
                    count: 1,
                }),
            }
        }
        categories
    }

    /// Other posts of the same category, newest first.
    pub fn related(&self, record: &PostRecord, limit: usize) -> Vec<&PostRecord> {
        self.posts.iter()
            .filter(|post| post.category == record.category && post.id != record.id)
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use anyhow::anyhow;

    use crate::test_data::{record, POST_SITES};

    use super::*;

    const INDEX: &str = "/_posts/index.json";

    struct MemorySource {
        files: HashMap<String, String>,
        fetches: Cell<usize>,
    }

    impl MemorySource {
        fn new(files: &[(&str, &str)]) -> Self {
            MemorySource {
                files: files.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                fetches: Cell::new(0),
            }
        }
    }

    impl ContentSource for MemorySource {
        async fn fetch_text(&self, path: &str) -> Result<String> {
            self.fetches.set(self.fetches.get() + 1);
            self.files.get(path).cloned().ok_or_else(|| anyhow!("404 {}", path))
        }
    }

    fn manifest_json() -> String {
        let mut sites = record("2025-03-29-sites", "Project", "2025-03-29T00:00:00.000Z");
        sites.title = "Sites I keep coming back to".to_string();
        sites.tags = vec!["Web".to_string(), "links".to_string()];
        sites.read_time = "".to_string();

        let mut rust = record("rust-notes", "Study", "2025-01-10T00:00:00.000Z");
        rust.title = "Rust notes".to_string();
        rust.excerpt = "Ownership and borrowing".to_string();
        rust.read_time = "4분".to_string();

        let mut algo = record("dp", "Algorithm", "2024-11-02T00:00:00.000Z");
        algo.title = "Dynamic programming".to_string();

        let mut cloud = record("k8s", "Study", "2025-02-01T00:00:00.000Z");
        cloud.title = "Kubernetes in a weekend".to_string();
        cloud.tags = vec!["cloud".to_string()];

        // Deliberately out of order
        serde_json::to_string(&vec![algo, sites, rust, cloud]).unwrap()
    }

    async fn loaded_repo() -> ContentRepository<MemorySource> {
        let json = manifest_json();
        let source = MemorySource::new(&[
            (INDEX, json.as_str()),
            ("/_posts/2025-03-29-sites.md", POST_SITES),
            ("/_posts/rust-notes.md", "# Rust\nbody"),
        ]);
        let mut repo = ContentRepository::new(source, INDEX);
        repo.try_load_manifest().await.unwrap();
        repo
    }

    fn ids(posts: &[&PostRecord]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_manifest_is_resorted() {
        let repo = loaded_repo().await;
        let ids: Vec<&str> = repo.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2025-03-29-sites", "k8s", "rust-notes", "dp"]);
        for pair in repo.posts().windows(2) {
            assert!(pair[0].instant() >= pair[1].instant());
        }
    }

    #[tokio::test]
    async fn test_manifest_failure_is_empty() {
        let mut repo = ContentRepository::new(MemorySource::new(&[]), INDEX);
        assert!(repo.load_manifest().await.is_empty());
        assert!(repo.try_load_manifest().await.is_err());

        let mut repo = ContentRepository::new(MemorySource::new(&[(INDEX, "{ not json")]), INDEX);
        assert!(repo.load_manifest().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_posts() {
        let mut repo = loaded_repo().await;
        repo.index_path = "/_posts/gone.json".to_string();
        assert!(repo.load_manifest().await.is_empty());
        assert_eq!(repo.posts().len(), 4);
    }

    #[tokio::test]
    async fn test_load_detail() {
        let repo = loaded_repo().await;
        let sites = repo.find("2025-03-29-sites").unwrap().clone();
        let detail = repo.load_detail(&sites).await.unwrap();
        assert!(detail.content.starts_with("## 자주 가는 사이트"));
        assert!(!detail.content.contains("category: Project"));
        assert_eq!(detail.record.read_time, "1분");
        assert_eq!(detail.record.id, sites.id);

        let rust = repo.find("rust-notes").unwrap().clone();
        let detail = repo.load_detail(&rust).await.unwrap();
        assert_eq!(detail.content, "# Rust\nbody");
        assert_eq!(detail.record.read_time, "4분");
    }

    #[tokio::test]
    async fn test_load_detail_failure_is_none() {
        let repo = loaded_repo().await;
        let dp = repo.find("dp").unwrap().clone();
        assert!(repo.load_detail(&dp).await.is_none());
    }

    #[tokio::test]
    async fn test_every_load_fetches_again() {
        let repo = loaded_repo().await;
        let rust = repo.find("rust-notes").unwrap().clone();
        let before = repo.source.fetches.get();
        repo.load_detail(&rust).await;
        repo.load_detail(&rust).await;
        assert_eq!(repo.source.fetches.get(), before + 2);
    }

    #[tokio::test]
    async fn test_filter_all_and_empty_query() {
        let repo = loaded_repo().await;
        let all = repo.filter(&CategoryFilter::All, "");
        let expected: Vec<String> = repo.posts().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids(&all), expected);
    }

    #[tokio::test]
    async fn test_filter() {
        let repo = loaded_repo().await;
        assert_eq!(ids(&repo.filter(&CategoryFilter::parse("Study"), "")), ["k8s", "rust-notes"]);
        assert_eq!(ids(&repo.filter(&CategoryFilter::All, "RUST")), ["rust-notes"]);
        assert_eq!(ids(&repo.filter(&CategoryFilter::All, "borrow")), ["rust-notes"]);
        assert_eq!(ids(&repo.filter(&CategoryFilter::All, "web")), ["2025-03-29-sites"]);
        assert_eq!(ids(&repo.filter(&CategoryFilter::parse("Study"), "cloud")), ["k8s"]);
        assert!(repo.filter(&CategoryFilter::parse("Project"), "cloud").is_empty());
        assert!(repo.filter(&CategoryFilter::parse("study"), "").is_empty());
    }

    #[tokio::test]
    async fn test_categories() {
        let repo = loaded_repo().await;
        assert_eq!(repo.category_count(&CategoryFilter::parse(ALL_CATEGORIES)), 4);
        assert_eq!(repo.category_count(&CategoryFilter::parse("Study")), 2);
        assert_eq!(repo.category_count(&CategoryFilter::parse("CS")), 0);

        let names: Vec<(String, usize)> = repo.categories().into_iter().map(|c| (c.name, c.count)).collect();
        assert_eq!(names, [
            ("Project".to_string(), 1),
            ("Study".to_string(), 2),
            ("Algorithm".to_string(), 1),
        ]);
    }

    #[tokio::test]
    async fn test_related() {
        let repo = loaded_repo().await;
        let rust = repo.find("rust-notes").unwrap().clone();
        assert_eq!(ids(&repo.related(&rust, 5)), ["k8s"]);
        assert!(repo.related(&rust, 0).is_empty());
        let dp = repo.find("dp").unwrap().clone();
        assert!(repo.related(&dp, 5).is_empty());
    }

    #[tokio::test]
    async fn test_reads_built_manifest_from_dir() -> Result<()> {
        use crate::config::Config;
        use crate::manifest::ManifestBuilder;
        use crate::repository::source::DirSource;

        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.paths.public_dir = dir.path().join("public");
        config.paths.content_dir = config.paths.public_dir.join("_posts");
        std::fs::create_dir_all(&config.paths.content_dir)?;
        std::fs::write(config.paths.content_dir.join("2025-03-29-sites.md"), POST_SITES)?;
        ManifestBuilder::new(&config).build()?;

        let source = DirSource::new(&config.paths.public_dir);
        let mut repo = ContentRepository::new(source, &config.index_url_path());
        let posts = repo.load_manifest().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].file, "/_posts/2025-03-29-sites.md");

        let detail = repo.try_load_detail(&posts[0]).await?;
        assert!(detail.content.starts_with("## 자주 가는 사이트"));
        Ok(())
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("전체보기"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("ALL"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("CS"), CategoryFilter::Named("CS".to_string()));
    }
}
