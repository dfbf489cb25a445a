use std::collections::BTreeSet;

use crate::content::markdown::{render, Node};
use crate::content::toc::{active_section, table_of_contents, HeadingPosition, TocEntry, ACTIVE_SECTION_THRESHOLD};
use crate::content::{PostDetail, PostRecord};
use crate::repository::source::ContentSource;
use crate::repository::{CategoryFilter, ContentRepository};

/// Category group open when the blog is first shown.
pub const DEFAULT_EXPANDED_CATEGORY: &str = "Study";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum View {
    Blog,
    About,
}

/// Navigation state of one reader: current page, selected post, open category groups.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: View,
    pub selected: Option<PostRecord>,
    pub category: CategoryFilter,
    pub query: String,
    expanded: BTreeSet<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            view: View::Blog,
            selected: None,
            category: CategoryFilter::All,
            query: String::new(),
            expanded: BTreeSet::from([DEFAULT_EXPANDED_CATEGORY.to_string()]),
        }
    }
}

impl ViewState {
    /// Switching page always drops the selected post.
    pub fn change_view(&mut self, view: View) {
        self.view = view;
        self.selected = None;
    }

    pub fn select(&mut self, record: PostRecord) {
        self.view = View::Blog;
        self.selected = Some(record);
    }

    pub fn back(&mut self) {
        self.selected = None;
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.selected = None;
    }

    /// Returns whether the category group is expanded after the toggle.
    pub fn toggle_category(&mut self, name: &str) -> bool {
        if self.expanded.remove(name) {
            false
        } else {
            self.expanded.insert(name.to_string());
            true
        }
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }
}

/// Hands out increasing tokens so that only the latest request may apply its result.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: u64,
}

impl RequestGeneration {
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

/// The post being read. Rendered nodes and the table of contents live and die
/// with the detail they were computed from.
#[derive(Debug, Default)]
pub struct DetailSession {
    generation: RequestGeneration,
    loading: bool,
    detail: Option<PostDetail>,
    nodes: Vec<Node>,
    toc: Vec<TocEntry>,
    active: Option<String>,
}

impl DetailSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> u64 {
        self.loading = true;
        self.generation.begin()
    }

    /// Applies a finished load. A completion for anything but the latest
    /// request is dropped and `false` is returned.
    pub fn complete(&mut self, token: u64, detail: Option<PostDetail>) -> bool {
        if !self.generation.is_current(token) {
            return false;
        }

        self.loading = false;
        self.set_detail(detail);
        true
    }

    pub async fn open<S: ContentSource>(&mut self, repo: &ContentRepository<S>, record: &PostRecord) -> bool {
        let token = self.begin_load();
        let detail = repo.load_detail(record).await;
        self.complete(token, detail)
    }

    /// Tracks which heading the reader is in, given each heading's top offset in the viewport.
    pub fn on_scroll(&mut self, positions: &[HeadingPosition]) -> Option<&str> {
        self.active = active_section(positions, ACTIVE_SECTION_THRESHOLD).map(str::to_string);
        self.active.as_deref()
    }

    pub fn close(&mut self) {
        // Pending loads are ignored once closed
        self.generation.begin();
        self.loading = false;
        self.set_detail(None);
    }

    fn set_detail(&mut self, detail: Option<PostDetail>) {
        self.nodes = detail.as_ref().map(|d| render(&d.content)).unwrap_or_default();
        self.toc = table_of_contents(&self.nodes);
        self.active = None;
        self.detail = detail;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn detail(&self) -> Option<&PostDetail> {
        self.detail.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::source::DirSource;
    use crate::test_data::{record, POST_SITES};

    use super::*;

    fn detail(id: &str, content: &str) -> PostDetail {
        PostDetail {
            record: record(id, "Study", "2025-01-01T00:00:00.000Z"),
            content: content.to_string(),
        }
    }

    fn position(id: &str, top: f64) -> HeadingPosition {
        HeadingPosition { id: id.to_string(), top }
    }

    #[test]
    fn test_view_state() {
        let mut state = ViewState::default();
        assert_eq!(state.view, View::Blog);

        state.select(record("a", "Study", "2025-01-01"));
        assert_eq!(state.selected.as_ref().map(|r| r.id.as_str()), Some("a"));

        state.change_view(View::About);
        assert_eq!(state.view, View::About);
        assert!(state.selected.is_none());

        state.select(record("b", "CS", "2025-01-01"));
        assert_eq!(state.view, View::Blog);
        state.back();
        assert!(state.selected.is_none());

        state.select(record("c", "CS", "2025-01-01"));
        state.set_category(CategoryFilter::parse("CS"));
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_toggle_category() {
        let mut state = ViewState::default();
        assert!(state.is_expanded("Study"));
        assert!(!state.is_expanded("CS"));
        assert!(state.toggle_category("CS"));
        assert!(state.is_expanded("CS"));
        assert!(!state.toggle_category("Study"));
        assert!(!state.is_expanded("Study"));
        assert!(state.is_expanded("CS"));
    }

    #[test]
    fn test_request_generation() {
        let mut generation = RequestGeneration::default();
        let first = generation.begin();
        let second = generation.begin();
        assert!(second > first);
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn test_latest_request_wins() {
        let mut session = DetailSession::new();
        let first = session.begin_load();
        let second = session.begin_load();

        assert!(session.complete(second, Some(detail("second", "# Two"))));
        assert!(!session.complete(first, Some(detail("first", "# One"))));

        assert_eq!(session.detail().map(|d| d.record.id.as_str()), Some("second"));
        assert_eq!(session.toc().len(), 1);
        assert_eq!(session.toc()[0].text, "Two");
        assert!(!session.is_loading());
    }

    #[test]
    fn test_toc_follows_detail() {
        let mut session = DetailSession::new();
        let token = session.begin_load();
        assert!(session.is_loading());
        session.complete(token, Some(detail("a", "# One\n\n## Two\ntext")));
        let ids: Vec<&str> = session.toc().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["one", "two"]);
        assert_eq!(session.nodes().len(), 4);

        session.close();
        assert!(session.detail().is_none());
        assert!(session.toc().is_empty());
        assert!(session.nodes().is_empty());
    }

    #[test]
    fn test_close_discards_pending_load() {
        let mut session = DetailSession::new();
        let token = session.begin_load();
        session.close();
        assert!(!session.complete(token, Some(detail("late", "# Late"))));
        assert!(session.detail().is_none());
    }

    #[test]
    fn test_on_scroll() {
        let mut session = DetailSession::new();
        let token = session.begin_load();
        session.complete(token, Some(detail("a", "# One\n## Two\n## Three")));
        assert_eq!(session.active(), None);

        let active = session.on_scroll(&[position("one", -300.0), position("two", 40.0), position("three", 600.0)]);
        assert_eq!(active, Some("two"));

        // Back above the first heading nothing is highlighted
        let active = session.on_scroll(&[position("one", 300.0), position("two", 700.0), position("three", 900.0)]);
        assert_eq!(active, None);
        assert_eq!(session.active(), None);
    }

    #[tokio::test]
    async fn test_open_from_repository() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("_posts"))?;
        std::fs::write(dir.path().join("_posts/sites.md"), POST_SITES)?;

        let repo = ContentRepository::new(DirSource::new(dir.path()), "/_posts/index.json");
        let mut session = DetailSession::new();

        assert!(session.open(&repo, &record("sites", "Project", "2025-03-29")).await);
        let toc: Vec<&str> = session.toc().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(toc, ["자주 가는 사이트", "Notes"]);

        // A failed load clears the previous post
        assert!(session.open(&repo, &record("missing", "Project", "2025-03-29")).await);
        assert!(session.detail().is_none());
        Ok(())
    }
}
