use serde::Serialize;

use crate::content::markdown::{render, Node};

/// Scroll offset, in pixels from the top of the viewport, at which a heading becomes current.
pub const ACTIVE_SECTION_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Where a rendered heading currently sits relative to the viewport top.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    pub id: String,
    pub top: f64,
}

/// Headings of a rendered post, in document order. Lines inside code blocks are not headings.
pub fn table_of_contents(nodes: &[Node]) -> Vec<TocEntry> {
    nodes.iter()
        .filter_map(|node| match node {
            Node::Header { level, id, text } => Some(TocEntry {
                id: id.clone(),
                text: text.clone(),
                level: *level,
            }),
            _ => None,
        })
        .collect()
}

pub fn toc_from_markdown(content: &str) -> Vec<TocEntry> {
    table_of_contents(&render(content))
}

/// The last heading, in document order, that has scrolled up to `threshold` or beyond.
pub fn active_section(headings: &[HeadingPosition], threshold: f64) -> Option<&str> {
    let mut current = None;
    for heading in headings {
        if heading.top <= threshold {
            current = Some(heading.id.as_str());
        }
    }
    current
}
