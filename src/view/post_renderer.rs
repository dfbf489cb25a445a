use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::html_renderer::to_html;
use crate::content::markdown::Node;
use crate::content::toc::TocEntry;
use crate::content::{PostDetail, PostRecord};
use crate::text_utils::format_date_time;

pub const DEFAULT_POST_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
</head>
<body>
<article>
<header>
<span class="category">{{category}}</span>
<h1>{{title}}</h1>
<time datetime="{{iso_date}}">{{date}} {{time}}</time> · <span class="read-time">{{read_time}}</span>
<ul class="tags">{{#tags}}<li>{{tag}}</li>{{/tags}}</ul>
</header>
<nav class="toc">
{{#toc}}<a class="toc-{{level}}" href="#{{id}}">{{text}}</a>
{{/toc}}</nav>
{{{post_content}}}
</article>
<aside class="related">
{{#related}}<a href="{{file}}">{{title}}</a>
{{/related}}</aside>
</body>
</html>
"##;

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewTocEntry<'a> {
    id: &'a str,
    text: &'a str,
    level: u8,
}

#[derive(ramhorns::Content)]
struct ViewRelated<'a> {
    title: &'a str,
    file: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    title: &'a str,
    category: &'a str,
    iso_date: &'a str,
    date: &'a str,
    time: &'a str,
    read_time: &'a str,
    tags: &'a Vec<ViewTag<'a>>,
    toc: &'a Vec<ViewTocEntry<'a>>,
    post_content: &'a str,
    related: &'a Vec<ViewRelated<'a>>,
}

/// Full HTML page for one post.
pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, detail: &PostDetail, nodes: &[Node], toc: &[TocEntry], related: &[&PostRecord]) -> String {
        let record = &detail.record;
        let ref tags: Vec<ViewTag> = record.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect();
        let ref toc: Vec<ViewTocEntry> = toc.iter()
            .map(|e| ViewTocEntry { id: e.id.as_str(), text: e.text.as_str(), level: e.level })
            .collect();
        let ref related: Vec<ViewRelated> = related.iter()
            .map(|r| ViewRelated { title: r.title.as_str(), file: r.file.as_str() })
            .collect();

        // A manifest written by hand may carry a date we can't read; show it as is
        let (date, time) = match record.instant() {
            Some(instant) => format_date_time(&instant),
            None => (record.date.clone(), String::new()),
        };
        let post_content = to_html(nodes);

        self.template.render(&ViewItem {
            title: record.title.as_str(),
            category: record.category.as_str(),
            iso_date: record.date.as_str(),
            date: date.as_str(),
            time: time.as_str(),
            read_time: record.read_time.as_str(),
            tags,
            toc,
            post_content: post_content.as_str(),
            related,
        })
    }
}
