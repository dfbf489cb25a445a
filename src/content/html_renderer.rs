use crate::content::markdown::{Inline, Node};

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_inline(html: &mut String, runs: &[Inline]) {
    for run in runs {
        match run {
            Inline::Text(text) => html.push_str(&escape_html(text)),
            Inline::Bold(text) => {
                html.push_str("<strong>");
                html.push_str(&escape_html(text));
                html.push_str("</strong>");
            }
            Inline::Italic(text) => {
                html.push_str("<em>");
                html.push_str(&escape_html(text));
                html.push_str("</em>");
            }
            Inline::InlineCode(text) => {
                html.push_str("<code>");
                html.push_str(&escape_html(text));
                html.push_str("</code>");
            }
        }
    }
}

/// One element per node, one node per line.
pub fn to_html(nodes: &[Node]) -> String {
    let mut html = String::new();
    for node in nodes {
        match node {
            Node::Header { level, id, text } => {
                html.push_str(&format!("<h{} id=\"{}\">{}</h{}>", level, escape_html(id), escape_html(text), level));
            }
            Node::CodeBlock { language, code } => {
                if language.is_empty() {
                    html.push_str("<pre><code>");
                } else {
                    html.push_str(&format!("<pre><code class=\"language-{}\">", escape_html(language)));
                }
                html.push_str(&escape_html(code));
                html.push_str("</code></pre>");
            }
            Node::Paragraph(runs) => {
                html.push_str("<p>");
                push_inline(&mut html, runs);
                html.push_str("</p>");
            }
            Node::LineBreak => html.push_str("<br />"),
        }
        html.push('\n');
    }
    html
}
