//! Line based markdown reader used for post bodies.
//!
//! Rendering runs in two passes. Every line is first classified into a
//! [`LineToken`]; the tokens are then folded into display [`Node`]s, with
//! paragraph text split into [`Inline`] runs. Only headers, fenced code,
//! inline code, bold and italic are understood; anything else is text.

use lazy_static::lazy_static;
use regex::Regex;

const CODE_FENCE: &str = "```";

lazy_static! {
    static ref HEADER_REGEX: Regex = Regex::new(r"^(#{1,6})\s+(.+)$").unwrap();
    static ref CODE_SPAN_REGEX: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BOLD_REGEX: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref ITALIC_REGEX: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken<'a> {
    Header { level: u8, text: &'a str },
    CodeFence { info: &'a str },
    Paragraph(&'a str),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    InlineCode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Header { level: u8, id: String, text: String },
    CodeBlock { language: String, code: String },
    Paragraph(Vec<Inline>),
    LineBreak,
}

pub fn classify(line: &str) -> LineToken {
    if let Some(info) = line.strip_prefix(CODE_FENCE) {
        return LineToken::CodeFence { info: info.trim() };
    }

    if let Some(caps) = HEADER_REGEX.captures(line) {
        if let (Some(marks), Some(text)) = (caps.get(1), caps.get(2)) {
            return LineToken::Header {
                level: marks.as_str().len() as u8,
                text: text.as_str(),
            };
        }
    }

    if line.trim().is_empty() {
        LineToken::Blank
    } else {
        LineToken::Paragraph(line)
    }
}

fn split_lines(content: &str) -> impl Iterator<Item=&str> {
    content.lines()
}

pub fn tokenize(content: &str) -> Vec<LineToken> {
    split_lines(content).map(classify).collect()
}

/// Lowercased header text where everything but ASCII letters, digits and
/// Hangul syllables becomes `-`.
pub fn anchor_id(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '가'..='힣' => c,
            _ => '-',
        })
        .collect()
}

struct OpenFence<'a> {
    fence_line: &'a str,
    language: &'a str,
    lines: Vec<&'a str>,
}

pub fn render(content: &str) -> Vec<Node> {
    let mut nodes = vec![];
    let mut fence: Option<OpenFence> = None;

    for line in split_lines(content) {
        let token = classify(line);

        if let Some(open) = fence.as_mut() {
            if let LineToken::CodeFence { .. } = token {
                let mut code = String::new();
                for code_line in open.lines.iter() {
                    code.push_str(code_line);
                    code.push('\n');
                }
                nodes.push(Node::CodeBlock {
                    language: open.language.to_string(),
                    code,
                });
                fence = None;
            } else {
                open.lines.push(line);
            }
            continue;
        }

        match token {
            LineToken::CodeFence { info } => {
                fence = Some(OpenFence {
                    fence_line: line,
                    language: info,
                    lines: vec![],
                });
            }
            LineToken::Header { level, text } => nodes.push(Node::Header {
                level,
                id: anchor_id(text),
                text: text.to_string(),
            }),
            LineToken::Paragraph(text) => nodes.push(Node::Paragraph(parse_inline(text))),
            LineToken::Blank => nodes.push(Node::LineBreak),
        }
    }

    // A fence that never closes is shown as it was written
    if let Some(open) = fence {
        nodes.push(literal(open.fence_line));
        for line in open.lines {
            nodes.push(literal(line));
        }
    }

    nodes
}

fn literal(line: &str) -> Node {
    if line.trim().is_empty() {
        Node::LineBreak
    } else {
        Node::Paragraph(vec![Inline::Text(line.to_string())])
    }
}

/// Splits a paragraph into runs. Code spans are taken first, then `**bold**`,
/// then `*italic*`. Emphasis does not nest and unmatched markers stay text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut runs = vec![];
    split_runs(text, &CODE_SPAN_REGEX, &mut runs, Inline::InlineCode, |t, runs| {
        split_runs(t, &BOLD_REGEX, runs, Inline::Bold, |t, runs| {
            split_runs(t, &ITALIC_REGEX, runs, Inline::Italic, push_text);
        });
    });
    runs
}

fn split_runs<M, F>(text: &str, regex: &Regex, runs: &mut Vec<Inline>, make: M, mut between: F)
    where
        M: Fn(String) -> Inline,
        F: FnMut(&str, &mut Vec<Inline>),
{
    let mut last = 0;
    for caps in regex.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        between(&text[last..whole.start()], runs);
        runs.push(make(inner.as_str().to_string()));
        last = whole.end();
    }
    between(&text[last..], runs);
}

fn push_text(text: &str, runs: &mut Vec<Inline>) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = runs.last_mut() {
        prev.push_str(text);
    } else {
        runs.push(Inline::Text(text.to_string()));
    }
}
