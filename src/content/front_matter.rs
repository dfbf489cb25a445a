use std::io;
use std::io::ErrorKind;

use serde_json::{Map, Value};

const FENCE: &str = "---";

/// Metadata block and body of a post file.
///
/// ```text
/// ---
/// title: Sites I like
/// date: 2025-03-29
/// category: Project
/// tags: [web, links]
/// ---
/// Body starts here
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub metadata: Map<String, Value>,
    pub body: String,
}

impl FrontMatter {
    /// A file without a complete `---` block has no metadata and is all body.
    pub fn parse(raw: &str) -> io::Result<FrontMatter> {
        let Some((yaml, body)) = split_block(raw) else {
            return Ok(FrontMatter {
                metadata: Map::new(),
                body: raw.to_string(),
            });
        };

        let metadata = if yaml.trim().is_empty() {
            Map::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml) {
                Ok(Value::Object(map)) => map,
                Ok(Value::Null) => Map::new(),
                Ok(other) => return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Front matter must be a list of key: value pairs, found {}", other))),
                Err(e) => return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Error parsing front matter: {}", e))),
            }
        };

        Ok(FrontMatter {
            metadata,
            body: body.to_string(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.metadata.get(key) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Present and not empty: null, `""` and `false` count as missing.
    pub fn has(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }
}

/// Removes a leading front matter block and the blank lines after it.
pub fn strip_front_matter(raw: &str) -> &str {
    match split_block(raw) {
        Some((_, body)) => body.trim_start_matches(['\r', '\n']),
        None => raw,
    }
}

fn trim_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

// (block content, body)
fn split_block(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');

    let first = lines.next()?;
    if trim_eol(first) != FENCE {
        return None;
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if trim_eol(line) == FENCE {
            return Some((&raw[block_start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}
