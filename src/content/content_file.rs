use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const MARKDOWN_EXTENSION: &str = ".md";

pub struct ContentFile {
    pub file_path: PathBuf,
    pub file_name: String,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(file_path: PathBuf) -> io::Result<ContentFile> {
        let file_name = match file_path.file_name().and_then(|n| n.to_str()) {
            Some(name) if Self::is_markdown(name) => name.to_string(),
            _ => return Err(io::Error::new(ErrorKind::Unsupported, format!("Not a markdown file: {}", file_path.display()))),
        };

        let raw_content = fs::read_to_string(&file_path)?;

        Ok(ContentFile {
            file_path,
            file_name,
            raw_content,
        })
    }

    pub fn is_markdown(file_name: &str) -> bool {
        file_name.to_lowercase().ends_with(MARKDOWN_EXTENSION)
    }

    /// File name without the markdown extension: `2025-03-29-sites.md` -> `2025-03-29-sites`
    pub fn base_name(&self) -> &str {
        strip_markdown_extension(&self.file_name)
    }

    /// URL path of this file when `public_root` is served as `/`.
    pub fn public_path(&self, public_root: &Path) -> String {
        to_public_path(public_root, &self.file_path)
    }
}

pub fn strip_markdown_extension(file_name: &str) -> &str {
    let ext_start = file_name.len().saturating_sub(MARKDOWN_EXTENSION.len());
    match file_name.get(ext_start..) {
        Some(ext) if ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION) => &file_name[..ext_start],
        _ => file_name,
    }
}

/// Absolute form of `path` with `.` and `..` folded away, without touching the filesystem.
fn absolute_path(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `public/_posts/a.md` served from `public` becomes `/_posts/a.md`, however
/// either path is spelled. A file outside the served root is placed under the
/// name of its own directory: `drafts/_posts/a.md` becomes `/_posts/a.md`.
pub fn to_public_path(public_root: &Path, file_path: &Path) -> String {
    let public_root = absolute_path(public_root);
    let file_path = absolute_path(file_path);

    let parts: Vec<String> = match file_path.strip_prefix(&public_root) {
        Ok(relative) => relative.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect(),
        Err(_) => {
            let dir_name = file_path.parent().and_then(|dir| dir.file_name());
            [dir_name, file_path.file_name()]
                .into_iter()
                .flatten()
                .map(|part| part.to_string_lossy().to_string())
                .collect()
        }
    };

    format!("/{}", parts.join("/"))
}
