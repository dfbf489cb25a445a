use std::{fs, io};
use std::path::PathBuf;

use crate::content::content_file::ContentFile;

pub struct PostList {
    pub root_dir: PathBuf,
}

impl PostList {
    /// Markdown files directly inside `root_dir`, in the order the file system lists them.
    pub fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(file_name) = file_name.to_str() {
                if ContentFile::is_markdown(file_name) {
                    posts.push(entry.path());
                }
            }
        }
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieve_files() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.md"), "a")?;
        fs::write(dir.path().join("B.MD"), "b")?;
        fs::write(dir.path().join("index.json"), "[]")?;
        fs::write(dir.path().join("notes.txt"), "c")?;
        fs::create_dir(dir.path().join("folder.md"))?;

        let post_list = PostList { root_dir: dir.path().to_path_buf() };
        let mut names: Vec<String> = post_list.retrieve_files()?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(|n| n.to_string()))
            .collect();
        names.sort();
        assert_eq!(names, ["B.MD", "a.md"]);
        Ok(())
    }

    #[test]
    fn test_missing_dir() {
        let post_list = PostList { root_dir: PathBuf::from("does/not/exist") };
        assert!(post_list.retrieve_files().is_err());
    }
}
