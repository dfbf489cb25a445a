use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Where the manifest and post files are read from. Paths are the
/// root-relative URL paths stored in the manifest, e.g. `/_posts/index.json`.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn fetch_text(&self, path: &str) -> Result<String>;
}

/// Static files served over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        HttpSource {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ContentSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        let response = self.client.get(&url)
            .send()
            .await
            .with_context(|| format!("Error requesting {}", url))?
            .error_for_status()
            .with_context(|| format!("Error response from {}", url))?;
        let text = response.text()
            .await
            .with_context(|| format!("Error reading body of {}", url))?;
        Ok(text)
    }
}

/// The public directory on disk, read as if it were being served.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: &Path) -> Self {
        DirSource { root: root.to_path_buf() }
    }

    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => bail!("Access forbidden: {}", path),
            }
        }
        Ok(resolved)
    }
}

impl ContentSource for DirSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let file_path = self.resolve(path)?;
        let text = tokio::fs::read_to_string(&file_path)
            .await
            .with_context(|| format!("Error reading {}", file_path.display()))?;
        Ok(text)
    }
}

/// `http://` and `https://` locations are fetched, anything else is a directory.
pub enum AnySource {
    Http(HttpSource),
    Dir(DirSource),
}

impl AnySource {
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            AnySource::Http(HttpSource::new(location))
        } else {
            AnySource::Dir(DirSource::new(Path::new(location)))
        }
    }
}

impl ContentSource for AnySource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        match self {
            AnySource::Http(source) => source.fetch_text(path).await,
            AnySource::Dir(source) => source.fetch_text(path).await,
        }
    }
}
