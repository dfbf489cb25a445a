use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::content::content_file::to_public_path;

pub const CFG_FILE_NAME: &str = "inkpost.toml";

pub const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
# Served as "/" by `inkpost serve`
public_dir = "public"
# Markdown posts. The manifest is written here as well
content_dir = "public/_posts"
index_file = "index.json"

[build]
# Reading speed used to estimate readTime when a post does not set it
chars_per_minute = 600
# What to do with a post whose date can't be parsed: "abort" or "skip"
on_invalid_date = "abort"

[client]
# Where posts are read from: a directory or an http(s) base URL
source = "public"
related_limit = 5

[server]
address = "127.0.0.1"
port = 8001

[log]
level = "Info"
log_to_console = true
# location = "logs/inkpost.log"
"#;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Paths {
    pub public_dir: PathBuf,
    pub content_dir: PathBuf,
    pub index_file: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            public_dir: PathBuf::from("public"),
            content_dir: PathBuf::from("public/_posts"),
            index_file: "index.json".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDatePolicy {
    /// Stop the build, nothing is written
    Abort,
    /// Leave the post out of the manifest and carry on
    Skip,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Build {
    pub chars_per_minute: usize,
    pub on_invalid_date: InvalidDatePolicy,
}

impl Default for Build {
    fn default() -> Self {
        Build {
            chars_per_minute: crate::read_time::DEFAULT_CHARS_PER_MINUTE,
            on_invalid_date: InvalidDatePolicy::Abort,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Client {
    pub source: String,
    pub related_limit: usize,
}

impl Default for Client {
    fn default() -> Self {
        Client {
            source: "public".to_string(),
            related_limit: 5,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            address: "127.0.0.1".to_string(),
            port: 8001,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: LogLevel::Info,
            log_to_console: true,
            location: None,
        }
    }
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub build: Build,
    pub client: Client,
    pub server: Server,
    pub log: Log,
}

impl Config {
    pub fn index_path(&self) -> PathBuf {
        self.paths.content_dir.join(&self.paths.index_file)
    }

    /// URL path the manifest is served at, `/_posts/index.json` by default.
    pub fn index_url_path(&self) -> String {
        to_public_path(&self.paths.public_dir, &self.index_path())
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    if !path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    match (exe_dir, path.strip_prefix("${exe_dir}")) {
        (Some(exe_dir), Ok(rest)) => exe_dir.join(rest),
        _ => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths.public_dir = parse_path(cfg.paths.public_dir);
    cfg.paths.content_dir = parse_path(cfg.paths.content_dir);
    cfg.log.location = cfg.log.location.map(parse_path);

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

/// First `inkpost.toml` found next to the executable, in the current directory
/// or in the user config directory.
pub fn find_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    let cur_dir = env::current_dir().ok();
    let cfg_dir = dirs::config_dir().map(|dir| dir.join("inkpost"));

    [exe_dir, cur_dir, cfg_dir]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

/// An explicit path must exist. Without one, a missing file means built-in defaults.
pub fn open_config(cfg_path: Option<&Path>) -> io::Result<Config> {
    match cfg_path {
        Some(path) => read_config(path),
        None => match find_config_path() {
            Some(path) => read_config(&path),
            None => Ok(Config::default()),
        },
    }
}
