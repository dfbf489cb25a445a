use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ntex::web;
use ntex_files::NamedFile;
use spdlog::info;

use crate::config::Config;

const INDEX_PAGE: &str = "index.html";

struct AppState {
    public_dir: PathBuf,
}

/// Maps a request path onto the public directory. `None` for anything trying to climb out of it.
fn public_file(public_dir: &Path, path: &str) -> Option<PathBuf> {
    if path.contains("..") {
        return None;
    }

    let path = path.trim_start_matches('/');
    if path.is_empty() || path.ends_with('/') {
        Some(public_dir.join(path).join(INDEX_PAGE))
    } else {
        Some(public_dir.join(path))
    }
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    Ok(NamedFile::open(state.public_dir.join(INDEX_PAGE))?)
}

#[web::get("/{path}*")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let file_path = match public_file(&state.public_dir, &path.into_inner()) {
        Some(file_path) => file_path,
        None => return Err(web::error::ErrorUnauthorized("Access forbidden").into()),
    };

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        public_dir: config.paths.public_dir.clone(),
    });

    info!("Serving {} on http://{}:{}", app_state.public_dir.display(), bind_addr, bind_port);
    info!("Manifest at {}", config.index_url_path());

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(public_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
