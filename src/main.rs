use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use spdlog::{info, warn};

use inkpost::config::{open_config, Config, CONFIG_SAMPLE};
use inkpost::content::html_renderer::to_html;
use inkpost::logger::configure_logger;
use inkpost::manifest::ManifestBuilder;
use inkpost::repository::source::AnySource;
use inkpost::repository::{CategoryFilter, ContentRepository, ALL_CATEGORIES};
use inkpost::server::server_run;
use inkpost::session::DetailSession;
use inkpost::view::post_renderer::{PostRenderer, DEFAULT_POST_TEMPLATE};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the first inkpost.toml found
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scans the content directory and writes the post manifest (default)
    Build(BuildArgs),
    /// Serves the public directory over HTTP
    Serve(ServeArgs),
    /// Lists posts from the manifest
    List(ListArgs),
    /// Renders a single post
    Show(ShowArgs),
    /// Prints a sample configuration file
    Config,
}

#[derive(Args, Debug, Default)]
struct BuildArgs {
    /// Directory with the markdown posts
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Directory served as "/", post paths in the manifest are relative to it
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(short, long)]
    address: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Serve the current manifest without rebuilding it
    #[arg(long)]
    skip_build: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Directory or http(s) base URL the posts are read from
    #[arg(short, long)]
    source: Option<String>,

    /// Only posts of this category
    #[arg(long, default_value = ALL_CATEGORIES)]
    category: String,

    /// Case-insensitive text searched in title, excerpt and tags
    #[arg(short, long, default_value = "")]
    query: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Post id
    id: String,

    /// Directory or http(s) base URL the posts are read from
    #[arg(short, long)]
    source: Option<String>,

    /// Render a full HTML page instead of the body only
    #[arg(long)]
    html: bool,
}

fn build_cmd(mut config: Config, args: BuildArgs) -> Result<()> {
    if let Some(content_dir) = args.content_dir {
        config.paths.content_dir = content_dir;
    }
    if let Some(public_dir) = args.public_dir {
        config.paths.public_dir = public_dir;
    }

    let report = ManifestBuilder::new(&config).build()?;
    if !report.skipped.is_empty() {
        warn!("{} post(s) left out of {}", report.skipped.len(), report.index_path.display());
    }

    Ok(())
}

async fn serve_cmd(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if !args.skip_build {
        ManifestBuilder::new(&config).build()?;
    }

    server_run(config).await.context("Error running server")
}

async fn open_repository(config: &Config, source: Option<String>) -> Result<ContentRepository<AnySource>> {
    let source = source.unwrap_or_else(|| config.client.source.clone());
    let mut repo = ContentRepository::new(AnySource::from_location(&source), &config.index_url_path())
        .with_chars_per_minute(config.build.chars_per_minute);
    repo.try_load_manifest()
        .await
        .with_context(|| format!("Error loading posts from {}", source))?;
    Ok(repo)
}

async fn list_cmd(config: Config, args: ListArgs) -> Result<()> {
    let repo = open_repository(&config, args.source).await?;
    let category = CategoryFilter::parse(&args.category);

    for post in repo.filter(&category, &args.query) {
        let date = post.instant().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        println!("{}  {:<12} {:<6} {}  [{}]", date, post.category, post.read_time, post.title, post.id);
    }

    let mut counts = vec![format!("{} ({})", ALL_CATEGORIES, repo.category_count(&CategoryFilter::All))];
    counts.extend(repo.categories().into_iter().map(|c| format!("{} ({})", c.name, c.count)));
    println!("\n{}", counts.join(" | "));

    Ok(())
}

async fn show_cmd(config: Config, args: ShowArgs) -> Result<()> {
    let repo = open_repository(&config, args.source).await?;
    let record = match repo.find(&args.id) {
        Some(record) => record.clone(),
        None => bail!("No post with id {}", args.id),
    };

    let mut session = DetailSession::new();
    session.open(&repo, &record).await;
    let detail = match session.detail() {
        Some(detail) => detail,
        None => bail!("Error loading post {} from {}", record.id, record.file),
    };
    let related = repo.related(&record, config.client.related_limit);

    if args.html {
        let renderer = PostRenderer::new(DEFAULT_POST_TEMPLATE)?;
        print!("{}", renderer.render(detail, session.nodes(), session.toc(), &related));
        return Ok(());
    }

    println!("{} · {} · {}", detail.record.title, detail.record.category, detail.record.read_time);
    for entry in session.toc() {
        println!("{}- {} (#{})", "  ".repeat(entry.level.saturating_sub(1) as usize), entry.text, entry.id);
    }
    println!();
    print!("{}", to_html(session.nodes()));
    if !related.is_empty() {
        println!();
        for post in related {
            println!("related: {}  [{}]", post.title, post.id);
        }
    }

    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Build(BuildArgs::default()));

    if let Command::Config = command {
        print!("{}", CONFIG_SAMPLE);
        return Ok(());
    }

    let config = open_config(cli.config.as_deref())?;
    configure_logger(&config.log).map_err(|e| anyhow!("Error configuring logger: {}", e))?;
    info!("Content dir: {}", config.paths.content_dir.display());

    match command {
        Command::Build(args) => build_cmd(config, args),
        Command::Serve(args) => serve_cmd(config, args).await,
        Command::List(args) => list_cmd(config, args).await,
        Command::Show(args) => show_cmd(config, args).await,
        Command::Config => Ok(()),
    }
}
