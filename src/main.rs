use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod blog;
mod config;
mod content_loader;
mod error;
mod hot_reload;
mod markdown;
mod models;
mod post_render;
mod prerender;
mod server;
mod state;
mod views;

use config::{RuntimeEnv, SiteConfig, DEFAULT_CONFIG_FILE};
use content_loader::load_content;
use state::{AppState, RouterState};

#[derive(Parser)]
#[command(name = "cs-blog")]
#[command(about = "Personal blog server and static site builder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the site config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site (default)
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Pre-render every route to static HTML
    Build {
        /// Output directory, overrides `out_dir` in the config
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SiteConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Build { out_dir } => build(config, out_dir).await,
    }
}

async fn serve(config: SiteConfig, port: Option<u16>) -> anyhow::Result<()> {
    let env = RuntimeEnv::from_env();
    info!("RUST_ENV is set to development: {}", env.is_development);

    let content = load_content(&config.content_dir)
        .await
        .context("Failed to load initial content files")?;
    info!(posts = content.posts.len(), "content loaded");

    let state = Arc::new(AppState::new(config, content, env.is_development));

    let (tx, _rx) = broadcast::channel(1);
    if env.is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        hot_reload::start_content_watcher(tx.clone(), state.clone());
    }

    let app = server::router(RouterState {
        app_state: state,
        broadcaster: tx,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(env.port)));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build(config: SiteConfig, out_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());
    let report = prerender::build(&config, &out_dir).await?;
    info!(
        pages = report.pages,
        posts = report.posts,
        assets = report.assets,
        "Built {} in {}ms",
        config.project_name,
        report.duration_ms
    );
    info!("Output: {}", report.out_dir.display());
    Ok(())
}
