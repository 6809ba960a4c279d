use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Explorer, TmdbClient};
use shared::domain::{Category, MovieId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::load_settings;
use render::{render_detail, render_list, ImageLinks};

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Browse, search and inspect movies from TMDB")]
struct Args {
    /// Settings file (defaults to ./explorer.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// TMDB read access token; overrides file and environment.
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of a category.
    Browse {
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search movies by title.
    Search {
        text: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one movie with its director and main cast.
    Detail { id: i64 },
    /// Interactive browsing (default).
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(token) = args.token {
        settings.api_token = Some(token);
    }
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(language) = args.language {
        settings.language = Some(language);
    }

    let client = TmdbClient::new(settings.api_config()?).context("failed to set up TMDB client")?;
    let images = ImageLinks::from_settings(&settings);

    match args.command.unwrap_or(Command::Shell) {
        Command::Browse { category, page } => {
            let category = category.unwrap_or(settings.default_category);
            let explorer = Explorer::new(Arc::new(client), category);
            let mut snapshot = explorer.open().await;
            if page > 1 {
                snapshot = explorer.go_to_page(page).await;
                if snapshot.result.current_page != page {
                    warn!(page, total_pages = snapshot.result.total_pages, "page out of range");
                }
            }
            print!("{}", render_list(&snapshot));
        }
        Command::Search { text, page } => {
            let explorer = Explorer::new(Arc::new(client), settings.default_category);
            let mut snapshot = explorer.open_search(&text).await;
            if page > 1 {
                snapshot = explorer.go_to_page(page).await;
            }
            print!("{}", render_list(&snapshot));
        }
        Command::Detail { id } => {
            let explorer = Explorer::new(Arc::new(client), settings.default_category);
            let snapshot = explorer.load_detail(MovieId(id)).await;
            print!("{}", render_detail(&snapshot, &images));
        }
        Command::Shell => {
            info!(category = %settings.default_category, "starting interactive shell");
            let explorer = Arc::new(Explorer::new(Arc::new(client), settings.default_category));
            shell::run(explorer, images).await?;
        }
    }

    Ok(())
}
