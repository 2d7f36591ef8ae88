mod app;
mod config;
mod details;
mod http;
mod models;
mod omdb;
mod repl;
mod search;
mod stats;
mod storage;
mod view;
mod watched;

use anyhow::Result;
use app::App;
use clap::{Parser, Subcommand};
use config::Configuration;
use http::HttpClient;
use omdb::OmdbClient;
use std::sync::Arc;
use storage::FileStorage;
use tracing::{info, warn};
use watched::WatchedStore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// OMDb API key, overrides the configuration file
    #[arg(long)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search movies by title
    Search { query: String },
    /// Show details for a movie id
    Show { id: String },
    /// Rate a movie and add it to the watched list
    Add {
        id: String,
        #[arg(short, long)]
        rating: u8,
    },
    /// Remove a movie from the watched list
    Remove { id: String },
    /// Show the watched list and its stats
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Configuration::load_or_default(&cli.config)?;
    if let Some(api_key) = cli.api_key {
        config.set_api_key(api_key);
    }
    if config.api_key().trim().is_empty() {
        warn!("No OMDb API key configured; set omdb.apikey in {} or pass --api-key", cli.config);
    }

    let http_client = HttpClient::new(config.request_timeout())?;
    let api = Arc::new(OmdbClient::new(
        http_client,
        config.base_url(),
        config.api_key().to_string(),
    )?);

    let storage_path = config.storage_path();
    info!("Using storage at {}", storage_path.display());
    let store = WatchedStore::load(FileStorage::new(storage_path))?;

    let mut app = App::new(api, store, config.min_query_length(), config.max_stars());

    match cli.command {
        None => repl::run(&mut app).await?,
        Some(Command::Search { query }) => {
            print!("{}", view::render_search(&app.set_query(&query).await));
        }
        Some(Command::Show { id }) => {
            app.select(&id).await;
            let state = app.detail_state();
            print!(
                "{}",
                view::render_detail(&state, app.watched_entry(&id), app.max_stars())
            );
        }
        Some(Command::Add { id, rating }) => {
            let entry = app.add_by_id(&id, rating).await?;
            println!("Added {} with rating {}", entry.title, entry.user_rating);
            print!("{}", view::render_stats(&app.stats()));
        }
        Some(Command::Remove { id }) => {
            let removed = app.remove_watched(&id)?;
            if removed == 0 {
                println!("{} is not in your watched list", id);
            } else {
                print!("{}", view::render_stats(&app.stats()));
                print!("{}", view::render_watched(app.watched()));
            }
        }
        Some(Command::List) => {
            print!("{}", view::render_stats(&app.stats()));
            print!("{}", view::render_watched(app.watched()));
        }
    }

    Ok(())
}
