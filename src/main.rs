mod config;
mod content_client;
mod domain;
mod progress;
mod reader;
mod reader_api;
mod storage;
mod views;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use config::{Config, ProgressBackend};
use content_client::{ContentClient, ContentService};
use migration::MigratorTrait;
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use progress::ProgressStore;
use reader::ReaderSessions;
use sea_orm::Database;
use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type ReaderResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> ReaderResult<()> {
    // Initialize tracing (logs). Respect RUST_LOG if set,
    // default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,h2=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting novel reader");
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load();
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!(e));
    }

    let storage: Arc<dyn KeyValueStorage> = match config.backend().map_err(anyhow::Error::msg)? {
        ProgressBackend::Sqlite => {
            let db_conn = Database::connect(&config.db_connection_string)
                .await
                .with_context(|| "Failed to connect to database")?;
            migration::Migrator::up(&db_conn, None)
                .await
                .with_context(|| "Failed to run database migrations")?;
            Arc::new(SqliteStorage::new(Arc::new(db_conn)))
        }
        ProgressBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    tracing::info!(
        backend = %config.progress_backend,
        key = %config.progress_storage_key,
        "configured progress storage"
    );
    let store = Arc::new(ProgressStore::new(storage, &config.progress_storage_key));

    let client =
        ContentClient::new(&config.content_base_url)?.with_api_key(&config.content_api_key);
    let has_api_key = !config.content_api_key.is_empty();
    tracing::info!(
        content_base = %config.content_base_url,
        has_api_key,
        "configured content client"
    );
    let content: Arc<dyn ContentService> = Arc::new(client);

    let api = reader_api::ReaderApi {
        sessions: Arc::new(ReaderSessions::new(content.clone())),
        content,
        store,
    };
    run_poem(api, &config.bind_addr).await?;
    Ok(())
}

pub async fn run_poem(api: reader_api::ReaderApi, bind_addr: &str) -> ReaderResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api_service = OpenApiService::new(api, "Novel Reader API", version)
        .server(format!("http://{}", bind_addr));
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}
