use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod collaborators;
mod config;
mod db;
mod error;
mod extract;
mod middleware;
mod modules;
mod services;

use collaborators::mail::{LogMailer, Mailer};
use collaborators::storage::{BlobStorage, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let env = config::init()
        .context("Failed to load configuration")?
        .clone();

    let db = db::init_pool()
        .await
        .context("Failed to initialize database")?;

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
    let storage: Arc<dyn BlobStorage> = Arc::new(LocalStorage::new(
        &env.storage.root_dir,
        &env.storage.public_base_url,
    ));

    let state = app_state::AppState::new(db, env.clone(), mailer, storage);
    let app = app::create_router(state);

    let addr = env.server_addr();
    info!("{} listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
