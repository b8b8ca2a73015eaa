//! Relay service entrypoint: the submission API and the relay pipeline,
//! sharing one store.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pathway_rs::relay::RelayContext;
use pathway_rs::{api, Clients, Config, InMemoryStore, Queues};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;
    let store = Arc::new(InMemoryStore::new());

    let ctx = RelayContext {
        clients: Clients::from_config(&config)?,
        store: store.clone(),
        queues: Queues::in_memory(),
        relay: config.relay.clone(),
    };

    let router = api::router(store);
    let listener = tokio::net::TcpListener::bind(config.api_listen_addr).await?;
    info!(addr = %config.api_listen_addr, "submission API listening");

    tokio::select! {
        result = axum::serve(listener, router) => result?,
        result = ctx.run() => result?,
    }
    Ok(())
}
