//! Whitelist server - HTTP adapter for whitelist commands and location
//! autocomplete.

mod refresh;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use whitelist::io::backend::backend_from_config;
use whitelist::io::config::{DEFAULT_CONFIG_PATH, load_config};
use whitelist::service::WhitelistService;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "whitelist-server")]
#[command(about = "HTTP front end for the exclusive-join whitelist")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whitelist_server=info".parse()?)
                .add_directive("whitelist=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let cfg = load_config(&args.config)?;
    let backend = backend_from_config(&cfg).context("configure backend")?;
    let service = WhitelistService::new(backend);
    let service = if cfg.server.serialize_writes {
        service.with_serialized_writes()
    } else {
        service
    };
    info!(
        config = %args.config.display(),
        serialize_writes = cfg.server.serialize_writes,
        "starting whitelist-server"
    );

    let state = AppState::new(service);
    refresh::spawn_refresh(
        state.clone(),
        Duration::from_secs(cfg.server.refresh_interval_secs),
    );

    let app = Router::new()
        .nest("/api", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
