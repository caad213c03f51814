use std::net::SocketAddr;

use anyhow::Result;
use granary_gateway::{AppState, build_router};
use granary_platform::{ServiceConfig, connect_database, init_schema};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "granary_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:4000");
    let pool = connect_database(&config.database_url).await?;
    init_schema(&pool).await?;

    let state = AppState { pool };
    let router = build_router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("granary gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
