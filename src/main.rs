use std::net::SocketAddr;

use axum::Router;
use letsqueue::{AppConfig, AppState, archive, db, private, public};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let db_pool = db::connect(&config.database_url).await?;
    db::migrate(&db_pool).await?;

    archive::spawn_sweeper(db_pool.clone(), config.sweep_interval_secs);

    // the frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState { db_pool, config };
    let app = Router::new()
        .nest("/api/public-lobbies", public::router())
        .nest("/api/private-lobbies", private::router())
        .with_state(app_state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "letsqueue listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
