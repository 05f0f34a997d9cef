use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svodka::modules::news::crud::NewsCrud;
use svodka::{config, modules, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("svodka=info")),
        )
        .init();

    let db = config::database::connect().await;

    NewsCrud::new(&db).ensure_indexes().await?;

    let state = AppState::new(db);

    let app = Router::new()
        .merge(modules::news::routes::routes())
        .merge(modules::captions::routes::routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server running");
    axum::serve(listener, app).await?;

    Ok(())
}
