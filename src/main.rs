use axum::{routing::get, Router};
use polish_poker::{
    room::start_cleanup_task, websockets::websocket_handler, AppError, AppState, ServerConfig,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polish_poker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Polish Poker server");

    let config = ServerConfig::load()?;
    info!(
        deck = config.room.deck_variant.card_count(),
        grace_ms = config.room.reconnect_grace.as_millis() as u64,
        heartbeat_secs = config.heartbeat_interval.as_secs(),
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let cleanup = config.cleanup.clone();
    let app_state = AppState::from_config(config);

    tokio::spawn(start_cleanup_task(app_state.directory.clone(), cleanup));

    let app = Router::new()
        .route("/", get(|| async { "Polish Poker" }))
        .route("/socket", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
