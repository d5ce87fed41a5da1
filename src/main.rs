mod debate;
mod event;
mod room;
mod shared;
mod websockets;

use axum::{
    routing::{get, post},
    Router,
};
use event::EventBus;
use room::store::RoomStore;
use shared::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rostrum=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting debate session coordinator");

    let store = Arc::new(RoomStore::new());
    let event_bus = EventBus::new();
    let app_state = AppState::new(Arc::clone(&store), event_bus);

    // Abandoned rooms are only ever reclaimed by this sweep
    tokio::spawn(room::start_cleanup_task(
        store,
        room::CleanupConfig::default(),
    ));

    let app = Router::new()
        .route("/rooms", post(room::create_room))
        .route("/rooms/:code", get(room::get_room))
        .route("/rooms/:code/join", post(room::join_room))
        .route("/rooms/:code/start", post(room::begin_debate))
        .route("/rooms/:code/turns", post(room::submit_turn))
        .route("/rooms/:code/voting/start", post(room::begin_voting))
        .route("/rooms/:code/votes", post(room::cast_vote))
        .route("/rooms/:code/events", get(websockets::room_events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
