use anyhow::Context;
use axum::{
  extract::{Path, State, WebSocketUpgrade},
  http::{Method, StatusCode},
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use dashmap::DashMap;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod protocol;
mod shared;
mod transport;

use game::config::SimConfig;
use game::constants::TICK_MS;
use game::room::Room;
use shared::names::sanitize_session_name;

const DEFAULT_SESSION: &str = "main";

struct AppState {
  rooms: DashMap<String, Arc<Room>>,
  config: SimConfig,
  tick_ms: u64,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
  ok: bool,
  error: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = SimConfig::load().context("failed to load simulation config")?;
  let tick_ms = env::var("TICK_MS")
    .ok()
    .and_then(|value| value.parse::<u64>().ok())
    .filter(|value| *value > 0)
    .unwrap_or(TICK_MS);

  let state = Arc::new(AppState {
    rooms: DashMap::new(),
    config,
    tick_ms,
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/session/:name", get(ws_handler))
    .route("/api/session/:name/snapshot", get(snapshot_handler))
    .layer(cors)
    .with_state(state);

  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|value| value.parse().ok())
    .unwrap_or(8787);

  let address = format!("0.0.0.0:{port}");
  tracing::info!(tick_ms, "listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

impl AppState {
  fn room(&self, name: String) -> Arc<Room> {
    self.prune_idle_rooms();
    match self.rooms.entry(name) {
      dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        tracing::info!(room = %entry.key(), "creating session room");
        let room = Arc::new(Room::new(entry.key().clone(), self.config.clone(), self.tick_ms));
        entry.insert(room.clone());
        room
      }
    }
  }

  fn existing_room(&self, name: &str) -> Option<Arc<Room>> {
    self.rooms.get(name).map(|entry| entry.value().clone())
  }

  /// Drops rooms nobody holds: no socket attached and no tick loop alive.
  fn prune_idle_rooms(&self) {
    self.rooms.retain(|name, room| {
      let idle = Arc::strong_count(room) == 1 && !room.is_running();
      if idle {
        tracing::debug!(room = %name, "evicting idle room");
      }
      !idle
    });
  }
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Path(name): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let room = state.room(sanitize_session_name(&name, DEFAULT_SESSION));
  ws.on_upgrade(move |socket| async move {
    transport::ws_session::handle_socket(socket, room).await;
    state.prune_idle_rooms();
  })
}

async fn snapshot_handler(
  Path(name): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let name = sanitize_session_name(&name, DEFAULT_SESSION);
  match state.existing_room(&name) {
    Some(room) => Json(room.snapshot().await).into_response(),
    None => (
      StatusCode::NOT_FOUND,
      Json(ErrorResponse {
        ok: false,
        error: "No such session".to_string(),
      }),
    )
      .into_response(),
  }
}
