use super::config::SimConfig;
use super::input::{parse_direction, SteeringInput};
use super::types::{Point, WorldSnapshot};
use super::world::{GameEvent, World};
use crate::app::time::now_millis;
use crate::protocol::{self, ClientMessage, ServerMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

mod session;

pub use session::{LatestFrame, SessionIo};
use session::{session_channel, SessionEntry};

/// A named play session shared by every socket connected to it. One world, one
/// tick loop that runs while at least one socket is attached.
#[derive(Debug)]
pub struct Room {
  name: String,
  tick_interval: Duration,
  state: Mutex<RoomState>,
  running: AtomicBool,
}

#[derive(Debug)]
struct RoomState {
  sessions: HashMap<String, SessionEntry>,
  world: World,
  last_tick: Option<Instant>,
}

impl Room {
  pub fn new(name: String, config: SimConfig, tick_ms: u64) -> Self {
    Self {
      name,
      tick_interval: Duration::from_millis(tick_ms.max(1)),
      state: Mutex::new(RoomState {
        sessions: HashMap::new(),
        world: World::new(config),
        last_tick: None,
      }),
      running: AtomicBool::new(false),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::SeqCst)
  }

  pub async fn add_session(self: &Arc<Self>) -> SessionIo {
    let session_id = Uuid::new_v4().to_string();
    let (entry, io) = session_channel(session_id.clone());
    {
      let mut state = self.state.lock().await;
      let welcome = ServerMessage::Welcome {
        session_id: &session_id,
        room: &self.name,
      };
      if let Some(payload) = protocol::encode_server_message(&welcome) {
        entry.push_event(&session_id, payload);
      }
      let snapshot = state.world.snapshot(now_millis());
      if let Some(payload) = protocol::encode_server_message(&ServerMessage::State { snapshot: &snapshot }) {
        entry.state_frame.store(payload);
      }
      state.sessions.insert(session_id.clone(), entry);
      tracing::debug!(room = %self.name, session_id, sessions = state.sessions.len(), "session joined");
    }
    self.ensure_loop();
    io
  }

  pub async fn remove_session(&self, session_id: &str) {
    let mut state = self.state.lock().await;
    if state.sessions.remove(session_id).is_some() {
      tracing::debug!(room = %self.name, session_id, sessions = state.sessions.len(), "session left");
    }
  }

  pub async fn session_count(&self) -> usize {
    self.state.lock().await.sessions.len()
  }

  /// Applies one client message. Returns false when the session is unknown and the
  /// socket should be closed.
  pub async fn handle_text_message(&self, session_id: &str, text: &str) -> bool {
    let mut state = self.state.lock().await;
    if !state.sessions.contains_key(session_id) {
      return false;
    }
    let Some(message) = protocol::decode_client_message(text) else { return true };
    state.apply(message);
    true
  }

  pub async fn snapshot(&self) -> WorldSnapshot {
    self.state.lock().await.world.snapshot(now_millis())
  }

  fn ensure_loop(self: &Arc<Self>) {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return;
    }

    let room = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(room.tick_interval);
      interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
      tracing::debug!(room = %room.name, "tick loop started");
      loop {
        interval.tick().await;
        let mut state = room.state.lock().await;
        if state.sessions.is_empty() {
          state.last_tick = None;
          room.running.store(false, Ordering::SeqCst);
          tracing::debug!(room = %room.name, "tick loop stopped, no sessions left");
          break;
        }
        let now_ms = now_millis();
        let events = state.step(Instant::now(), now_ms);
        state.broadcast(&events, now_ms);
      }
    });
  }
}

impl RoomState {
  fn apply(&mut self, message: ClientMessage) {
    match message {
      ClientMessage::Start { name } => {
        if !self.world.start(name.as_deref()) {
          tracing::debug!(phase = ?self.world.phase(), "start ignored");
        }
        self.last_tick = None;
      }
      ClientMessage::Input { x, y, source } => {
        let Some(direction) = parse_direction(Point { x, y }) else { return };
        self.world.set_input(Some(SteeringInput { direction, source }));
      }
      ClientMessage::Release => self.world.set_input(None),
      ClientMessage::Pause => {
        self.world.pause();
      }
      ClientMessage::Resume => {
        if self.world.resume() {
          self.last_tick = None;
        }
      }
      ClientMessage::Menu => self.world.return_to_menu(),
      ClientMessage::Resize { width, height } => {
        if width.is_finite() && height.is_finite() {
          self.world.resize(width, height);
        }
      }
    }
  }

  /// Ticks the world with the wall time elapsed since the previous step. The world
  /// clamps large gaps itself.
  fn step(&mut self, now: Instant, now_ms: i64) -> Vec<GameEvent> {
    let dt = match self.last_tick {
      Some(last) => now.saturating_duration_since(last).as_secs_f64(),
      None => 0.0,
    };
    self.last_tick = Some(now);
    self.world.tick(dt, now_ms)
  }

  fn broadcast(&mut self, events: &[GameEvent], now_ms: i64) {
    let snapshot = self.world.snapshot(now_ms);
    let Some(state_payload) = protocol::encode_server_message(&ServerMessage::State { snapshot: &snapshot }) else {
      return;
    };
    let events_payload = if events.is_empty() {
      None
    } else {
      protocol::encode_server_message(&ServerMessage::Events { events })
    };

    let mut stale = Vec::new();
    for (session_id, session) in &self.sessions {
      if let Some(payload) = &events_payload {
        if !session.push_event(session_id, payload.clone()) {
          stale.push(session_id.clone());
          continue;
        }
      }
      session.state_frame.store(state_payload.clone());
    }
    for session_id in stale {
      self.sessions.remove(&session_id);
      tracing::debug!(session_id, "dropping session with closed socket");
    }
  }
}
