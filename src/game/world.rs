use super::collision::{resolve_collisions, CollisionEvent};
use super::config::SimConfig;
use super::constants::MAX_FRAME_DT_SECS;
use super::entities::EntityManager;
use super::grid::{Bounds, SpatialGrid};
use super::input::SteeringInput;
use super::math::wrap;
use super::orbs::consume_orbs;
use super::types::{
  EntityRef, GamePhase, LeaderboardEntry, OrbId, OrbSnapshot, Point, SnakeId, WorldSnapshot,
};
use crate::shared::names::sanitize_player_name;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// What the lifecycle collaborator hears about after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
  #[serde(rename_all = "camelCase")]
  Killed {
    snake: SnakeId,
    by: Option<SnakeId>,
    is_player: bool,
  },
  #[serde(rename_all = "camelCase")]
  Absorbed {
    winner: SnakeId,
    loser: SnakeId,
    length: f64,
    score: f64,
  },
  #[serde(rename_all = "camelCase")]
  OrbConsumed {
    snake: SnakeId,
    orb: OrbId,
    value: f64,
  },
  #[serde(rename_all = "camelCase")]
  BotRespawned { snake: SnakeId },
  #[serde(rename_all = "camelCase")]
  GameOver { score: f64, length: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRespawn {
  token: u64,
  due_at_ms: i64,
}

/// One play session: the entity set, its per-tick grid, and the phase machine around it.
#[derive(Debug)]
pub struct World {
  config: SimConfig,
  phase: GamePhase,
  viewport: (f64, f64),
  width: f64,
  height: f64,
  entities: EntityManager,
  grid: Option<SpatialGrid>,
  rng: StdRng,
  session_token: u64,
  pending_respawns: Vec<PendingRespawn>,
  input: Option<SteeringInput>,
  player_name: String,
}

impl World {
  pub fn new(config: SimConfig) -> Self {
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let viewport = (config.world.viewport_width, config.world.viewport_height);
    let (width, height) = config.world.world_size(viewport.0, viewport.1);
    Self {
      config,
      phase: GamePhase::Menu,
      viewport,
      width,
      height,
      entities: EntityManager::default(),
      grid: None,
      rng,
      session_token: 0,
      pending_respawns: Vec::new(),
      input: None,
      player_name: "Player".to_string(),
    }
  }

  pub fn phase(&self) -> GamePhase {
    self.phase
  }

  pub fn size(&self) -> (f64, f64) {
    (self.width, self.height)
  }

  pub fn config(&self) -> &SimConfig {
    &self.config
  }

  pub fn entities(&self) -> &EntityManager {
    &self.entities
  }

  pub fn session_token(&self) -> u64 {
    self.session_token
  }

  pub fn pending_respawns(&self) -> usize {
    self.pending_respawns.len()
  }

  /// Builds a fresh session. Only valid from the menu or the game-over screen.
  pub fn start(&mut self, name: Option<&str>) -> bool {
    if !matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
      return false;
    }
    if let Some(name) = name {
      self.player_name = sanitize_player_name(name, "Player");
    }
    self.teardown();

    let (width, height) = (self.width, self.height);
    self
      .entities
      .spawn_player(self.player_name.clone(), &self.config, width, height);
    self
      .entities
      .populate_orbs(&mut self.rng, width, height, &self.config);
    let count = self.config.bots.count;
    for index in 0..count {
      let color = ((index as u64 + 1) * 0xff_ffff / (count as u64 + 1)) as u32;
      self
        .entities
        .spawn_bot(&mut self.rng, color, &self.config, width, height);
    }
    self.grid = Some(SpatialGrid::new(self.config.world.grid_cell_size, width, height));
    self.phase = GamePhase::Playing;

    tracing::info!(
      token = self.session_token,
      width,
      height,
      bots = count,
      orbs = self.entities.orbs.len(),
      "session started"
    );
    true
  }

  pub fn pause(&mut self) -> bool {
    if self.phase != GamePhase::Playing {
      return false;
    }
    self.phase = GamePhase::Paused;
    true
  }

  pub fn resume(&mut self) -> bool {
    if self.phase != GamePhase::Paused {
      return false;
    }
    self.phase = GamePhase::Playing;
    true
  }

  pub fn return_to_menu(&mut self) {
    self.teardown();
    self.phase = GamePhase::Menu;
  }

  /// Drops every entity and invalidates respawns scheduled by the old session.
  fn teardown(&mut self) {
    self.session_token = self.session_token.wrapping_add(1);
    if !self.pending_respawns.is_empty() {
      tracing::debug!(
        cancelled = self.pending_respawns.len(),
        "cancelling respawns of previous session"
      );
    }
    self.pending_respawns.clear();
    self.entities.clear();
    self.grid = None;
    self.input = None;
  }

  pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) {
    self.viewport = (viewport_width, viewport_height);
    let (width, height) = self.config.world.world_size(viewport_width, viewport_height);
    self.width = width;
    self.height = height;
    if let Some(grid) = self.grid.as_mut() {
      grid.resize(width, height);
    }
    for orb in self.entities.orbs.iter_mut() {
      let wrapped = wrap(orb.point(), width, height);
      orb.x = wrapped.x;
      orb.y = wrapped.y;
    }
    for seg in self.entities.snakes.iter_mut().flat_map(|snake| snake.segs.iter_mut()) {
      let wrapped = wrap(seg.point(), width, height);
      seg.x = wrapped.x;
      seg.y = wrapped.y;
    }
  }

  pub fn set_input(&mut self, input: Option<SteeringInput>) {
    self.input = input;
  }

  /// Advances one frame. Order: player steer+move, bots decide (all against the same
  /// state) then steer+move, grid rebuild, collisions, orbs, player self-bite, removals
  /// and respawns.
  pub fn tick(&mut self, dt: f64, now_ms: i64) -> Vec<GameEvent> {
    if self.phase != GamePhase::Playing {
      return Vec::new();
    }
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT_SECS) } else { 0.0 };
    let (width, height) = (self.width, self.height);
    let config = &self.config;
    let mut events = Vec::new();

    for snake in self.entities.snakes.iter_mut().filter(|snake| snake.visible) {
      snake.refresh_base_speed(config);
    }

    if let Some(player) = self.entities.player_mut().filter(|player| player.visible) {
      if let Some(input) = self.input {
        let cooldown = input.source.cooldown_ms(&config.player);
        player.attempt_turn(input.direction, now_ms, cooldown, width, height, config);
      }
      player.update(dt, width, height, config);
    }

    let EntityManager {
      snakes,
      orbs,
      brains,
      ..
    } = &mut self.entities;

    let mut steering: Vec<(usize, Point)> = Vec::new();
    for (index, snake) in snakes.iter().enumerate() {
      if snake.is_player() || !snake.visible {
        continue;
      }
      let Some(brain) = brains.get_mut(&snake.id) else {
        tracing::warn!(snake_id = snake.id.0, "bot has no controller, skipping its turn");
        continue;
      };
      let steer = brain.decide(snake, snakes.as_slice(), orbs, now_ms, width, height, config);
      steering.push((index, steer));
    }
    for (index, steer) in steering {
      let bot = &mut snakes[index];
      bot.attempt_turn(steer, now_ms, config.bots.turn_cooldown_ms, width, height, config);
      bot.update(dt, width, height, config);
    }

    if let Some(grid) = self.grid.as_mut() {
      grid.clear();
      for snake in snakes.iter().filter(|snake| snake.visible) {
        let radius = snake.radius(config);
        let skip = if snake.is_player() {
          snake.calculate_skip_segments(config)
        } else {
          config.bots.neck_skip_segments
        };
        let body = snake
          .segs
          .iter()
          .take(1)
          .chain(snake.segs.iter().skip(skip.max(1)));
        for seg in body {
          grid.insert(
            EntityRef::Snake(snake.id),
            Bounds {
              x: seg.x,
              y: seg.y,
              radius,
            },
          );
        }
      }
      for orb in orbs.iter().filter(|orb| orb.visible) {
        grid.insert(
          EntityRef::Orb(orb.id),
          Bounds {
            x: orb.x,
            y: orb.y,
            radius: orb.radius,
          },
        );
      }
    }

    let grid = self.grid.as_ref();
    for event in resolve_collisions(snakes, grid, width, height, config) {
      events.push(match event {
        CollisionEvent::Killed { victim, by } => GameEvent::Killed {
          snake: victim,
          by,
          is_player: snakes
            .iter()
            .any(|snake| snake.id == victim && snake.is_player()),
        },
        CollisionEvent::Absorbed {
          winner,
          loser,
          length,
          score,
        } => GameEvent::Absorbed {
          winner,
          loser,
          length,
          score,
        },
      });
    }

    for eaten in consume_orbs(snakes, orbs, grid, width, height, config) {
      events.push(GameEvent::OrbConsumed {
        snake: eaten.snake,
        orb: eaten.orb,
        value: eaten.value,
      });
    }

    if let Some(player) = snakes
      .first_mut()
      .filter(|snake| snake.is_player() && snake.visible)
    {
      if player.self_collides(width, height, config) {
        player.kill();
        events.push(GameEvent::Killed {
          snake: player.id,
          by: Some(player.id),
          is_player: true,
        });
      }
    }

    self.settle_deaths(now_ms, &mut events);
    self.apply_due_respawns(now_ms, &mut events);
    events
  }

  fn settle_deaths(&mut self, now_ms: i64, events: &mut Vec<GameEvent>) {
    if let Some(player) = self.entities.player().filter(|player| !player.visible) {
      let (score, length) = (player.score, player.length);
      tracing::debug!(player_id = player.id.0, score, "player died");
      self.phase = GamePhase::GameOver;
      self.input = None;
      events.push(GameEvent::GameOver { score, length });
    }

    for id in self.entities.remove_dead_bots() {
      tracing::debug!(snake_id = id.0, "bot died, respawn scheduled");
      self.pending_respawns.push(PendingRespawn {
        token: self.session_token,
        due_at_ms: now_ms + self.config.bots.respawn_delay_ms,
      });
    }
  }

  fn apply_due_respawns(&mut self, now_ms: i64, events: &mut Vec<GameEvent>) {
    if self.pending_respawns.is_empty() {
      return;
    }
    let token = self.session_token;
    let (due, waiting): (Vec<_>, Vec<_>) = self
      .pending_respawns
      .drain(..)
      .partition(|pending| pending.due_at_ms <= now_ms);
    self.pending_respawns = waiting;

    for pending in due {
      if pending.token != token {
        tracing::warn!(
          scheduled = pending.token,
          current = token,
          "dropping respawn from a finished session"
        );
        continue;
      }
      if self.phase != GamePhase::Playing {
        tracing::debug!("respawn due outside active play, skipped");
        continue;
      }
      if self.entities.bot_count() >= self.config.bots.count {
        continue;
      }
      let color = self.rng.gen_range(0..=0xff_ffff);
      let (width, height) = (self.width, self.height);
      let id = self
        .entities
        .spawn_bot(&mut self.rng, color, &self.config, width, height);
      tracing::debug!(snake_id = id.0, "bot respawned");
      events.push(GameEvent::BotRespawned { snake: id });
    }
  }

  /// Visible serpents by score, highest first.
  pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = self
      .entities
      .snakes
      .iter()
      .filter(|snake| snake.visible)
      .map(|snake| LeaderboardEntry {
        name: snake.name.clone(),
        score: snake.score,
        is_player: snake.is_player(),
      })
      .collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries
  }

  pub fn snapshot(&self, now_ms: i64) -> WorldSnapshot {
    WorldSnapshot {
      now: now_ms,
      phase: self.phase,
      width: self.width,
      height: self.height,
      snakes: self
        .entities
        .snakes
        .iter()
        .filter(|snake| snake.visible)
        .map(|snake| snake.snapshot(&self.config))
        .collect(),
      orbs: self
        .entities
        .orbs
        .iter()
        .filter(|orb| orb.visible)
        .map(|orb| OrbSnapshot {
          id: orb.id,
          x: orb.x,
          y: orb.y,
          radius: orb.radius,
          tier: orb.tier,
          color: orb.color,
        })
        .collect(),
      leaderboard: self.leaderboard(),
    }
  }
}

#[cfg(test)]
mod tests;
