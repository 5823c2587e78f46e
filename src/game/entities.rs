use super::ai::AiController;
use super::config::SimConfig;
use super::orbs::populate_orbs;
use super::snake::{Serpent, SerpentKind, SpawnSpec};
use super::types::{Orb, Point, SnakeId};
use crate::shared::names::random_bot_name;
use rand::Rng;
use std::collections::HashMap;

/// Owns every serpent, orb and bot brain of a session. The player, when present,
/// is always `snakes[0]`.
#[derive(Debug, Default)]
pub struct EntityManager {
  pub snakes: Vec<Serpent>,
  pub orbs: Vec<Orb>,
  pub brains: HashMap<SnakeId, AiController>,
  next_snake_id: u32,
  next_orb_id: u32,
}

impl EntityManager {
  pub fn clear(&mut self) {
    self.snakes.clear();
    self.orbs.clear();
    self.brains.clear();
  }

  fn allocate_snake_id(&mut self) -> SnakeId {
    let id = SnakeId(self.next_snake_id);
    self.next_snake_id = self.next_snake_id.wrapping_add(1);
    id
  }

  pub fn spawn_player(&mut self, name: String, config: &SimConfig, width: f64, height: f64) -> SnakeId {
    let id = self.allocate_snake_id();
    let player = Serpent::spawn(
      SpawnSpec {
        id,
        name,
        kind: SerpentKind::Player,
        color: config.player.color,
        head: Point { x: 0.0, y: 0.0 },
        speed_offset: 0.0,
      },
      config,
      width,
      height,
    );
    self.snakes.retain(|snake| !snake.is_player());
    self.snakes.insert(0, player);
    id
  }

  pub fn spawn_bot<R: Rng>(
    &mut self,
    rng: &mut R,
    color: u32,
    config: &SimConfig,
    width: f64,
    height: f64,
  ) -> SnakeId {
    let id = self.allocate_snake_id();
    let head = Point {
      x: (rng.gen::<f64>() - 0.5) * width,
      y: (rng.gen::<f64>() - 0.5) * height,
    };
    let bot = Serpent::spawn(
      SpawnSpec {
        id,
        name: random_bot_name(rng),
        kind: SerpentKind::Bot,
        color,
        head,
        speed_offset: (rng.gen::<f64>() - 0.5) * config.bots.speed_variance,
      },
      config,
      width,
      height,
    );
    self.snakes.push(bot);
    self.brains.insert(id, AiController::new(rng, &config.bots));
    id
  }

  pub fn populate_orbs<R: Rng>(&mut self, rng: &mut R, width: f64, height: f64, config: &SimConfig) {
    let orbs = populate_orbs(rng, width, height, config, &mut self.next_orb_id);
    self.orbs.extend(orbs);
  }

  pub fn player(&self) -> Option<&Serpent> {
    self.snakes.first().filter(|snake| snake.is_player())
  }

  pub fn player_mut(&mut self) -> Option<&mut Serpent> {
    self.snakes.first_mut().filter(|snake| snake.is_player())
  }

  pub fn get(&self, id: SnakeId) -> Option<&Serpent> {
    self.snakes.iter().find(|snake| snake.id == id)
  }

  pub fn bot_count(&self) -> usize {
    self.snakes.iter().filter(|snake| !snake.is_player()).count()
  }

  /// Drops dead bots and their brains. A dead player stays for the game-over screen.
  pub fn remove_dead_bots(&mut self) -> Vec<SnakeId> {
    let mut removed = Vec::new();
    self.snakes.retain(|snake| {
      let keep = snake.visible || snake.is_player();
      if !keep {
        removed.push(snake.id);
      }
      keep
    });
    for id in &removed {
      self.brains.remove(id);
    }
    removed
  }
}
