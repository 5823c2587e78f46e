use super::config::SimConfig;
use super::grid::{Bounds, SpatialGrid};
use super::math::{distance, torus_distance};
use super::snake::Serpent;
use super::types::{EntityRef, SnakeId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum CollisionEvent {
  Killed {
    victim: SnakeId,
    by: Option<SnakeId>,
  },
  Absorbed {
    winner: SnakeId,
    loser: SnakeId,
    length: f64,
    score: f64,
  },
}

/// Runs head-vs-body then head-vs-head, mutating the serpents in place.
/// A serpent that dies in one check is skipped by every later check.
pub fn resolve_collisions(
  snakes: &mut [Serpent],
  grid: Option<&SpatialGrid>,
  width: f64,
  height: f64,
  config: &SimConfig,
) -> Vec<CollisionEvent> {
  let mut events = Vec::new();
  resolve_head_to_body(snakes, grid, width, height, config, &mut events);
  resolve_head_to_head(snakes, config, &mut events);
  events
}

fn resolve_head_to_body(
  snakes: &mut [Serpent],
  grid: Option<&SpatialGrid>,
  width: f64,
  height: f64,
  config: &SimConfig,
  events: &mut Vec<CollisionEvent>,
) {
  let index_of: HashMap<SnakeId, usize> = snakes
    .iter()
    .enumerate()
    .map(|(index, snake)| (snake.id, index))
    .collect();

  for attacker in 0..snakes.len() {
    if !snakes[attacker].visible {
      continue;
    }
    let Some(head) = snakes[attacker].head() else { continue };
    let attacker_radius = snakes[attacker].radius(config);

    let candidates: Vec<usize> = match grid {
      Some(grid) => grid
        .query(Bounds {
          x: head.x,
          y: head.y,
          radius: attacker_radius * 2.0,
        })
        .into_iter()
        .filter_map(|entity| match entity {
          EntityRef::Snake(id) => {
            let index = index_of.get(&id).copied();
            if index.is_none() {
              tracing::warn!(snake_id = id.0, "grid references a serpent that is gone");
            }
            index
          }
          EntityRef::Orb(_) => None,
        })
        .collect(),
      None => (0..snakes.len()).collect(),
    };

    for victim in candidates {
      if victim == attacker || !snakes[victim].visible {
        continue;
      }
      let victim_snake = &snakes[victim];
      let skip = if victim_snake.is_player() {
        victim_snake.calculate_skip_segments(config)
      } else {
        config.bots.neck_skip_segments
      };
      let reach = attacker_radius + victim_snake.radius(config);
      let hit = victim_snake
        .segs
        .iter()
        .skip(skip)
        .any(|seg| torus_distance(head, seg.point(), width, height) < reach);
      if !hit {
        continue;
      }

      snakes[attacker].kill();
      events.push(CollisionEvent::Killed {
        victim: snakes[attacker].id,
        by: Some(snakes[victim].id),
      });
      tracing::debug!(
        attacker = snakes[attacker].id.0,
        victim = snakes[victim].id.0,
        "serpent ran into a body"
      );
      if !snakes[attacker].is_player() {
        absorb(snakes, victim, attacker, config, events);
      }
      break;
    }
  }
}

fn resolve_head_to_head(snakes: &mut [Serpent], config: &SimConfig, events: &mut Vec<CollisionEvent>) {
  let margin = config.collision.head_on_length_margin;
  let mut checked: HashSet<(SnakeId, SnakeId)> = HashSet::new();

  for first in 0..snakes.len() {
    for second in (first + 1)..snakes.len() {
      if !snakes[first].visible || !snakes[second].visible {
        continue;
      }
      let key = pair_key(snakes[first].id, snakes[second].id);
      if !checked.insert(key) {
        continue;
      }
      let (Some(a), Some(b)) = (snakes[first].head(), snakes[second].head()) else { continue };
      if distance(a, b) >= snakes[first].radius(config) + snakes[second].radius(config) {
        continue;
      }

      let difference = snakes[first].length - snakes[second].length;
      if difference > margin {
        kill(snakes, second, Some(first), events);
        absorb(snakes, first, second, config, events);
      } else if difference < -margin {
        kill(snakes, first, Some(second), events);
        absorb(snakes, second, first, config, events);
      } else {
        kill(snakes, first, Some(second), events);
        kill(snakes, second, Some(first), events);
      }
      tracing::debug!(
        first = snakes[first].id.0,
        second = snakes[second].id.0,
        difference,
        "head-on collision"
      );
    }
  }
}

fn pair_key(a: SnakeId, b: SnakeId) -> (SnakeId, SnakeId) {
  if a <= b {
    (a, b)
  } else {
    (b, a)
  }
}

fn kill(snakes: &mut [Serpent], victim: usize, by: Option<usize>, events: &mut Vec<CollisionEvent>) {
  snakes[victim].kill();
  events.push(CollisionEvent::Killed {
    victim: snakes[victim].id,
    by: by.map(|index| snakes[index].id),
  });
}

/// Hands the loser's ledger and post-neck body to the winner. The winner must still be alive.
fn absorb(
  snakes: &mut [Serpent],
  winner: usize,
  loser: usize,
  config: &SimConfig,
  events: &mut Vec<CollisionEvent>,
) {
  if !snakes[winner].visible {
    tracing::warn!(winner = snakes[winner].id.0, "skipping absorb into a dead serpent");
    return;
  }
  let length = snakes[loser].length;
  let score = snakes[loser].score;
  let tail = snakes[loser].absorbable_tail(config).to_vec();
  snakes[winner].absorb(length, score, &tail, config);
  events.push(CollisionEvent::Absorbed {
    winner: snakes[winner].id,
    loser: snakes[loser].id,
    length,
    score,
  });
}
