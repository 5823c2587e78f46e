use super::config::SimConfig;
use super::grid::{Bounds, SpatialGrid};
use super::math::{torus_distance, wrap};
use super::snake::Serpent;
use super::types::{EntityRef, Orb, OrbId, OrbTier, Point, SnakeId};
use rand::Rng;
use std::collections::HashMap;
use std::f64::consts::TAU;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbEaten {
  pub snake: SnakeId,
  pub orb: OrbId,
  pub value: f64,
}

pub fn choose_tier<R: Rng>(rng: &mut R, config: &SimConfig) -> OrbTier {
  let total: f64 = OrbTier::ALL
    .iter()
    .map(|tier| config.orbs.tier(*tier).weight.max(0.0))
    .sum();
  if total <= 0.0 {
    return OrbTier::Low;
  }
  let mut roll = rng.gen::<f64>() * total;
  for tier in OrbTier::ALL {
    let weight = config.orbs.tier(tier).weight.max(0.0);
    if roll < weight {
      return tier;
    }
    roll -= weight;
  }
  OrbTier::High
}

/// Fills the field with `round(W * H * density)` orbs, some as clusters, none overlapping.
pub fn populate_orbs<R: Rng>(
  rng: &mut R,
  width: f64,
  height: f64,
  config: &SimConfig,
  next_id: &mut u32,
) -> Vec<Orb> {
  let orbs_config = &config.orbs;
  let radius = config.orb_radius();
  let target = (width * height * orbs_config.density).round().max(0.0) as usize;
  let attempt_cap = target * orbs_config.max_placement_attempts.max(1) * 2;
  let mut field = OrbField {
    orbs: Vec::with_capacity(target),
    radius,
    width,
    height,
  };

  let mut attempts = 0;
  while field.orbs.len() < target && attempts < attempt_cap {
    attempts += 1;
    if rng.gen::<f64>() < orbs_config.cluster_probability {
      let low = orbs_config.min_cluster_size.max(1);
      let high = orbs_config.max_cluster_size.max(low);
      let size = rng.gen_range(low..=high).min(target - field.orbs.len());
      let center = random_point(rng, width, height);
      if rng.gen_bool(0.5) {
        place_line_cluster(rng, &mut field, center, size, config, next_id);
      } else {
        place_scatter_cluster(rng, &mut field, center, size, config, next_id);
      }
    } else {
      for _ in 0..orbs_config.max_placement_attempts.max(1) {
        let point = random_point(rng, width, height);
        if field.place(rng, point, config, next_id) {
          break;
        }
      }
    }
  }

  if field.orbs.len() < target {
    tracing::debug!(placed = field.orbs.len(), target, "orb field ran out of placement attempts");
  }
  field.orbs
}

struct OrbField {
  orbs: Vec<Orb>,
  radius: f64,
  width: f64,
  height: f64,
}

impl OrbField {
  fn overlaps(&self, point: Point) -> bool {
    self
      .orbs
      .iter()
      .any(|orb| torus_distance(orb.point(), point, self.width, self.height) < orb.radius + self.radius)
  }

  fn place<R: Rng>(&mut self, rng: &mut R, point: Point, config: &SimConfig, next_id: &mut u32) -> bool {
    let point = wrap(point, self.width, self.height);
    if self.overlaps(point) {
      return false;
    }
    let tier = choose_tier(rng, config);
    let tier_config = config.orbs.tier(tier);
    self.orbs.push(Orb {
      id: OrbId(*next_id),
      x: point.x,
      y: point.y,
      radius: self.radius,
      tier,
      value: tier_config.value,
      color: tier_config.color,
      visible: true,
    });
    *next_id = next_id.wrapping_add(1);
    true
  }
}

fn random_point<R: Rng>(rng: &mut R, width: f64, height: f64) -> Point {
  Point {
    x: (rng.gen::<f64>() - 0.5) * width,
    y: (rng.gen::<f64>() - 0.5) * height,
  }
}

fn place_line_cluster<R: Rng>(
  rng: &mut R,
  field: &mut OrbField,
  center: Point,
  size: usize,
  config: &SimConfig,
  next_id: &mut u32,
) {
  let angle = rng.gen::<f64>() * TAU;
  let (sin, cos) = angle.sin_cos();
  let spacing = field.radius * config.orbs.cluster_line_spacing_factor;
  let middle = (size as f64 - 1.0) * 0.5;
  for index in 0..size {
    let offset = (index as f64 - middle) * spacing;
    let point = Point {
      x: center.x + cos * offset,
      y: center.y + sin * offset,
    };
    field.place(rng, point, config, next_id);
  }
}

fn place_scatter_cluster<R: Rng>(
  rng: &mut R,
  field: &mut OrbField,
  center: Point,
  size: usize,
  config: &SimConfig,
  next_id: &mut u32,
) {
  for _ in 0..size {
    for _ in 0..config.orbs.max_placement_attempts.max(1) {
      let angle = rng.gen::<f64>() * TAU;
      let reach = rng.gen::<f64>() * config.orbs.cluster_radius;
      let point = Point {
        x: center.x + angle.cos() * reach,
        y: center.y + angle.sin() * reach,
      };
      if field.place(rng, point, config, next_id) {
        break;
      }
    }
  }
}

/// Lets every visible serpent, in order, eat the orbs its head touches. Eaten orbs
/// are dropped from `orbs`.
pub fn consume_orbs(
  snakes: &mut [Serpent],
  orbs: &mut Vec<Orb>,
  grid: Option<&SpatialGrid>,
  width: f64,
  height: f64,
  config: &SimConfig,
) -> Vec<OrbEaten> {
  let index_of: HashMap<OrbId, usize> = orbs
    .iter()
    .enumerate()
    .map(|(index, orb)| (orb.id, index))
    .collect();
  let mut eaten = Vec::new();

  for snake in snakes.iter_mut().filter(|snake| snake.visible) {
    let Some(head) = snake.head() else { continue };
    let radius = snake.radius(config);
    let candidates: Vec<usize> = match grid {
      Some(grid) => grid
        .query(Bounds {
          x: head.x,
          y: head.y,
          radius,
        })
        .into_iter()
        .filter_map(|entity| match entity {
          EntityRef::Orb(id) => index_of.get(&id).copied(),
          EntityRef::Snake(_) => None,
        })
        .collect(),
      None => (0..orbs.len()).collect(),
    };

    for index in candidates {
      let orb = &mut orbs[index];
      if !orb.visible {
        continue;
      }
      if torus_distance(head, orb.point(), width, height) >= radius + orb.radius {
        continue;
      }
      orb.visible = false;
      snake.consume_orb(orb.value, config);
      eaten.push(OrbEaten {
        snake: snake.id,
        orb: orb.id,
        value: orb.value,
      });
    }
  }

  orbs.retain(|orb| orb.visible);
  eaten
}
