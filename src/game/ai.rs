use super::config::{BotConfig, SimConfig};
use super::math::{length, normalize_or_unit, torus_delta, torus_distance, value_noise_2d, wrap};
use super::snake::Serpent;
use super::types::{Orb, Point};
use super::constants::{AI_NOISE_AXIS_OFFSET, AI_NOISE_SEED_SPAN};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
  Gather,
  Hunt,
  Evade,
}

/// Steering brain for one bot. Mode is re-evaluated every tick.
#[derive(Debug, Clone)]
pub struct AiController {
  pub mode: AiMode,
  pub view_radius: f64,
  pub noise_seed: f64,
}

struct Perception<'a> {
  orbs: Vec<&'a Orb>,
  hunt: Option<Point>,
  threat: Option<Point>,
  danger: bool,
}

impl AiController {
  pub fn new<R: Rng>(rng: &mut R, config: &BotConfig) -> Self {
    let low = config.view_radius_min_scale.min(config.view_radius_max_scale);
    let high = config.view_radius_min_scale.max(config.view_radius_max_scale);
    let scale = if high > low { rng.gen_range(low..=high) } else { low };
    Self {
      mode: AiMode::Gather,
      view_radius: config.view_radius * scale,
      noise_seed: rng.gen_range(0.0..AI_NOISE_SEED_SPAN),
    }
  }

  /// Produces a unit steering vector for `me`. `others` may include `me`; it is skipped by id.
  pub fn decide(
    &mut self,
    me: &Serpent,
    others: &[Serpent],
    orbs: &[Orb],
    now_ms: i64,
    width: f64,
    height: f64,
    config: &SimConfig,
  ) -> Point {
    let Some(head) = me.head() else { return me.velocity };
    let seen = self.perceive(me, head, others, orbs, width, height, config);

    self.mode = if seen.hunt.is_some() {
      AiMode::Hunt
    } else if seen.threat.is_some() || seen.danger {
      AiMode::Evade
    } else {
      AiMode::Gather
    };

    let target = match self.mode {
      AiMode::Hunt => seen.hunt,
      AiMode::Gather => Some(best_orb(&seen.orbs).map(Orb::point).unwrap_or(Point {
        x: head.x + me.velocity.x,
        y: head.y + me.velocity.y,
      })),
      AiMode::Evade => Some(match seen.threat {
        Some(threat) => {
          let away = torus_delta(head, threat, width, height);
          Point {
            x: head.x + away.x,
            y: head.y + away.y,
          }
        }
        None => Point {
          x: head.x - me.velocity.x * config.bots.evade_distance,
          y: head.y - me.velocity.y * config.bots.evade_distance,
        },
      }),
    };

    let mut direction = match target {
      Some(target) => torus_delta(wrap(target, width, height), head, width, height),
      None => me.velocity,
    };
    if length(direction) == 0.0 {
      direction = me.velocity;
    }

    // Wobble is added to the raw offset, so it fades as the target gets farther.
    let t = now_ms as f64 * config.bots.noise_time_scale;
    let wobble = Point {
      x: value_noise_2d(0, self.noise_seed, t) * config.bots.noise,
      y: value_noise_2d(0, self.noise_seed + AI_NOISE_AXIS_OFFSET, t) * config.bots.noise,
    };
    normalize_or_unit(Point {
      x: direction.x + wobble.x,
      y: direction.y + wobble.y,
    })
  }

  fn perceive<'a>(
    &self,
    me: &Serpent,
    head: Point,
    others: &[Serpent],
    orbs: &'a [Orb],
    width: f64,
    height: f64,
    config: &SimConfig,
  ) -> Perception<'a> {
    let bots = &config.bots;
    let orbs_in_view = orbs
      .iter()
      .filter(|orb| orb.visible)
      .filter(|orb| torus_distance(head, orb.point(), width, height) < self.view_radius)
      .collect();

    let reach = bots.look_ahead_secs * me.speed;
    let future = wrap(
      Point {
        x: head.x + me.velocity.x * reach,
        y: head.y + me.velocity.y * reach,
      },
      width,
      height,
    );
    let danger_distance = me.radius(config) + bots.danger_margin;

    let mut danger = false;
    let mut hunt: Option<(Point, f64)> = None;
    let mut threat: Option<(Point, f64)> = None;

    for other in others.iter().filter(|other| other.visible && other.id != me.id) {
      if !danger {
        danger = other
          .segs
          .iter()
          .skip(bots.neck_skip_segments)
          .any(|seg| torus_distance(future, seg.point(), width, height) < danger_distance);
      }

      let count = other.segs.len();
      if count >= 3 && other.length < me.length {
        let near_tail = other.segs[count - 2].point();
        let dist = torus_distance(head, near_tail, width, height);
        let closer = hunt.map_or(true, |(_, best)| dist < best);
        if dist < self.view_radius && closer {
          hunt = Some((near_tail, dist));
        }
      }

      if other.length > me.length {
        if let Some(other_head) = other.head() {
          let dist = torus_distance(head, other_head, width, height);
          let closer = threat.map_or(true, |(_, best)| dist < best);
          if dist < bots.threat_distance && closer {
            threat = Some((other_head, dist));
          }
        }
      }
    }

    Perception {
      orbs: orbs_in_view,
      hunt: hunt.map(|(point, _)| point),
      threat: threat.map(|(point, _)| point),
      danger,
    }
  }
}

/// Highest value wins; the first one found keeps a tie.
fn best_orb<'a>(orbs: &[&'a Orb]) -> Option<&'a Orb> {
  let mut best: Option<&'a Orb> = None;
  for orb in orbs {
    if best.map_or(true, |current| orb.value > current.value) {
      best = Some(*orb);
    }
  }
  best
}
