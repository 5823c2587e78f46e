use super::constants::*;
use super::types::OrbTier;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Every tunable of the simulation. Defaults reproduce the stock game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
  pub world: WorldConfig,
  pub player: PlayerConfig,
  pub bots: BotConfig,
  pub orbs: OrbConfig,
  pub collision: CollisionConfig,
  pub motion: MotionConfig,
  pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
  pub padding: f64,
  pub min_size: f64,
  pub viewport_width: f64,
  pub viewport_height: f64,
  pub playing_zoom: f64,
  pub grid_cell_size: f64,
}

impl Default for WorldConfig {
  fn default() -> Self {
    Self {
      padding: WORLD_PADDING,
      min_size: WORLD_MIN_SIZE,
      viewport_width: DEFAULT_VIEWPORT_WIDTH,
      viewport_height: DEFAULT_VIEWPORT_HEIGHT,
      playing_zoom: PLAYING_ZOOM,
      grid_cell_size: GRID_CELL_SIZE,
    }
  }
}

impl WorldConfig {
  /// World extent for a viewport: the zoomed-out view minus padding on both sides.
  pub fn world_size(&self, viewport_width: f64, viewport_height: f64) -> (f64, f64) {
    let axis = |viewport: f64| {
      let size = viewport * self.playing_zoom - 2.0 * self.padding;
      if size.is_finite() {
        size.max(self.min_size)
      } else {
        self.min_size
      }
    };
    (axis(viewport_width), axis(viewport_height))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
  pub initial_length: f64,
  pub initial_segments: usize,
  pub initial_speed: f64,
  pub max_additional_speed: f64,
  pub speed_length_factor: f64,
  pub length_per_orb: f64,
  pub eat_speed_boost: f64,
  pub eat_boost_duration_ms: f64,
  pub eat_glow_frames: u32,
  pub keyboard_turn_cooldown_ms: i64,
  pub joystick_turn_cooldown_ms: i64,
  pub safe_px: f64,
  pub max_neck_skip_segments: usize,
  pub self_bite_predict_factor: f64,
  pub min_neck_skip_segments: usize,
  pub self_hit_margin: f64,
  pub color: u32,
}

impl Default for PlayerConfig {
  fn default() -> Self {
    Self {
      initial_length: PLAYER_INITIAL_LENGTH,
      initial_segments: PLAYER_INITIAL_SEGMENTS,
      initial_speed: PLAYER_INITIAL_SPEED,
      max_additional_speed: PLAYER_MAX_ADDITIONAL_SPEED,
      speed_length_factor: PLAYER_SPEED_LENGTH_FACTOR,
      length_per_orb: PLAYER_LENGTH_PER_ORB,
      eat_speed_boost: PLAYER_EAT_SPEED_BOOST,
      eat_boost_duration_ms: PLAYER_EAT_SPEED_BOOST_DURATION_MS,
      eat_glow_frames: PLAYER_EAT_GLOW_FRAMES,
      keyboard_turn_cooldown_ms: KEYBOARD_TURN_COOLDOWN_MS,
      joystick_turn_cooldown_ms: JOYSTICK_TURN_COOLDOWN_MS,
      safe_px: SAFE_PX,
      max_neck_skip_segments: MAX_NECK_SKIP_SEGMENTS,
      self_bite_predict_factor: SELF_BITE_PREDICT_FACTOR,
      min_neck_skip_segments: MIN_NECK_SKIP_SEGMENTS,
      self_hit_margin: SELF_HIT_MARGIN,
      color: PLAYER_COLOR,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  pub count: usize,
  pub base_speed: f64,
  pub speed_variance: f64,
  pub speed_length_cap: f64,
  pub speed_per_length: f64,
  pub view_radius: f64,
  pub view_radius_min_scale: f64,
  pub view_radius_max_scale: f64,
  pub turn_cooldown_ms: i64,
  pub noise: f64,
  pub noise_time_scale: f64,
  pub look_ahead_secs: f64,
  pub danger_margin: f64,
  pub threat_distance: f64,
  pub evade_distance: f64,
  pub neck_skip_segments: usize,
  pub respawn_delay_ms: i64,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      count: AI_COUNT,
      base_speed: AI_BASE_SPEED,
      speed_variance: AI_VARIANCE_SPEED,
      speed_length_cap: AI_SPEED_LENGTH_CAP,
      speed_per_length: AI_SPEED_PER_LENGTH,
      view_radius: AI_VIEW_RADIUS,
      view_radius_min_scale: AI_VIEW_RADIUS_MIN_SCALE,
      view_radius_max_scale: AI_VIEW_RADIUS_MAX_SCALE,
      turn_cooldown_ms: AI_TURN_COOLDOWN_MS,
      noise: AI_NOISE,
      noise_time_scale: AI_NOISE_TIME_SCALE,
      look_ahead_secs: AI_LOOK_AHEAD_SECS,
      danger_margin: AI_DANGER_MARGIN,
      threat_distance: AI_THREAT_DISTANCE,
      evade_distance: AI_EVADE_DISTANCE,
      neck_skip_segments: AI_NECK_SKIP_SEGMENTS,
      respawn_delay_ms: AI_RESPAWN_DELAY_MS,
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbTierConfig {
  pub value: f64,
  pub color: u32,
  pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
  pub density: f64,
  pub base_radius: f64,
  pub radius_multiplier: f64,
  pub low: OrbTierConfig,
  pub mid: OrbTierConfig,
  pub high: OrbTierConfig,
  pub cluster_probability: f64,
  pub min_cluster_size: usize,
  pub max_cluster_size: usize,
  pub cluster_radius: f64,
  pub cluster_line_spacing_factor: f64,
  pub max_placement_attempts: usize,
}

impl Default for OrbConfig {
  fn default() -> Self {
    Self {
      density: ORB_DENSITY,
      base_radius: ORB_BASE_RADIUS,
      radius_multiplier: ORB_RADIUS_MULTIPLIER,
      low: OrbTierConfig {
        value: ORB_LOW_VALUE,
        color: ORB_LOW_COLOR,
        weight: ORB_LOW_WEIGHT,
      },
      mid: OrbTierConfig {
        value: ORB_MID_VALUE,
        color: ORB_MID_COLOR,
        weight: ORB_MID_WEIGHT,
      },
      high: OrbTierConfig {
        value: ORB_HIGH_VALUE,
        color: ORB_HIGH_COLOR,
        weight: ORB_HIGH_WEIGHT,
      },
      cluster_probability: CLUSTER_PROBABILITY,
      min_cluster_size: MIN_CLUSTER_SIZE,
      max_cluster_size: MAX_CLUSTER_SIZE,
      cluster_radius: CLUSTER_RADIUS,
      cluster_line_spacing_factor: CLUSTER_LINE_SPACING_FACTOR,
      max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
    }
  }
}

impl OrbConfig {
  pub fn tier(&self, tier: OrbTier) -> &OrbTierConfig {
    match tier {
      OrbTier::Low => &self.low,
      OrbTier::Mid => &self.mid,
      OrbTier::High => &self.high,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
  pub head_on_length_margin: f64,
  pub absorb_neck_skip_segments: usize,
  pub absorb_glow_multiplier: f64,
  pub absorb_boost_duration_multiplier: f64,
}

impl Default for CollisionConfig {
  fn default() -> Self {
    Self {
      head_on_length_margin: HEAD_ON_LENGTH_MARGIN,
      absorb_neck_skip_segments: ABSORB_NECK_SKIP_SEGMENTS,
      absorb_glow_multiplier: ABSORB_GLOW_MULTIPLIER,
      absorb_boost_duration_multiplier: ABSORB_BOOST_DURATION_MULTIPLIER,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
  pub speed_lerp_factor: f64,
  pub speed_snap_epsilon: f64,
  pub growth_duration_secs: f64,
  pub radius_base: f64,
  pub radius_per_length: f64,
  pub head_radius_scale: f64,
  pub reverse_dot_limit: f64,
}

impl Default for MotionConfig {
  fn default() -> Self {
    Self {
      speed_lerp_factor: SPEED_LERP_FACTOR,
      speed_snap_epsilon: SPEED_SNAP_EPSILON,
      growth_duration_secs: SEGMENT_GROWTH_DURATION_SECS,
      radius_base: SEGMENT_RADIUS_BASE,
      radius_per_length: SEGMENT_RADIUS_PER_LENGTH,
      head_radius_scale: HEAD_RADIUS_SCALE,
      reverse_dot_limit: TURN_REVERSE_DOT_LIMIT,
    }
  }
}

impl MotionConfig {
  pub fn seg_radius(&self, length: f64) -> f64 {
    self.radius_base + length * self.radius_per_length
  }
}

impl SimConfig {
  /// Link length between fully grown segments, fixed from the starting size.
  pub fn base_spacing(&self) -> f64 {
    self.motion.seg_radius(self.player.initial_length) * 2.0
  }

  pub fn orb_radius(&self) -> f64 {
    self
      .orbs
      .base_radius
      .max(self.motion.seg_radius(self.player.initial_length) * self.orbs.radius_multiplier)
  }

  pub fn from_json(raw: &str) -> anyhow::Result<Self> {
    serde_json::from_str(raw).context("invalid simulation config JSON")
  }

  /// Optional JSON file named by `SERPENT_CONFIG`, then `AI_COUNT` / `SIM_SEED` overrides.
  pub fn load() -> anyhow::Result<Self> {
    let mut config = match env::var("SERPENT_CONFIG") {
      Ok(path) => {
        let raw = fs::read_to_string(&path)
          .with_context(|| format!("failed to read config file {path}"))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse config file {path}"))?
      }
      Err(_) => Self::default(),
    };

    if let Some(count) = env::var("AI_COUNT")
      .ok()
      .and_then(|value| value.parse::<usize>().ok())
    {
      config.bots.count = count;
    }
    if let Some(seed) = env::var("SIM_SEED")
      .ok()
      .and_then(|value| value.parse::<u64>().ok())
    {
      config.seed = Some(seed);
    }

    Ok(config)
  }
}
