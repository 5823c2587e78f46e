use super::config::SimConfig;
use super::math::{
  dot, length, lerp, lerp_color, move_towards_torus, normalize, torus_distance, wrap,
};
use super::types::{GrowthPulse, Point, Segment, SegmentSnapshot, SnakeId, SnakeSnapshot, Velocity};
use super::constants::WHITE;
use std::collections::VecDeque;

/// Who steers the serpent and which eat policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerpentKind {
  Player,
  Bot,
}

#[derive(Debug, Clone)]
pub struct Serpent {
  pub id: SnakeId,
  pub name: String,
  pub kind: SerpentKind,
  pub color: u32,
  pub visible: bool,
  pub segs: Vec<Segment>,
  pub velocity: Velocity,
  pub speed: f64,
  pub target_speed: f64,
  pub base_speed: f64,
  /// Per-bot constant in `[-variance / 2, variance / 2)` added to the bot speed curve.
  pub speed_offset: f64,
  pub length: f64,
  pub score: f64,
  pub eat_queue: VecDeque<GrowthPulse>,
  pub glow_frames: u32,
  /// Seconds of eat boost left.
  pub speed_boost_timer: f64,
  pub last_turn_at: Option<i64>,
}

pub struct SpawnSpec {
  pub id: SnakeId,
  pub name: String,
  pub kind: SerpentKind,
  pub color: u32,
  pub head: Point,
  pub speed_offset: f64,
}

impl Serpent {
  /// Lays the starting body out behind the head along -x, fully grown.
  pub fn spawn(spec: SpawnSpec, config: &SimConfig, width: f64, height: f64) -> Self {
    let spacing = config.base_spacing();
    let count = config.player.initial_segments.max(1);
    let head = wrap(spec.head, width, height);
    let segs = (0..count)
      .map(|index| {
        Segment::grown(wrap(
          Point {
            x: head.x - spacing * index as f64,
            y: head.y,
          },
          width,
          height,
        ))
      })
      .collect();

    let mut serpent = Self {
      id: spec.id,
      name: spec.name,
      kind: spec.kind,
      color: spec.color,
      visible: true,
      segs,
      velocity: Point { x: 1.0, y: 0.0 },
      speed: 0.0,
      target_speed: 0.0,
      base_speed: 0.0,
      speed_offset: spec.speed_offset,
      length: config.player.initial_length,
      score: 0.0,
      eat_queue: VecDeque::new(),
      glow_frames: 0,
      speed_boost_timer: 0.0,
      last_turn_at: None,
    };
    serpent.refresh_base_speed(config);
    serpent.speed = serpent.base_speed;
    serpent
  }

  pub fn is_player(&self) -> bool {
    self.kind == SerpentKind::Player
  }

  pub fn head(&self) -> Option<Point> {
    self.segs.first().map(Segment::point)
  }

  pub fn radius(&self, config: &SimConfig) -> f64 {
    config.motion.seg_radius(self.length)
  }

  pub fn head_radius(&self, config: &SimConfig) -> f64 {
    self.radius(config) * config.motion.head_radius_scale
  }

  /// Sum of link lengths head to tail.
  pub fn path_length(&self, width: f64, height: f64) -> f64 {
    self
      .segs
      .windows(2)
      .map(|pair| torus_distance(pair[0].point(), pair[1].point(), width, height))
      .sum()
  }

  /// Recomputes the length-driven floor speed. Outside a boost the target follows it.
  pub fn refresh_base_speed(&mut self, config: &SimConfig) {
    self.base_speed = match self.kind {
      SerpentKind::Player => {
        let player = &config.player;
        let grown = self.length - player.initial_length;
        let extra =
          player.max_additional_speed * (1.0 - (-grown * player.speed_length_factor).exp());
        player.initial_speed + extra.max(0.0)
      }
      SerpentKind::Bot => {
        let bots = &config.bots;
        bots.base_speed
          + self.speed_offset
          + self.length.min(bots.speed_length_cap) * bots.speed_per_length
      }
    };
    if self.speed_boost_timer <= 0.0 {
      self.target_speed = self.base_speed;
    }
  }

  /// One simulation step. Phases run in a fixed order.
  pub fn update(&mut self, dt: f64, width: f64, height: f64, config: &SimConfig) {
    if !self.visible || self.segs.is_empty() {
      return;
    }
    let motion = &config.motion;

    self.speed = lerp(self.speed, self.target_speed, motion.speed_lerp_factor);
    if (self.speed - self.target_speed).abs() < motion.speed_snap_epsilon {
      self.speed = self.target_speed;
    }

    self.advance_growth_pulses(dt, width, height);

    if motion.growth_duration_secs > 0.0 {
      let step = dt / motion.growth_duration_secs;
      for seg in self.segs.iter_mut().filter(|seg| seg.is_growing) {
        seg.growth_progress += step;
        if seg.growth_progress >= 1.0 {
          seg.growth_progress = 1.0;
          seg.is_growing = false;
        }
      }
    }

    let travel = self.speed * dt;
    let head = &mut self.segs[0];
    let moved = wrap(
      Point {
        x: head.x + self.velocity.x * travel,
        y: head.y + self.velocity.y * travel,
      },
      width,
      height,
    );
    head.x = moved.x;
    head.y = moved.y;

    let base_spacing = config.base_spacing();
    for index in 1..self.segs.len() {
      let ahead = self.segs[index - 1];
      let current = self.segs[index];
      let spacing = base_spacing * (ahead.growth_progress + current.growth_progress) * 0.5;
      let placed = move_towards_torus(ahead.point(), current.point(), spacing, width, height);
      self.segs[index].x = placed.x;
      self.segs[index].y = placed.y;
    }

    if self.speed_boost_timer > 0.0 {
      self.speed_boost_timer -= dt;
      if self.speed_boost_timer <= 0.0 {
        self.speed_boost_timer = 0.0;
        self.target_speed = self.base_speed;
      }
    }
    self.glow_frames = self.glow_frames.saturating_sub(1);
  }

  fn advance_growth_pulses(&mut self, dt: f64, width: f64, height: f64) {
    if self.eat_queue.is_empty() {
      return;
    }
    let path = self.path_length(width, height);
    let travel = self.speed * dt;
    let mut sprouts = 0usize;
    self.eat_queue.retain_mut(|pulse| {
      pulse.distance_traveled += travel;
      if pulse.distance_traveled >= path {
        sprouts += pulse.growth_amount.max(0.0).floor() as usize;
        false
      } else {
        true
      }
    });
    if sprouts == 0 {
      return;
    }
    let Some(tail) = self.segs.last().map(Segment::point) else { return };
    self
      .segs
      .extend(std::iter::repeat(Segment::sprouting(tail)).take(sprouts));
  }

  /// The shared ledger update: length, score and a pending growth pulse.
  pub fn eat_orb(&mut self, orb_value: f64, growth_amount: f64) {
    self.length += growth_amount;
    self.score += orb_value;
    self.eat_queue.push_back(GrowthPulse {
      distance_traveled: 0.0,
      growth_amount,
    });
  }

  /// Eats with the kind-specific growth rule and triggers the eat boost.
  pub fn consume_orb(&mut self, orb_value: f64, config: &SimConfig) {
    let growth = match self.kind {
      SerpentKind::Player => orb_value * config.player.length_per_orb,
      SerpentKind::Bot => orb_value,
    };
    self.eat_orb(orb_value, growth);
    self.glow_frames = config.player.eat_glow_frames;
    self.target_speed = self.base_speed * config.player.eat_speed_boost;
    self.speed_boost_timer = config.player.eat_boost_duration_ms / 1000.0;
  }

  /// Takes over a defeated serpent's length, score and body past its neck.
  pub fn absorb(&mut self, loser_length: f64, loser_score: f64, loser_tail: &[Segment], config: &SimConfig) {
    let player = &config.player;
    let collision = &config.collision;
    self.length += loser_length;
    self.score += loser_score;
    self.segs.extend_from_slice(loser_tail);
    self.glow_frames = (player.eat_glow_frames as f64 * collision.absorb_glow_multiplier).round() as u32;
    self.target_speed = self.base_speed * player.eat_speed_boost;
    self.speed = self.target_speed;
    self.speed_boost_timer =
      player.eat_boost_duration_ms / 1000.0 * collision.absorb_boost_duration_multiplier;
  }

  /// Segments past the neck, the part handed over on absorption.
  pub fn absorbable_tail(&self, config: &SimConfig) -> &[Segment] {
    let skip = config.collision.absorb_neck_skip_segments.min(self.segs.len());
    &self.segs[skip..]
  }

  pub fn kill(&mut self) {
    self.visible = false;
  }

  /// Number of head-adjacent segments exempt from collision checks.
  ///
  /// The time to cover `safe_px` times the segments passed per second reduces to
  /// `safe_px / spacing`, so the window is the same at every positive speed. A
  /// stopped serpent falls back to the full limit.
  pub fn calculate_skip_segments(&self, config: &SimConfig) -> usize {
    let player = &config.player;
    let limit = player
      .max_neck_skip_segments
      .min(self.segs.len().saturating_sub(1));
    if self.speed <= 0.0 {
      return limit;
    }
    let spacing = config.base_spacing();
    let distance_segments = (player.safe_px / self.speed) * (self.speed / spacing);
    if !distance_segments.is_finite() {
      return limit;
    }
    (distance_segments.round().max(0.0) as usize).min(limit)
  }

  /// True when `point` touches this serpent's own body past the neck.
  pub fn will_hit_tail(
    &self,
    point: Point,
    skip: usize,
    width: f64,
    height: f64,
    config: &SimConfig,
  ) -> bool {
    if self.segs.len() < 2 {
      return false;
    }
    let threshold = self.radius(config) + config.player.self_hit_margin;
    let start = config
      .player
      .min_neck_skip_segments
      .max(skip.min(self.segs.len() - 1));
    self
      .segs
      .iter()
      .skip(start)
      .any(|seg| torus_distance(point, seg.point(), width, height) < threshold)
  }

  pub fn self_collides(&self, width: f64, height: f64, config: &SimConfig) -> bool {
    let Some(head) = self.head() else { return false };
    let skip = self.calculate_skip_segments(config);
    self.will_hit_tail(head, skip, width, height, config)
  }

  /// Accepts a new heading unless it is on cooldown, a near reversal, or (player
  /// only) predicted to bite the body.
  pub fn attempt_turn(
    &mut self,
    desired: Point,
    now: i64,
    cooldown_ms: i64,
    width: f64,
    height: f64,
    config: &SimConfig,
  ) -> bool {
    if let Some(last) = self.last_turn_at {
      if now - last <= cooldown_ms {
        return false;
      }
    }
    let direction = normalize(desired);
    if length(direction) == 0.0 {
      return false;
    }
    if dot(direction, self.velocity) < config.motion.reverse_dot_limit {
      return false;
    }
    if self.is_player() {
      let Some(head) = self.head() else { return false };
      let reach = self.speed * config.player.self_bite_predict_factor;
      let predicted = wrap(
        Point {
          x: head.x + direction.x * reach,
          y: head.y + direction.y * reach,
        },
        width,
        height,
      );
      let skip = self.calculate_skip_segments(config);
      if self.will_hit_tail(predicted, skip, width, height, config) {
        return false;
      }
    }
    self.velocity = direction;
    self.last_turn_at = Some(now);
    true
  }

  pub fn snapshot(&self, config: &SimConfig) -> SnakeSnapshot {
    let radius = self.radius(config);
    let glow_scale = (config.player.eat_glow_frames as f64).max(1.0);
    SnakeSnapshot {
      id: self.id,
      name: self.name.clone(),
      is_player: self.is_player(),
      color: lerp_color(self.color, WHITE, self.glow_frames as f64 / glow_scale),
      length: self.length,
      score: self.score,
      head_radius: self.head_radius(config),
      segments: self
        .segs
        .iter()
        .map(|seg| SegmentSnapshot {
          x: seg.x,
          y: seg.y,
          radius: radius * seg.growth_progress,
        })
        .collect(),
      skip_segments: self
        .is_player()
        .then(|| self.calculate_skip_segments(config)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const W: f64 = 1000.0;
  const H: f64 = 800.0;

  fn make_snake(kind: SerpentKind, head: Point) -> Serpent {
    Serpent::spawn(
      SpawnSpec {
        id: SnakeId(1),
        name: "Test".to_string(),
        kind,
        color: 0x00ff00,
        head,
        speed_offset: 0.0,
      },
      &SimConfig::default(),
      W,
      H,
    )
  }

  fn line_body(xs: &[f64]) -> Vec<Segment> {
    xs.iter()
      .map(|x| Segment::grown(Point { x: *x, y: 0.0 }))
      .collect()
  }

  #[test]
  fn spawn_lays_body_behind_head() {
    let snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    let config = SimConfig::default();
    assert_eq!(snake.segs.len(), 10);
    assert_eq!(snake.speed, 45.0);
    for pair in snake.segs.windows(2) {
      let gap = torus_distance(pair[0].point(), pair[1].point(), W, H);
      assert!((gap - config.base_spacing()).abs() < 1e-9);
      assert!(pair[1].x < pair[0].x);
    }
  }

  #[test]
  fn spacing_holds_while_crossing_the_seam() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 470.0, y: 0.0 });
    for _ in 0..120 {
      snake.refresh_base_speed(&config);
      snake.update(1.0 / 60.0, W, H, &config);
    }
    let head = snake.head().unwrap();
    assert!(head.x < 0.0, "head should have wrapped, got {}", head.x);
    for pair in snake.segs.windows(2) {
      let gap = torus_distance(pair[0].point(), pair[1].point(), W, H);
      assert!((gap - config.base_spacing()).abs() < 1e-6, "gap {gap}");
    }
  }

  #[test]
  fn growth_pulse_adds_segments_exactly_once() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    let before = snake.segs.len();
    snake.eat_orb(3.0, 3.0);
    for _ in 0..300 {
      snake.update(1.0 / 60.0, W, H, &config);
    }
    assert_eq!(snake.segs.len(), before + 3);
    assert!(snake.eat_queue.is_empty());
    assert_eq!(snake.length, 13.0);
    assert_eq!(snake.score, 3.0);
    assert!(snake.segs.iter().all(|seg| !seg.is_growing));
  }

  #[test]
  fn fractional_growth_rounds_down() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    let before = snake.segs.len();
    snake.eat_orb(1.0, 2.7);
    for _ in 0..300 {
      snake.update(1.0 / 60.0, W, H, &config);
    }
    assert_eq!(snake.segs.len(), before + 2);
  }

  #[test]
  fn sprouting_segments_start_at_zero_progress() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    snake.segs.truncate(1);
    snake.eat_orb(1.0, 1.0);
    snake.update(0.001, W, H, &config);
    assert_eq!(snake.segs.len(), 2);
    assert!(snake.segs[1].is_growing);
    assert!(snake.segs[1].growth_progress < 0.01);
  }

  #[test]
  fn consume_orb_applies_player_boost() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    snake.consume_orb(5.0, &config);
    assert_eq!(snake.length, 15.0);
    assert_eq!(snake.glow_frames, 15);
    assert_eq!(snake.target_speed, snake.base_speed * 2.0);
    assert!((snake.speed_boost_timer - 0.75).abs() < 1e-9);
  }

  #[test]
  fn boost_expiry_restores_base_target() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    snake.consume_orb(1.0, &config);
    for _ in 0..60 {
      snake.update(1.0 / 60.0, W, H, &config);
    }
    assert_eq!(snake.speed_boost_timer, 0.0);
    assert_eq!(snake.target_speed, snake.base_speed);
    assert_eq!(snake.glow_frames, 0);
  }

  #[test]
  fn player_base_speed_grows_with_length() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    assert_eq!(snake.base_speed, 45.0);
    snake.length = 110.0;
    snake.refresh_base_speed(&config);
    let expected = 45.0 + 100.0 * (1.0 - (-100.0f64 * 0.008).exp());
    assert!((snake.base_speed - expected).abs() < 1e-9);
  }

  #[test]
  fn bot_base_speed_caps_length_contribution() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    snake.speed_offset = 4.0;
    snake.length = 500.0;
    snake.refresh_base_speed(&config);
    assert!((snake.base_speed - (36.0 + 4.0 + 30.0)).abs() < 1e-9);
  }

  #[test]
  fn turn_within_cooldown_is_rejected() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    assert!(snake.attempt_turn(Point { x: 0.0, y: 1.0 }, 1_000, 80, W, H, &config));
    assert!(!snake.attempt_turn(Point { x: 1.0, y: 0.0 }, 1_050, 80, W, H, &config));
    assert!(!snake.attempt_turn(Point { x: 1.0, y: 0.0 }, 1_080, 80, W, H, &config));
    assert_eq!(snake.velocity, Point { x: 0.0, y: 1.0 });
    assert!(snake.attempt_turn(Point { x: 1.0, y: 0.0 }, 1_081, 80, W, H, &config));
  }

  #[test]
  fn reversal_is_always_rejected() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    assert!(!snake.attempt_turn(Point { x: -1.0, y: 0.05 }, 10_000, 0, W, H, &config));
    assert_eq!(snake.velocity, Point { x: 1.0, y: 0.0 });
    assert_eq!(snake.last_turn_at, None);
  }

  #[test]
  fn zero_direction_is_rejected() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    assert!(!snake.attempt_turn(Point { x: 0.0, y: 0.0 }, 10_000, 0, W, H, &config));
  }

  #[test]
  fn self_bite_turn_is_rejected_and_alternative_accepted() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    let spacing = config.base_spacing();
    let mut segs: Vec<Segment> = (0..30)
      .map(|index| Segment::grown(Point { x: -spacing * index as f64, y: 0.0 }))
      .collect();
    segs.push(Segment::grown(Point { x: 0.0, y: 67.5 }));
    snake.segs = segs;
    assert_eq!(snake.calculate_skip_segments(&config), 23);

    assert!(!snake.attempt_turn(Point { x: 0.0, y: 1.0 }, 1_000, 100, W, H, &config));
    assert_eq!(snake.velocity, Point { x: 1.0, y: 0.0 });
    assert!(snake.attempt_turn(Point { x: 0.0, y: -1.0 }, 1_000, 100, W, H, &config));
    assert_eq!(snake.velocity, Point { x: 0.0, y: -1.0 });
  }

  #[test]
  fn skip_segments_clamp_to_body() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    assert_eq!(snake.calculate_skip_segments(&config), 9);
    snake.speed = 0.0;
    assert_eq!(snake.calculate_skip_segments(&config), 9);
    snake.segs = line_body(&(0..100).map(|i| -(i as f64) * 8.25).collect::<Vec<_>>());
    assert_eq!(snake.calculate_skip_segments(&config), 60);
  }

  #[test]
  fn skip_window_is_speed_independent_while_moving() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    snake.segs = line_body(&(0..100).map(|i| -(i as f64) * 8.25).collect::<Vec<_>>());
    snake.speed = 20.0;
    let slow = snake.calculate_skip_segments(&config);
    snake.speed = 140.0;
    assert_eq!(snake.calculate_skip_segments(&config), slow);
    snake.speed = 0.0;
    assert_eq!(snake.calculate_skip_segments(&config), 60);
  }

  #[test]
  fn absorb_transfers_ledger_and_body() {
    let config = SimConfig::default();
    let mut winner = make_snake(SerpentKind::Bot, Point { x: 0.0, y: 0.0 });
    let mut loser = make_snake(SerpentKind::Bot, Point { x: 100.0, y: 100.0 });
    loser.score = 7.0;
    loser.length = 12.0;
    let tail = loser.absorbable_tail(&config).to_vec();
    assert_eq!(tail.len(), 4);
    winner.absorb(loser.length, loser.score, &tail, &config);
    assert_eq!(winner.length, 22.0);
    assert_eq!(winner.score, 7.0);
    assert_eq!(winner.segs.len(), 14);
    assert_eq!(winner.glow_frames, 30);
    assert!((winner.speed_boost_timer - 1.125).abs() < 1e-9);
    assert_eq!(winner.speed, winner.base_speed * 2.0);
    loser.kill();
    assert!(!loser.visible);
  }

  #[test]
  fn snapshot_tints_glow_and_reports_player_neck() {
    let config = SimConfig::default();
    let mut snake = make_snake(SerpentKind::Player, Point { x: 0.0, y: 0.0 });
    snake.glow_frames = 15;
    let snapshot = snake.snapshot(&config);
    assert_eq!(snapshot.color, WHITE);
    assert_eq!(snapshot.skip_segments, Some(9));
    assert!((snapshot.head_radius - 4.125 * 1.2).abs() < 1e-9);
    assert_eq!(snapshot.segments.len(), 10);
  }
}
