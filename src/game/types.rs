use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

/// Unit-length heading. Speed is tracked separately on the serpent.
pub type Velocity = Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
  pub x: f64,
  pub y: f64,
  pub is_growing: bool,
  pub growth_progress: f64,
}

impl Segment {
  pub fn grown(point: Point) -> Self {
    Self {
      x: point.x,
      y: point.y,
      is_growing: false,
      growth_progress: 1.0,
    }
  }

  pub fn sprouting(point: Point) -> Self {
    Self {
      x: point.x,
      y: point.y,
      is_growing: true,
      growth_progress: 0.0,
    }
  }

  pub fn point(&self) -> Point {
    Point {
      x: self.x,
      y: self.y,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPulse {
  pub distance_traveled: f64,
  pub growth_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SnakeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OrbId(pub u32);

/// What a spatial grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
  Snake(SnakeId),
  Orb(OrbId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbTier {
  Low,
  Mid,
  High,
}

impl OrbTier {
  pub const ALL: [OrbTier; 3] = [OrbTier::Low, OrbTier::Mid, OrbTier::High];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
  pub id: OrbId,
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub tier: OrbTier,
  pub value: f64,
  pub color: u32,
  pub visible: bool,
}

impl Orb {
  pub fn point(&self) -> Point {
    Point {
      x: self.x,
      y: self.y,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
  Menu,
  Playing,
  Paused,
  GameOver,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentSnapshot {
  pub x: f64,
  pub y: f64,
  pub radius: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeSnapshot {
  pub id: SnakeId,
  pub name: String,
  pub is_player: bool,
  pub color: u32,
  pub length: f64,
  pub score: f64,
  pub head_radius: f64,
  pub segments: Vec<SegmentSnapshot>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub skip_segments: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbSnapshot {
  pub id: OrbId,
  pub x: f64,
  pub y: f64,
  pub radius: f64,
  pub tier: OrbTier,
  pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub name: String,
  pub score: f64,
  pub is_player: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
  pub now: i64,
  pub phase: GamePhase,
  pub width: f64,
  pub height: f64,
  pub snakes: Vec<SnakeSnapshot>,
  pub orbs: Vec<OrbSnapshot>,
  pub leaderboard: Vec<LeaderboardEntry>,
}
