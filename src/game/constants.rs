pub const WORLD_PADDING: f64 = 50.0;
pub const WORLD_MIN_SIZE: f64 = 100.0;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 3840.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 2160.0;
pub const PLAYING_ZOOM: f64 = 1.5;
pub const GRID_CELL_SIZE: f64 = 100.0;

pub const PLAYER_INITIAL_SPEED: f64 = 45.0;
pub const PLAYER_MAX_ADDITIONAL_SPEED: f64 = 100.0;
pub const PLAYER_SPEED_LENGTH_FACTOR: f64 = 0.008;
pub const PLAYER_INITIAL_LENGTH: f64 = 10.0;
pub const PLAYER_INITIAL_SEGMENTS: usize = 10;
pub const PLAYER_COLOR: u32 = 0x00ff00;
pub const PLAYER_LENGTH_PER_ORB: f64 = 1.0;
pub const PLAYER_EAT_SPEED_BOOST: f64 = 2.0;
pub const PLAYER_EAT_SPEED_BOOST_DURATION_MS: f64 = 750.0;
pub const PLAYER_EAT_GLOW_FRAMES: u32 = 15;
pub const KEYBOARD_TURN_COOLDOWN_MS: i64 = 100;
pub const JOYSTICK_TURN_COOLDOWN_MS: i64 = 50;
pub const SAFE_PX: f64 = 192.0;
pub const MAX_NECK_SKIP_SEGMENTS: usize = 60;
pub const SELF_BITE_PREDICT_FACTOR: f64 = 1.5;
pub const MIN_NECK_SKIP_SEGMENTS: usize = 6;
pub const SELF_HIT_MARGIN: f64 = 1.0;

pub const AI_COUNT: usize = 8;
pub const AI_BASE_SPEED: f64 = 36.0;
pub const AI_VARIANCE_SPEED: f64 = 12.0;
pub const AI_SPEED_LENGTH_CAP: f64 = 200.0;
pub const AI_SPEED_PER_LENGTH: f64 = 0.15;
pub const AI_VIEW_RADIUS: f64 = 600.0;
pub const AI_VIEW_RADIUS_MIN_SCALE: f64 = 0.8;
pub const AI_VIEW_RADIUS_MAX_SCALE: f64 = 1.2;
pub const AI_TURN_COOLDOWN_MS: i64 = 80;
pub const AI_NOISE: f64 = 0.15;
pub const AI_NOISE_TIME_SCALE: f64 = 0.0005;
pub const AI_NOISE_SEED_SPAN: f64 = 9999.0;
pub const AI_NOISE_AXIS_OFFSET: f64 = 1111.0;
pub const AI_LOOK_AHEAD_SECS: f64 = 0.3;
pub const AI_DANGER_MARGIN: f64 = 2.0;
pub const AI_THREAT_DISTANCE: f64 = 120.0;
pub const AI_EVADE_DISTANCE: f64 = 100.0;
pub const AI_NECK_SKIP_SEGMENTS: usize = 6;
pub const AI_RESPAWN_DELAY_MS: i64 = 3000;

pub const ORB_DENSITY: f64 = 50.0 / (1000.0 * 1000.0);
pub const ORB_BASE_RADIUS: f64 = 12.0;
pub const ORB_RADIUS_MULTIPLIER: f64 = 3.0;
pub const ORB_LOW_VALUE: f64 = 1.0;
pub const ORB_MID_VALUE: f64 = 3.0;
pub const ORB_HIGH_VALUE: f64 = 5.0;
pub const ORB_LOW_COLOR: u32 = 0x8888ff;
pub const ORB_MID_COLOR: u32 = 0xff88ff;
pub const ORB_HIGH_COLOR: u32 = 0xffff88;
pub const ORB_LOW_WEIGHT: f64 = 6.0;
pub const ORB_MID_WEIGHT: f64 = 3.0;
pub const ORB_HIGH_WEIGHT: f64 = 1.0;
pub const CLUSTER_PROBABILITY: f64 = 0.3;
pub const MIN_CLUSTER_SIZE: usize = 4;
pub const MAX_CLUSTER_SIZE: usize = 7;
pub const CLUSTER_RADIUS: f64 = 50.0;
pub const CLUSTER_LINE_SPACING_FACTOR: f64 = 2.5;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;

pub const HEAD_ON_LENGTH_MARGIN: f64 = 5.0;
pub const ABSORB_NECK_SKIP_SEGMENTS: usize = 6;
pub const ABSORB_GLOW_MULTIPLIER: f64 = 2.0;
pub const ABSORB_BOOST_DURATION_MULTIPLIER: f64 = 1.5;

pub const SPEED_LERP_FACTOR: f64 = 0.1;
pub const SPEED_SNAP_EPSILON: f64 = 0.1;
pub const SEGMENT_GROWTH_DURATION_SECS: f64 = 0.5;
pub const SEGMENT_RADIUS_BASE: f64 = 4.0;
pub const SEGMENT_RADIUS_PER_LENGTH: f64 = 1.0 / 80.0;
pub const HEAD_RADIUS_SCALE: f64 = 1.2;
pub const TURN_REVERSE_DOT_LIMIT: f64 = -0.9;

pub const TICK_MS: u64 = 16;
pub const MAX_FRAME_DT_SECS: f64 = 0.1;

pub const WHITE: u32 = 0xffffff;
