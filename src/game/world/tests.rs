use super::*;
use crate::game::input::InputSource;
use crate::game::types::Segment;

fn make_config(bots: usize) -> SimConfig {
  let mut config = SimConfig::default();
  config.bots.count = bots;
  config.seed = Some(7);
  config
}

fn make_world(bots: usize) -> World {
  let mut world = World::new(make_config(bots));
  assert!(world.start(Some("Tester")));
  world
}

fn bot_index(world: &World) -> usize {
  world
    .entities
    .snakes
    .iter()
    .position(|snake| !snake.is_player())
    .expect("a bot")
}

/// Lays a bot straight along +y so that its body crosses the origin.
fn park_bot_across_origin(world: &mut World) {
  let index = bot_index(world);
  let spacing = world.config.base_spacing();
  let bot = &mut world.entities.snakes[index];
  bot.velocity = Point { x: 0.0, y: -1.0 };
  for (i, seg) in bot.segs.iter_mut().enumerate() {
    *seg = Segment::grown(Point {
      x: 0.0,
      y: -60.0 + spacing * i as f64,
    });
  }
}

#[test]
fn start_builds_a_fresh_session() {
  let world = make_world(3);
  assert_eq!(world.phase(), GamePhase::Playing);
  assert!(world.entities.snakes[0].is_player());
  assert_eq!(world.entities.snakes[0].name, "Tester");
  assert_eq!(world.entities.bot_count(), 3);
  assert_eq!(world.entities.brains.len(), 3);
  assert!(!world.entities.orbs.is_empty());
  assert!(world.grid.is_some());
  let head = world.entities.snakes[0].head().unwrap();
  assert_eq!(head, Point { x: 0.0, y: 0.0 });
}

#[test]
fn start_is_rejected_while_playing() {
  let mut world = make_world(1);
  let token = world.session_token();
  assert!(!world.start(None));
  assert_eq!(world.session_token(), token);
}

#[test]
fn bots_get_distinct_hues() {
  let world = make_world(3);
  let colors: Vec<u32> = world
    .entities
    .snakes
    .iter()
    .filter(|snake| !snake.is_player())
    .map(|snake| snake.color)
    .collect();
  assert_eq!(colors, vec![0x3f_ffff, 0x7f_ffff, 0xbf_ffff]);
}

#[test]
fn ticks_outside_play_do_nothing() {
  let mut world = World::new(make_config(1));
  assert!(world.tick(0.016, 0).is_empty());
  assert!(world.entities.snakes.is_empty());

  let mut world = make_world(1);
  assert!(world.pause());
  let before = world.entities.snakes[0].head();
  assert!(world.tick(0.016, 16).is_empty());
  assert_eq!(world.entities.snakes[0].head(), before);
  assert!(world.resume());
  world.tick(0.016, 32);
  assert_ne!(world.entities.snakes[0].head(), before);
}

#[test]
fn player_moves_with_clamped_dt() {
  let mut world = make_world(0);
  world.entities.orbs.clear();
  world.tick(5.0, 0);
  let head = world.entities.snakes[0].head().unwrap();
  assert!((head.x - 45.0 * MAX_FRAME_DT_SECS).abs() < 1e-9);
}

#[test]
fn input_steers_the_player() {
  let mut world = make_world(0);
  world.entities.orbs.clear();
  world.set_input(Some(SteeringInput {
    direction: Point { x: 0.0, y: 1.0 },
    source: InputSource::Joystick,
  }));
  world.tick(0.016, 1_000);
  assert_eq!(world.entities.snakes[0].velocity, Point { x: 0.0, y: 1.0 });
  assert_eq!(world.entities.snakes[0].last_turn_at, Some(1_000));
}

#[test]
fn ramming_a_bot_body_ends_the_game() {
  let mut world = make_world(1);
  world.entities.orbs.clear();
  park_bot_across_origin(&mut world);
  let events = world.tick(0.0, 1_000);
  assert_eq!(world.phase(), GamePhase::GameOver);
  assert!(events.iter().any(|event| matches!(
    event,
    GameEvent::Killed { is_player: true, .. }
  )));
  assert!(events
    .iter()
    .any(|event| matches!(event, GameEvent::GameOver { .. })));
  assert!(world.tick(0.016, 1_016).is_empty());
}

#[test]
fn dead_bot_respawns_after_delay() {
  let mut world = make_world(2);
  world.entities.orbs.clear();
  let index = bot_index(&world);
  let dead_id = world.entities.snakes[index].id;
  world.entities.snakes[index].kill();

  world.tick(0.0, 1_000);
  assert_eq!(world.entities.bot_count(), 1);
  assert!(world.entities.get(dead_id).is_none());
  assert_eq!(world.pending_respawns(), 1);

  let events = world.tick(0.0, 3_999);
  assert!(!events
    .iter()
    .any(|event| matches!(event, GameEvent::BotRespawned { .. })));

  let events = world.tick(0.0, 4_000);
  assert!(events
    .iter()
    .any(|event| matches!(event, GameEvent::BotRespawned { .. })));
  assert_eq!(world.entities.bot_count(), 2);
  assert_eq!(world.pending_respawns(), 0);
}

#[test]
fn return_to_menu_cancels_pending_respawns() {
  let mut world = make_world(2);
  let index = bot_index(&world);
  world.entities.snakes[index].kill();
  world.tick(0.0, 1_000);
  assert_eq!(world.pending_respawns(), 1);

  world.return_to_menu();
  assert_eq!(world.phase(), GamePhase::Menu);
  assert_eq!(world.pending_respawns(), 0);
  assert!(world.grid.is_none());
  assert!(world.entities.snakes.is_empty());
}

#[test]
fn stale_respawn_is_ignored() {
  let mut world = make_world(2);
  let index = bot_index(&world);
  world.entities.snakes[index].kill();
  world.tick(0.0, 1_000);
  let stale_token = world.session_token().wrapping_sub(1);
  world.pending_respawns[0].token = stale_token;

  let events = world.tick(0.0, 10_000);
  assert!(!events
    .iter()
    .any(|event| matches!(event, GameEvent::BotRespawned { .. })));
  assert_eq!(world.entities.bot_count(), 1);
  assert_eq!(world.pending_respawns(), 0);
}

#[test]
fn respawns_never_exceed_bot_count() {
  let mut world = make_world(2);
  let token = world.session_token();
  world.pending_respawns.push(PendingRespawn {
    token,
    due_at_ms: 0,
  });
  world.tick(0.0, 10);
  assert_eq!(world.entities.bot_count(), 2);
  assert_eq!(world.pending_respawns(), 0);
}

#[test]
fn resize_changes_toroidal_extent() {
  let mut world = make_world(0);
  world.resize(1000.0, 500.0);
  assert_eq!(world.size(), (1400.0, 650.0));
  world.resize(10.0, 10.0);
  assert_eq!(world.size(), (100.0, 100.0));
}

#[test]
fn shrinking_the_world_rewraps_entities() {
  let mut world = make_world(2);
  world.resize(1000.0, 500.0);
  let (width, height) = world.size();
  let inside = |x: f64, y: f64| x >= -width / 2.0 && x < width / 2.0 && y >= -height / 2.0 && y < height / 2.0;
  assert!(world.entities.orbs.iter().all(|orb| inside(orb.x, orb.y)));
  for snake in &world.entities.snakes {
    assert!(snake.segs.iter().all(|seg| inside(seg.x, seg.y)));
  }
}

#[test]
fn leaderboard_is_sorted_by_score() {
  let mut world = make_world(2);
  world.entities.snakes[1].score = 9.0;
  world.entities.snakes[2].score = 3.0;
  world.entities.snakes[0].score = 5.0;
  let board = world.leaderboard();
  let scores: Vec<f64> = board.iter().map(|entry| entry.score).collect();
  assert_eq!(scores, vec![9.0, 5.0, 3.0]);
  assert!(board[1].is_player);
}

#[test]
fn snapshot_skips_invisible_entities() {
  let mut world = make_world(2);
  world.entities.snakes[2].kill();
  world.entities.orbs[0].visible = false;
  let orb_count = world.entities.orbs.len();
  let snapshot = world.snapshot(5);
  assert_eq!(snapshot.snakes.len(), 2);
  assert_eq!(snapshot.orbs.len(), orb_count - 1);
  assert_eq!(snapshot.phase, GamePhase::Playing);
  assert_eq!(snapshot.leaderboard.len(), 2);
}

#[test]
fn seeded_sessions_replay_identically() {
  let run = || {
    let mut world = make_world(4);
    for step in 0..240 {
      world.tick(1.0 / 60.0, step * 16);
    }
    serde_json::to_string(&world.snapshot(0)).unwrap()
  };
  assert_eq!(run(), run());
}

#[test]
fn long_run_keeps_entities_inside_the_world() {
  let mut world = make_world(8);
  for step in 0..600 {
    world.tick(1.0 / 60.0, step * 16);
    if world.phase() != GamePhase::Playing {
      break;
    }
  }
  let (width, height) = world.size();
  for snake in world.entities.snakes.iter().filter(|snake| snake.visible) {
    assert!(!snake.segs.is_empty());
    for seg in &snake.segs {
      assert!(seg.x >= -width / 2.0 && seg.x < width / 2.0);
      assert!(seg.y >= -height / 2.0 && seg.y < height / 2.0);
    }
  }
  assert!(world.entities.bot_count() <= 8);
}
