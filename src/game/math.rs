use super::types::Point;

pub fn length(point: Point) -> f64 {
  point.x.hypot(point.y)
}

pub fn normalize(point: Point) -> Point {
  let len = length(point);
  if !len.is_finite() || len == 0.0 {
    return Point { x: 0.0, y: 0.0 };
  }
  Point {
    x: point.x / len,
    y: point.y / len,
  }
}

/// Normalizes with a magnitude of zero treated as one, so the result is finite
/// and a zero vector stays zero.
pub fn normalize_or_unit(point: Point) -> Point {
  let len = length(point);
  let len = if len.is_finite() && len > 0.0 { len } else { 1.0 };
  Point {
    x: point.x / len,
    y: point.y / len,
  }
}

pub fn dot(a: Point, b: Point) -> f64 {
  a.x * b.x + a.y * b.y
}

pub fn distance(a: Point, b: Point) -> f64 {
  (a.x - b.x).hypot(a.y - b.y)
}

pub fn torus_distance(a: Point, b: Point, width: f64, height: f64) -> f64 {
  let mut dx = (a.x - b.x).abs();
  let mut dy = (a.y - b.y).abs();
  if dx > width * 0.5 {
    dx = width - dx;
  }
  if dy > height * 0.5 {
    dy = height - dy;
  }
  dx.hypot(dy)
}

fn wrap_axis(value: f64, size: f64) -> f64 {
  let half = size * 0.5;
  let mut wrapped = value;
  if wrapped >= half {
    wrapped -= size;
  } else if wrapped < -half {
    wrapped += size;
  }
  if wrapped >= half || wrapped < -half {
    // More than one world-width away; only reachable from bad input.
    wrapped = (wrapped + half).rem_euclid(size) - half;
  }
  // Rounding can land exactly on the open edge.
  if wrapped >= half {
    wrapped -= size;
  }
  wrapped
}

/// Maps a point back into `[-W/2, W/2) x [-H/2, H/2)`.
pub fn wrap(point: Point, width: f64, height: f64) -> Point {
  Point {
    x: wrap_axis(point.x, width),
    y: wrap_axis(point.y, height),
  }
}

fn delta_axis(target: f64, current: f64, size: f64) -> f64 {
  let half = size * 0.5;
  let mut delta = target - current;
  if delta > half {
    delta -= size;
  } else if delta < -half {
    delta += size;
  }
  delta
}

/// Signed shortest-path delta from `current` to `target` on the torus.
pub fn torus_delta(target: Point, current: Point, width: f64, height: f64) -> Point {
  Point {
    x: delta_axis(target.x, current.x, width),
    y: delta_axis(target.y, current.y, height),
  }
}

/// The point `distance` away from `target`, on the shortest path from `target`
/// toward `current`, wrapped into the world.
pub fn move_towards_torus(
  target: Point,
  current: Point,
  distance: f64,
  width: f64,
  height: f64,
) -> Point {
  let delta = torus_delta(current, target, width, height);
  let dir = normalize_or_unit(delta);
  wrap(
    Point {
      x: target.x + dir.x * distance,
      y: target.y + dir.y * distance,
    },
    width,
    height,
  )
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
  let t = clamp(t, 0.0, 1.0);
  a + (b - a) * t
}

/// Per-channel interpolation of two `0xRRGGBB` colours.
pub fn lerp_color(from: u32, to: u32, t: f64) -> u32 {
  let t = clamp(t, 0.0, 1.0);
  let channel = |shift: u32| {
    let a = ((from >> shift) & 0xff) as f64;
    let b = ((to >> shift) & 0xff) as f64;
    (lerp(a, b, t).round() as u32).min(0xff) << shift
  };
  channel(16) | channel(8) | channel(0)
}

fn hash2(seed: u32, x: i32, y: i32) -> f64 {
  let mut h = seed ^ 0x9e3779b9;
  h = (h ^ x as u32).wrapping_mul(0x85ebca6b);
  h = (h ^ y as u32).wrapping_mul(0xc2b2ae35);
  h ^= h >> 16;
  h = h.wrapping_mul(0x27d4eb2f);
  h ^= h >> 15;
  (h as f64) / 4294967296.0
}

fn smoothstep(t: f64) -> f64 {
  t * t * (3.0 - 2.0 * t)
}

/// Smooth 2D value noise in `[-1, 1]`.
pub fn value_noise_2d(seed: u32, x: f64, y: f64) -> f64 {
  let x0 = x.floor();
  let y0 = y.floor();
  let tx = smoothstep(x - x0);
  let ty = smoothstep(y - y0);
  let ix = x0 as i32;
  let iy = y0 as i32;
  let c00 = hash2(seed, ix, iy);
  let c10 = hash2(seed, ix.wrapping_add(1), iy);
  let c01 = hash2(seed, ix, iy.wrapping_add(1));
  let c11 = hash2(seed, ix.wrapping_add(1), iy.wrapping_add(1));
  let top = lerp(c00, c10, tx);
  let bottom = lerp(c01, c11, tx);
  lerp(top, bottom, ty) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  const W: f64 = 1000.0;
  const H: f64 = 600.0;

  fn p(x: f64, y: f64) -> Point {
    Point { x, y }
  }

  #[test]
  fn torus_distance_takes_the_seam_shortcut() {
    let a = p(-490.0, 0.0);
    let b = p(490.0, 0.0);
    assert!((torus_distance(a, b, W, H) - 20.0).abs() < 1e-9);
    assert!((distance(a, b) - 980.0).abs() < 1e-9);
  }

  #[test]
  fn wrap_maps_right_edge_to_left_edge() {
    let wrapped = wrap(p(500.0, -300.0), W, H);
    assert_eq!(wrapped.x, -500.0);
    assert_eq!(wrapped.y, -300.0);
    let wrapped = wrap(p(505.0, 310.0), W, H);
    assert!((wrapped.x + 495.0).abs() < 1e-9);
    assert!((wrapped.y + 290.0).abs() < 1e-9);
  }

  #[test]
  fn torus_delta_points_across_the_seam() {
    let delta = torus_delta(p(495.0, 0.0), p(-495.0, 0.0), W, H);
    assert!((delta.x + 10.0).abs() < 1e-9);
    assert_eq!(delta.y, 0.0);
  }

  #[test]
  fn move_towards_torus_keeps_exact_distance_across_seam() {
    let target = p(498.0, 0.0);
    let current = p(-480.0, 0.0);
    let moved = move_towards_torus(target, current, 8.0, W, H);
    assert!((torus_distance(target, moved, W, H) - 8.0).abs() < 1e-9);
    assert!(moved.x < 0.0, "follower should sit past the seam, got {}", moved.x);
  }

  #[test]
  fn move_towards_torus_with_coincident_points_returns_target() {
    let target = p(10.0, 10.0);
    let moved = move_towards_torus(target, target, 8.0, W, H);
    assert_eq!(moved, target);
  }

  #[test]
  fn lerp_clamps_t() {
    assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
    assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
  }

  #[test]
  fn lerp_color_blends_channels() {
    assert_eq!(lerp_color(0x000000, 0xffffff, 0.0), 0x000000);
    assert_eq!(lerp_color(0x000000, 0xffffff, 1.0), 0xffffff);
    assert_eq!(lerp_color(0xff0000, 0x0000ff, 0.5), 0x800080);
    assert_eq!(lerp_color(0x00ff00, 0xffffff, 7.0), 0xffffff);
  }

  #[test]
  fn value_noise_is_bounded_and_continuous() {
    let mut previous = value_noise_2d(7, 3.0, 0.0);
    for step in 1..200 {
      let t = step as f64 * 0.01;
      let sample = value_noise_2d(7, 3.0, t);
      assert!((-1.0..=1.0).contains(&sample));
      assert!((sample - previous).abs() < 0.1);
      previous = sample;
    }
  }

  #[test]
  fn normalize_zero_vector_is_zero() {
    assert_eq!(normalize(p(0.0, 0.0)), p(0.0, 0.0));
    assert_eq!(normalize_or_unit(p(0.0, 0.0)), p(0.0, 0.0));
  }

  proptest! {
    #[test]
    fn torus_distance_is_symmetric_and_never_longer(
      ax in -500.0f64..500.0, ay in -300.0f64..300.0,
      bx in -500.0f64..500.0, by in -300.0f64..300.0,
    ) {
      let a = p(ax, ay);
      let b = p(bx, by);
      prop_assert_eq!(torus_distance(a, b, W, H), torus_distance(b, a, W, H));
      prop_assert!(torus_distance(a, b, W, H) <= distance(a, b) + 1e-9);
    }

    #[test]
    fn wrap_is_idempotent(x in -1500.0f64..1500.0, y in -900.0f64..900.0) {
      let once = wrap(p(x, y), W, H);
      prop_assert_eq!(wrap(once, W, H), once);
      prop_assert!(once.x >= -W / 2.0 && once.x < W / 2.0);
      prop_assert!(once.y >= -H / 2.0 && once.y < H / 2.0);
    }
  }
}
