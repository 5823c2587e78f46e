use super::config::PlayerConfig;
use super::math::{length, normalize};
use super::types::Point;
use serde::Deserialize;

/// Cooldown tier of the device that produced a steering vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
  #[default]
  Keyboard,
  Joystick,
}

impl InputSource {
  pub fn cooldown_ms(self, config: &PlayerConfig) -> i64 {
    match self {
      InputSource::Keyboard => config.keyboard_turn_cooldown_ms,
      InputSource::Joystick => config.joystick_turn_cooldown_ms,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringInput {
  pub direction: Point,
  pub source: InputSource,
}

pub fn parse_direction(value: Point) -> Option<Point> {
  if !value.x.is_finite() || !value.y.is_finite() {
    return None;
  }
  let normalized = normalize(value);
  if length(normalized) == 0.0 {
    return None;
  }
  Some(normalized)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_direction_normalizes() {
    let parsed = parse_direction(Point { x: 3.0, y: 4.0 }).unwrap();
    assert!((parsed.x - 0.6).abs() < 1e-12);
    assert!((parsed.y - 0.8).abs() < 1e-12);
  }

  #[test]
  fn parse_direction_rejects_degenerate_input() {
    assert!(parse_direction(Point { x: 0.0, y: 0.0 }).is_none());
    assert!(parse_direction(Point { x: f64::NAN, y: 1.0 }).is_none());
    assert!(parse_direction(Point { x: f64::INFINITY, y: 1.0 }).is_none());
  }

  #[test]
  fn joystick_turns_faster_than_keyboard() {
    let config = PlayerConfig::default();
    assert_eq!(InputSource::Keyboard.cooldown_ms(&config), 100);
    assert_eq!(InputSource::Joystick.cooldown_ms(&config), 50);
  }
}
