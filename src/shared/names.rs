use rand::seq::SliceRandom;
use rand::Rng;

pub const MAX_PLAYER_NAME_LENGTH: usize = 20;
pub const MAX_SESSION_NAME_LENGTH: usize = 64;

static BOT_NAME_ADJECTIVES: &[&str] = &[
  "Amber", "Brisk", "Coiled", "Dusky", "Emerald", "Fickle", "Gilded", "Hollow", "Ivory", "Jade",
  "Keen", "Lazy", "Mossy", "Nimble", "Onyx", "Pale", "Quiet", "Rusty", "Silent", "Tawny",
  "Umber", "Velvet", "Wiry", "Zesty",
];

static BOT_NAME_NOUNS: &[&str] = &[
  "Adder", "Boa", "Cobra", "Krait", "Mamba", "Python", "Racer", "Taipan", "Viper", "Whip",
  "Coil", "Fang", "Scale", "Slither", "Rattle", "Sidewinder",
];

pub fn sanitize_player_name(name: &str, fallback: &str) -> String {
  let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
  if cleaned.is_empty() {
    return fallback.to_string();
  }
  cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}

/// Keeps `[A-Za-z0-9_-]`, capped in length. Empty input maps to `fallback`.
pub fn sanitize_session_name(value: &str, fallback: &str) -> String {
  let cleaned: String = value
    .chars()
    .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
    .take(MAX_SESSION_NAME_LENGTH)
    .collect();
  if cleaned.is_empty() {
    fallback.to_string()
  } else {
    cleaned
  }
}

pub fn random_bot_name<R: Rng>(rng: &mut R) -> String {
  let adjective = BOT_NAME_ADJECTIVES.choose(rng).copied().unwrap_or("Swift");
  let noun = BOT_NAME_NOUNS.choose(rng).copied().unwrap_or("Serpent");
  sanitize_player_name(&format!("{adjective} {noun}"), "Bot")
}
