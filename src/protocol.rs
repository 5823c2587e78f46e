use crate::game::input::InputSource;
use crate::game::types::WorldSnapshot;
use crate::game::world::GameEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
  Start {
    #[serde(default)]
    name: Option<String>,
  },
  Input {
    x: f64,
    y: f64,
    #[serde(default)]
    source: InputSource,
  },
  /// Steering released; the serpent keeps its heading.
  Release,
  Pause,
  Resume,
  Menu,
  Resize {
    width: f64,
    height: f64,
  },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
  #[serde(rename_all = "camelCase")]
  Welcome { session_id: &'a str, room: &'a str },
  State { snapshot: &'a WorldSnapshot },
  Events { events: &'a [GameEvent] },
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  match serde_json::from_str(text) {
    Ok(message) => Some(message),
    Err(err) => {
      tracing::debug!(error = %err, "ignoring malformed client message");
      None
    }
  }
}

pub fn encode_server_message(message: &ServerMessage<'_>) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(err) => {
      tracing::warn!(error = %err, "failed to encode server message");
      None
    }
  }
}
