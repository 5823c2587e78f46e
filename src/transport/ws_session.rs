use crate::game::room::Room;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

pub async fn handle_socket(socket: WebSocket, room: Arc<Room>) {
    let (mut sender, mut receiver) = socket.split();
    let session = room.add_session().await;
    let session_id = session.session_id;
    let outbound_state = session.outbound_state;
    let mut outbound_events_rx = session.outbound_events_rx;
    tracing::debug!(room = room.name(), session_id, "socket connected");

    let send_task = tokio::spawn(async move {
        loop {
            let mut pending_events = Vec::new();
            tokio::select! {
                payload = outbound_events_rx.recv() => {
                    let Some(payload) = payload else { return };
                    pending_events.push(payload);
                }
                _ = outbound_state.wait_for_update() => {}
            }

            while let Ok(payload) = outbound_events_rx.try_recv() {
                pending_events.push(payload);
            }

            // Events go out before the state frame they led to.
            for payload in pending_events {
                if sender.send(Message::Text(payload)).await.is_err() {
                    return;
                }
            }
            if let Some(payload) = outbound_state.take_latest() {
                if sender.send(Message::Text(payload)).await.is_err() {
                    return;
                }
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                if !room.handle_text_message(&session_id, &text).await {
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!(session_id, "binary frames are not supported, ignoring");
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    room.remove_session(&session_id).await;
    send_task.abort();
    let remaining = room.session_count().await;
    tracing::debug!(room = room.name(), remaining, "socket closed");
}
