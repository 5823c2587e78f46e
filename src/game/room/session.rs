use std::sync::Mutex as StdMutex;
use std::sync::{Arc, PoisonError};
use tokio::sync::{mpsc, Notify};

/// Capacity of the per-session event queue. Events beyond it are dropped for that session.
pub(crate) const EVENT_QUEUE_CAPACITY: usize = 256;

/// Single-slot mailbox: a newer state frame overwrites one the socket has not sent yet.
#[derive(Debug)]
pub struct LatestFrame {
    frame: StdMutex<Option<String>>,
    notify: Notify,
}

impl LatestFrame {
    pub(crate) fn new() -> Self {
        Self {
            frame: StdMutex::new(None),
            notify: Notify::new(),
        }
    }

    pub(crate) fn store(&self, payload: String) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
        self.notify.notify_one();
    }

    pub(crate) fn take_latest(&self) -> Option<String> {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) async fn wait_for_update(&self) {
        self.notify.notified().await;
    }
}

#[derive(Debug)]
pub(crate) struct SessionEntry {
    pub(crate) state_frame: Arc<LatestFrame>,
    pub(crate) events_tx: mpsc::Sender<String>,
}

impl SessionEntry {
    /// Queues an event payload. Returns false once the socket side is gone.
    pub(crate) fn push_event(&self, session_id: &str, payload: String) -> bool {
        match self.events_tx.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(session_id, "event queue full, dropping events");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

pub struct SessionIo {
    pub session_id: String,
    pub outbound_state: Arc<LatestFrame>,
    pub outbound_events_rx: mpsc::Receiver<String>,
}

pub(crate) fn session_channel(session_id: String) -> (SessionEntry, SessionIo) {
    let state_frame = Arc::new(LatestFrame::new());
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let entry = SessionEntry {
        state_frame: Arc::clone(&state_frame),
        events_tx,
    };
    let io = SessionIo {
        session_id,
        outbound_state: state_frame,
        outbound_events_rx: events_rx,
    };
    (entry, io)
}
