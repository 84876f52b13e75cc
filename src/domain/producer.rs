use crate::domain::message::Message;
use crate::domain::response_code::lookup_meaning;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct UnconfirmedMessage {
    pub publishing_id: i64,
    pub message: Message,
    pub confirmed: bool,
}

/// Notification sent to the error listener for every publishing id the broker rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishError {
    pub publishing_id: i64,
    pub code: u16,
    pub error: String,
    /// `None` when the id was not (or no longer) tracked as unconfirmed.
    pub unconfirmed: Option<UnconfirmedMessage>,
}

#[derive(Default)]
struct ProducerState {
    unconfirmed: HashMap<i64, UnconfirmedMessage>,
    confirm_listener: Option<mpsc::UnboundedSender<Vec<UnconfirmedMessage>>>,
    error_listener: Option<mpsc::UnboundedSender<PublishError>>,
}

/// Per-publisher confirmation tracker.
///
/// The dispatcher resolves ids on confirm/error frames while the publish path adds new
/// ones; both go through the same lock. Listener handoff uses unbounded channels so the
/// lock is never held while a listener does its own work.
pub struct Producer {
    id: u8,
    state: Mutex<ProducerState>,
}

impl Producer {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            state: Mutex::new(ProducerState::default()),
        }
    }

    /// A producer record with no listeners. Used when a frame names an unknown publisher so
    /// decoding can proceed; every notification through it is discarded.
    pub fn detached(id: u8) -> Self {
        Self::new(id)
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn notify_publish_confirmation(&self) -> mpsc::UnboundedReceiver<Vec<UnconfirmedMessage>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().confirm_listener = Some(tx);
        rx
    }

    pub fn notify_publish_error(&self) -> mpsc::UnboundedReceiver<PublishError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().error_listener = Some(tx);
        rx
    }

    pub fn add_unconfirmed(&self, publishing_id: i64, message: Message) {
        self.state.lock().unconfirmed.insert(
            publishing_id,
            UnconfirmedMessage {
                publishing_id,
                message,
                confirmed: false,
            },
        );
    }

    pub fn get_unconfirmed(&self, publishing_id: i64) -> Option<UnconfirmedMessage> {
        self.state.lock().unconfirmed.get(&publishing_id).cloned()
    }

    pub fn unconfirmed_count(&self) -> usize {
        self.state.lock().unconfirmed.len()
    }

    /// Resolves a confirm batch. Ids that are not tracked are skipped; the tracked ones are
    /// marked confirmed, removed, and sent to the confirm listener as a single batch.
    pub fn confirm(&self, publishing_ids: &[i64]) -> usize {
        let mut state = self.state.lock();
        let batch: Vec<UnconfirmedMessage> = publishing_ids
            .iter()
            .filter_map(|id| state.unconfirmed.remove(id))
            .map(|mut m| {
                m.confirmed = true;
                m
            })
            .collect();

        let confirmed = batch.len();
        if batch.is_empty() {
            return 0;
        }
        if let Some(listener) = &state.confirm_listener {
            if listener.send(batch).is_err() {
                debug!(producer_id = self.id, "confirm listener dropped");
            }
        }
        confirmed
    }

    /// Resolves one rejected publishing id. The listener is notified even when the id is
    /// not tracked, with `unconfirmed` left empty.
    pub fn fail(&self, publishing_id: i64, code: u16) {
        let mut state = self.state.lock();
        let unconfirmed = state.unconfirmed.remove(&publishing_id);
        if let Some(listener) = &state.error_listener {
            let error = PublishError {
                publishing_id,
                code,
                error: lookup_meaning(code),
                unconfirmed,
            };
            if listener.send(error).is_err() {
                debug!(producer_id = self.id, "error listener dropped");
            }
        }
    }
}

impl std::fmt::Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("id", &self.id)
            .field("unconfirmed", &self.unconfirmed_count())
            .finish()
    }
}
