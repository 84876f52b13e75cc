use crate::domain::message::Message;
use bytes::Bytes;

/// Turns the raw bytes of one record into a message envelope.
pub trait MessageDecoder: Send + Sync {
    fn decode(&self, raw: Bytes) -> anyhow::Result<Message>;
}
