use bytes::Bytes;
use crate::domain::message::Message;
use crate::ports::outgoing::message_decoder::MessageDecoder;

/// Default decoder: the record bytes become the message body unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawMessageDecoder;

impl RawMessageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl MessageDecoder for RawMessageDecoder {
    fn decode(&self, raw: Bytes) -> anyhow::Result<Message> {
        Ok(Message::new(raw))
    }
}
