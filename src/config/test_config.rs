use std::sync::Arc;
use bytes::Bytes;
use crate::domain::message::Message;
use crate::ports::outgoing::message_decoder::MessageDecoder;
use super::app_config::{AppConfig, ClientConfig};

/// Rejects records whose body starts with `0xFF`, passes everything else through.
pub struct MockMessageDecoder;

impl MockMessageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl MessageDecoder for MockMessageDecoder {
    fn decode(&self, raw: Bytes) -> anyhow::Result<Message> {
        if raw.first() == Some(&0xFF) {
            anyhow::bail!("malformed envelope");
        }
        Ok(Message::new(raw))
    }
}

pub fn create_test_config() -> AppConfig {
    AppConfig::with_custom_components(
        ClientConfig {
            consumer_channel_capacity: 8,
            ..ClientConfig::default()
        },
        Arc::new(MockMessageDecoder::new()),
    )
}
