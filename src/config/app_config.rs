use crate::adapters::outgoing::raw_decoder::RawMessageDecoder;
use crate::ports::outgoing::message_decoder::MessageDecoder;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub consumer_channel_capacity: usize, // 컨슈머별 offset/message 채널 크기
    pub credits_per_chunk: u16,           // chunk 하나 받을 때마다 돌려주는 credit
    pub max_frame_size: u32,              // 0이면 제한 없음
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            consumer_channel_capacity: 64,
            credits_per_chunk: 1,
            max_frame_size: 0,
        }
    }
}

pub struct AppConfig {
    pub client: ClientConfig,
    pub decoder: Arc<dyn MessageDecoder>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            client: ClientConfig::default(),
            decoder: Arc::new(RawMessageDecoder::new()),
        }
    }

    pub fn with_custom_components(client: ClientConfig, decoder: Arc<dyn MessageDecoder>) -> Self {
        Self { client, decoder }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
