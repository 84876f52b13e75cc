use bytes::Bytes;

/// Decoded message envelope handed to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub body: Bytes,
}

impl Message {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }
}

/// Broker notification that a stream changed (e.g. it was deleted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUpdateEvent {
    pub stream_name: String,
    pub code: u16,
}
