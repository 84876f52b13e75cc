use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::message::Message;
use crate::Result;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Where a subscription starts reading the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetSpecification {
    #[default]
    None,
    First,
    Last,
    Next,
    Offset(i64),
    Timestamp(i64),
}

impl OffsetSpecification {
    pub fn is_offset(&self) -> bool {
        matches!(self, OffsetSpecification::Offset(_))
    }

    /// The lowest offset the consumer wants delivered, when one was given explicitly.
    pub fn floor(&self) -> Option<i64> {
        match self {
            OffsetSpecification::Offset(offset) => Some(*offset),
            _ => None,
        }
    }
}

impl FromStr for OffsetSpecification {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidOffsetSpecification(s.to_string());
        match s {
            "none" => Ok(OffsetSpecification::None),
            "first" => Ok(OffsetSpecification::First),
            "last" => Ok(OffsetSpecification::Last),
            "next" => Ok(OffsetSpecification::Next),
            _ => match s.split_once(':') {
                Some(("offset", v)) => v.parse().map(OffsetSpecification::Offset).map_err(|_| invalid()),
                Some(("timestamp", v)) => {
                    v.parse().map(OffsetSpecification::Timestamp).map_err(|_| invalid())
                }
                _ => Err(invalid()),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsumerOptions {
    pub stream_name: String,
    pub offset: OffsetSpecification,
}

impl ConsumerOptions {
    pub fn new(stream_name: impl Into<String>, offset: OffsetSpecification) -> Self {
        Self {
            stream_name: stream_name.into(),
            offset,
        }
    }
}

/// Receiving side of a consumer's delivery channels, held by the call site.
pub struct ConsumerReceiver {
    pub offsets: mpsc::Receiver<i64>,
    pub messages: mpsc::Receiver<Vec<Message>>,
}

/// Per-subscription delivery state.
#[derive(Debug)]
pub struct Consumer {
    id: u8,
    offset: AtomicI64,
    options: ConsumerOptions,
    offsets: mpsc::Sender<i64>,
    messages: mpsc::Sender<Vec<Message>>,
}

impl Consumer {
    pub fn new(id: u8, options: ConsumerOptions, capacity: usize) -> (Self, ConsumerReceiver) {
        let (offsets_tx, offsets_rx) = mpsc::channel(capacity.max(1));
        let (messages_tx, messages_rx) = mpsc::channel(capacity.max(1));
        let consumer = Self {
            id,
            offset: AtomicI64::new(options.offset.floor().unwrap_or(0)),
            options,
            offsets: offsets_tx,
            messages: messages_tx,
        };
        let receiver = ConsumerReceiver {
            offsets: offsets_rx,
            messages: messages_rx,
        };
        (consumer, receiver)
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn options(&self) -> &ConsumerOptions {
        &self.options
    }

    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::Acquire)
    }

    pub fn set_offset(&self, offset: i64) {
        self.offset.store(offset, Ordering::Release);
    }

    /// Hands one decoded chunk to the call site: the resulting offset first, then the batch.
    /// Never waits. When the call site has not drained either channel the chunk is dropped
    /// with a warning and `Ok(false)` is returned; the offset still advances.
    pub fn deliver(&self, offset: i64, batch: Vec<Message>) -> Result<bool> {
        self.set_offset(offset);
        let permits = self
            .offsets
            .try_reserve()
            .and_then(|offsets| Ok((offsets, self.messages.try_reserve()?)));
        match permits {
            Ok((offsets, messages)) => {
                offsets.send(offset);
                messages.send(batch);
                Ok(true)
            }
            Err(TrySendError::Full(())) => {
                warn!(
                    consumer = self.id,
                    offset,
                    dropped = batch.len(),
                    "consumer channels full, chunk dropped"
                );
                Ok(false)
            }
            Err(TrySendError::Closed(())) => Err(ApplicationError::ChannelClosed(format!(
                "consumer {} deliveries",
                self.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_specification() {
        assert_eq!("first".parse::<OffsetSpecification>().unwrap(), OffsetSpecification::First);
        assert_eq!(
            "offset:42".parse::<OffsetSpecification>().unwrap(),
            OffsetSpecification::Offset(42)
        );
        assert_eq!(
            "timestamp:1700000000".parse::<OffsetSpecification>().unwrap(),
            OffsetSpecification::Timestamp(1_700_000_000)
        );
        assert!("offset:abc".parse::<OffsetSpecification>().is_err());
        assert!("tail".parse::<OffsetSpecification>().is_err());
    }

    #[test]
    fn test_floor_only_for_explicit_offset() {
        assert_eq!(OffsetSpecification::Offset(10).floor(), Some(10));
        assert_eq!(OffsetSpecification::Timestamp(10).floor(), None);
        assert!(!OffsetSpecification::Last.is_offset());
    }

    #[tokio::test]
    async fn test_deliver_sends_offset_then_messages() {
        let (consumer, mut rx) = Consumer::new(1, ConsumerOptions::new("s", OffsetSpecification::Offset(5)), 4);
        assert_eq!(consumer.offset(), 5);

        assert!(consumer.deliver(9, vec![Message::new("m")]).unwrap());

        assert_eq!(rx.offsets.recv().await, Some(9));
        assert_eq!(rx.messages.recv().await.unwrap().len(), 1);
        assert_eq!(consumer.offset(), 9);
    }

    #[tokio::test]
    async fn test_deliver_to_full_channels_drops_chunk() {
        let (consumer, mut rx) = Consumer::new(3, ConsumerOptions::default(), 1);

        assert!(consumer.deliver(10, vec![Message::new("a")]).unwrap());
        assert!(!consumer.deliver(20, vec![Message::new("b")]).unwrap());
        assert_eq!(consumer.offset(), 20);

        assert_eq!(rx.offsets.recv().await, Some(10));
        assert_eq!(rx.messages.recv().await.unwrap(), vec![Message::new("a")]);
        assert!(rx.offsets.try_recv().is_err());
        assert!(rx.messages.try_recv().is_err());

        assert!(consumer.deliver(30, vec![]).unwrap());
        assert_eq!(rx.offsets.recv().await, Some(30));
    }

    #[test]
    fn test_deliver_to_dropped_receiver_fails() {
        let (consumer, rx) = Consumer::new(2, ConsumerOptions::default(), 1);
        drop(rx);

        let err = consumer.deliver(1, vec![]).unwrap_err();
        assert!(matches!(err, ApplicationError::ChannelClosed(_)));
    }
}
