use crate::adapters::protocol::FrameEncoder;
use crate::application::coordinator::Coordinator;
use crate::config::{AppConfig, ClientConfig};
use crate::domain::consumer::{Consumer, ConsumerOptions, ConsumerReceiver};
use crate::domain::message::MetadataUpdateEvent;
use crate::ports::outgoing::frame_writer::FrameWriter;
use crate::ports::outgoing::message_decoder::MessageDecoder;
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Everything the read loop and the request-issuing call sites of one connection share.
/// Created with the connection and dropped with it.
pub struct ConnectionContext {
    coordinator: Arc<Coordinator>,
    writer: Arc<dyn FrameWriter>,
    decoder: Arc<dyn MessageDecoder>,
    encoder: FrameEncoder,
    config: ClientConfig,
    metadata_listener: Mutex<Option<mpsc::UnboundedSender<MetadataUpdateEvent>>>,
    shutdown: watch::Sender<bool>,
}

impl ConnectionContext {
    pub fn new(config: AppConfig, writer: Arc<dyn FrameWriter>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            coordinator: Arc::new(Coordinator::new()),
            writer,
            decoder: config.decoder,
            encoder: FrameEncoder::new(),
            config: config.client,
            metadata_listener: Mutex::new(None),
            shutdown,
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn writer(&self) -> &Arc<dyn FrameWriter> {
        &self.writer
    }

    pub fn decoder(&self) -> &Arc<dyn MessageDecoder> {
        &self.decoder
    }

    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Creates a consumer for `id` with the configured channel capacity and registers it so
    /// Deliver frames reach it.
    pub fn register_consumer(&self, id: u8, options: ConsumerOptions) -> Result<ConsumerReceiver> {
        let (consumer, receiver) =
            Consumer::new(id, options, self.config.consumer_channel_capacity);
        self.coordinator.register_consumer(Arc::new(consumer))?;
        Ok(receiver)
    }

    /// Registers the listener for metadata updates, replacing any previous one.
    pub fn notify_metadata_update(&self) -> mpsc::UnboundedReceiver<MetadataUpdateEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.metadata_listener.lock() = Some(tx);
        rx
    }

    pub fn publish_metadata_update(&self, event: MetadataUpdateEvent) {
        let listener = self.metadata_listener.lock();
        match listener.as_ref() {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!("metadata update listener dropped");
                }
            }
            None => debug!(stream = %event.stream_name, "no metadata update listener"),
        }
    }

    /// Asks the read loop to stop. The loop closes the transport on its way out.
    pub fn close(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}
