use crate::adapters::outgoing::stream_writer::StreamWriter;
use crate::application::context::ConnectionContext;
use crate::application::dispatcher::FrameDispatcher;
use crate::config::AppConfig;
use crate::Result;
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};

/// One client connection to a stream broker. The read half feeds the dispatcher; the write
/// half is shared through the context by everything that sends frames.
pub struct TcpAdapter {
    ctx: Arc<ConnectionContext>,
    dispatcher: FrameDispatcher<OwnedReadHalf>,
}

impl TcpAdapter {
    pub async fn connect<A: ToSocketAddrs>(addr: A, config: AppConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        info!(%peer, "connected to broker");

        let (reader, writer) = stream.into_split();
        let ctx = Arc::new(ConnectionContext::new(
            config,
            Arc::new(StreamWriter::new(writer)),
        ));
        let dispatcher = FrameDispatcher::new(reader, Arc::clone(&ctx));
        Ok(Self { ctx, dispatcher })
    }

    pub fn context(&self) -> Arc<ConnectionContext> {
        Arc::clone(&self.ctx)
    }

    /// Drives the read loop until the broker hangs up or the context is closed.
    pub async fn run(mut self) -> Result<()> {
        let result = self.dispatcher.run().await;
        debug!(state = ?self.dispatcher.state(), "connection finished");
        result
    }
}
