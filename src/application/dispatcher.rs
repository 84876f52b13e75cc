use crate::adapters::incoming::frame_reader::FrameReader;
use crate::adapters::protocol::dto::FrameHeader;
use crate::application::context::ConnectionContext;
use crate::application::error::ApplicationError;
use crate::application::handlers::{routing_table, RoutingTable};
use crate::Result;
use bytes::Bytes;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Reading,
    Routing,
    Handling,
    Closed,
}

/// The connection's single reader. Pulls frames off the transport and routes each one to
/// the handler registered for its command until the stream ends or the client closes.
pub struct FrameDispatcher<R> {
    reader: FrameReader<R>,
    ctx: Arc<ConnectionContext>,
    routes: RoutingTable,
    state: DispatcherState,
}

impl<R> FrameDispatcher<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, ctx: Arc<ConnectionContext>) -> Self {
        let max_frame_size = ctx.config().max_frame_size;
        Self {
            reader: FrameReader::new(reader, max_frame_size),
            ctx,
            routes: routing_table(),
            state: DispatcherState::Reading,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Runs until the connection closes. A clean end of stream or an explicit close returns
    /// `Ok`; any other read failure is returned after the connection has been closed.
    pub async fn run(&mut self) -> Result<()> {
        let mut shutdown = self.ctx.shutdown_signal();

        let outcome = loop {
            if self.ctx.is_closed() {
                info!("client closed, stopping frame dispatcher");
                break Ok(());
            }

            self.state = DispatcherState::Reading;
            let frame = tokio::select! {
                frame = self.reader.read_frame() => frame,
                _ = shutdown.changed() => continue,
            };

            match frame {
                Ok((header, payload)) => self.dispatch(header, payload).await,
                Err(ApplicationError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("socket closed by peer");
                    break Ok(());
                }
                Err(e) => {
                    debug!("socket error: {}", e);
                    break Err(e);
                }
            }
        };

        self.state = DispatcherState::Closed;
        self.ctx.close();
        if let Err(e) = self.ctx.writer().close().await {
            debug!("error closing connection: {}", e);
        }
        outcome
    }

    /// Routes one frame. Nothing a handler reports stops the loop.
    pub async fn dispatch(&mut self, header: FrameHeader, mut payload: Bytes) {
        self.state = DispatcherState::Routing;
        let Some(command) = header.command() else {
            warn!(
                key = header.command_key(),
                length = header.length,
                "command not implemented"
            );
            trace!(payload = %hex::encode(&payload), "skipped frame");
            return;
        };
        let Some(handler) = self.routes.get(&command).cloned() else {
            warn!(?command, "no handler registered");
            return;
        };

        if header.is_misdirected() {
            debug!(?command, key = header.raw_key, "reply-only command arrived without response flag");
        }

        self.state = DispatcherState::Handling;
        trace!(?command, version = header.version, length = header.length, "handling frame");
        if let Err(e) = handler.handle(&self.ctx, &header, &mut payload).await {
            warn!(?command, "frame dropped: {}", e);
        } else if !payload.is_empty() {
            trace!(?command, trailing = payload.len(), "unread payload bytes");
        }
    }
}
