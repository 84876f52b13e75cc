use crate::adapters::protocol::dto::FrameHeader;
use crate::application::context::ConnectionContext;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Handles the payload of one received frame. `payload` starts right after the header.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &ConnectionContext,
        header: &FrameHeader,
        payload: &mut Bytes,
    ) -> Result<()>;
}
