use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Write side of the transport. Each call writes one complete frame.
#[async_trait]
pub trait FrameWriter: Send + Sync {
    async fn write_frame(&self, frame: Bytes) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
