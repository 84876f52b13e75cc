use async_trait::async_trait;
use bytes::Bytes;
use crate::ports::outgoing::frame_writer::FrameWriter;
use crate::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// `FrameWriter` over any async byte sink. Frames from concurrent callers never interleave.
pub struct StreamWriter<W> {
    inner: Mutex<W>,
}

impl<W> StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

#[async_trait]
impl<W> FrameWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_frame(&self, frame: Bytes) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.write_all(&frame).await?;
        inner.flush().await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.inner.lock().await.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_writes_whole_frames() {
        let (client, mut server) = tokio::io::duplex(64);
        let writer = StreamWriter::new(client);

        writer.write_frame(Bytes::from_static(&[0, 0, 0, 4, 0, 0x17, 0, 1])).await.unwrap();
        writer.close().await.unwrap();

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, vec![0, 0, 0, 4, 0, 0x17, 0, 1]);
    }
}
