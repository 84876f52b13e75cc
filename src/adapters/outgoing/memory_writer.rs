use async_trait::async_trait;
use bytes::Bytes;
use crate::application::ApplicationError;
use crate::ports::outgoing::frame_writer::FrameWriter;
use crate::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Records written frames in memory instead of sending them anywhere.
#[derive(Clone, Default)]
pub struct MemoryFrameWriter {
    frames: Arc<RwLock<Vec<Bytes>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryFrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn frames(&self) -> Vec<Bytes> {
        self.frames.read().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameWriter for MemoryFrameWriter {
    async fn write_frame(&self, frame: Bytes) -> Result<()> {
        if self.is_closed() {
            return Err(ApplicationError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "writer closed",
            )));
        }
        self.frames.write().await.push(frame);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
