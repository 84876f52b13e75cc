use crate::adapters::protocol::constants::HEADER_SIZE;
use crate::adapters::protocol::dto::FrameHeader;
use crate::application::ApplicationError;
use crate::Result;
use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

/// Reads length-prefixed frames off the read side of the transport.
pub struct FrameReader<R> {
    inner: BufReader<R>,
    max_frame_size: u32,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(inner: R, max_frame_size: u32) -> Self {
        Self {
            inner: BufReader::new(inner),
            max_frame_size,
        }
    }

    /// Reads one whole frame. Returns the header and the payload that follows it.
    /// Any failure here leaves the stream unframed and is fatal for the connection.
    pub async fn read_frame(&mut self) -> Result<(FrameHeader, Bytes)> {
        // 1. 프레임 크기 읽기
        let length = self.inner.read_u32().await?;
        if (length as usize) < HEADER_SIZE {
            return Err(ApplicationError::Protocol(format!(
                "frame length {} shorter than header",
                length
            )));
        }
        if self.max_frame_size > 0 && length > self.max_frame_size {
            return Err(ApplicationError::Protocol(format!(
                "frame length {} exceeds max frame size {}",
                length, self.max_frame_size
            )));
        }

        // 2. 프레임 데이터 읽기
        // 길이는 검증 전 값이라 실제로 도착한 만큼만 버퍼를 키움
        let mut data = Vec::new();
        (&mut self.inner)
            .take(u64::from(length))
            .read_to_end(&mut data)
            .await?;
        if data.len() < length as usize {
            return Err(ApplicationError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("frame body ended after {} of {} bytes", data.len(), length),
            )));
        }
        let mut body = Bytes::from(data);

        // 3. 헤더 파싱
        let raw_key = body.get_u16();
        let version = body.get_u16();

        Ok((
            FrameHeader {
                length,
                raw_key,
                version,
            },
            body,
        ))
    }
}
