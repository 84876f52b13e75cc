use bytes::{BufMut, Bytes, BytesMut};

use crate::adapters::protocol::constants::{
    CLOSE_KEY, CREDIT_KEY, RESPONSE_FLAG, TUNE_KEY, VERSION_1,
};
use super::traits::Serialize;

/// Tune reply echoing the negotiated limits back to the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuneFrame {
    pub max_frame_size: u32,
    pub heartbeat: u32,
}

impl Serialize for TuneFrame {
    fn serialize(&self, dst: &mut BytesMut) {
        dst.put_u16(TUNE_KEY | RESPONSE_FLAG);
        dst.put_u16(VERSION_1);
        dst.put_u32(self.max_frame_size);
        dst.put_u32(self.heartbeat);
    }
}

/// Acknowledgment of a broker-initiated close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseResponseFrame {
    pub correlation_id: u32,
    pub response_code: u16,
}

impl Serialize for CloseResponseFrame {
    fn serialize(&self, dst: &mut BytesMut) {
        dst.put_u16(CLOSE_KEY | RESPONSE_FLAG);
        dst.put_u16(VERSION_1);
        dst.put_u32(self.correlation_id);
        dst.put_u16(self.response_code);
    }
}

/// Credit request replenishing a subscription after a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditFrame {
    pub subscription_id: u8,
    pub credit: u16,
}

impl Serialize for CreditFrame {
    fn serialize(&self, dst: &mut BytesMut) {
        dst.put_u16(CREDIT_KEY);
        dst.put_u16(VERSION_1);
        dst.put_u8(self.subscription_id);
        dst.put_u16(self.credit);
    }
}

/// Encodes frames this client emits from inside the read loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameEncoder;

impl FrameEncoder {
    pub fn new() -> Self {
        Self
    }

    /// u32 length prefix, then the serialized frame.
    pub fn encode<F: Serialize>(&self, frame: &F) -> Bytes {
        let mut body = BytesMut::new();
        frame.serialize(&mut body);

        let mut buf = BytesMut::with_capacity(body.len() + 4);
        buf.put_u32(body.len() as u32);
        buf.put_slice(&body);
        buf.freeze()
    }
}
