use bytes::{Buf, Bytes, BytesMut};
use crate::application::error::ApplicationError;

/// 바이트 스트림으로부터 데이터를 파싱하는 trait
pub trait ByteParser {
    /// 남은 바이트가 충분한지 확인
    fn ensure_remaining(&self, buf: &Bytes, required: usize) -> Result<(), ApplicationError> {
        if buf.remaining() < required {
            return Err(ApplicationError::Protocol(
                format!("buffer too short: need {} bytes but has {}", required, buf.remaining())
            ));
        }
        Ok(())
    }
}

/// 특정 타입으로 역직렬화하는 trait
pub trait Deserialize<T> {
    fn deserialize(src: &mut Bytes) -> Result<T, ApplicationError>;
}

/// 특정 타입을 바이트로 직렬화하는 trait
pub trait Serialize {
    fn serialize(&self, dst: &mut BytesMut);
}

/// 기본 타입들의 파싱을 위한 trait (모두 big-endian)
pub trait PrimitiveParser: ByteParser {
    fn parse_u8(&self, buf: &mut Bytes) -> Result<u8, ApplicationError>;
    fn parse_u16(&self, buf: &mut Bytes) -> Result<u16, ApplicationError>;
    fn parse_i16(&self, buf: &mut Bytes) -> Result<i16, ApplicationError>;
    fn parse_u32(&self, buf: &mut Bytes) -> Result<u32, ApplicationError>;
    fn parse_i64(&self, buf: &mut Bytes) -> Result<i64, ApplicationError>;

    /// 다음 바이트를 소비하지 않고 확인. 남은 바이트가 없으면 `None`
    fn peek_u8(&self, buf: &Bytes) -> Option<u8>;
}

/// 길이 prefix가 붙은 문자열/바이트 파싱을 위한 trait
pub trait StringParser: ByteParser {
    /// u16 길이 prefix + UTF-8
    fn parse_string(&self, buf: &mut Bytes) -> Result<String, ApplicationError>;
    fn parse_byte_array(&self, buf: &mut Bytes, len: usize) -> Result<Bytes, ApplicationError>;
}

/// u32 개수 prefix 배열 파싱을 위한 trait
pub trait ArrayParser: ByteParser {
    fn parse_array<T, F>(&self, buf: &mut Bytes, parser: F) -> Result<Vec<T>, ApplicationError>
    where
        F: FnMut(&mut Bytes) -> Result<T, ApplicationError>;
}
