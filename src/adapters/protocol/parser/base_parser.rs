use bytes::{Buf, Bytes};
use crate::application::error::ApplicationError;
use super::traits::*;

/// 기본 파서 구현을 제공하는 구조체
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseParser;

impl ByteParser for BaseParser {}

impl PrimitiveParser for BaseParser {
    fn parse_u8(&self, buf: &mut Bytes) -> Result<u8, ApplicationError> {
        self.ensure_remaining(buf, 1)?;
        Ok(buf.get_u8())
    }

    fn parse_u16(&self, buf: &mut Bytes) -> Result<u16, ApplicationError> {
        self.ensure_remaining(buf, 2)?;
        Ok(buf.get_u16())
    }

    fn parse_i16(&self, buf: &mut Bytes) -> Result<i16, ApplicationError> {
        self.ensure_remaining(buf, 2)?;
        Ok(buf.get_i16())
    }

    fn parse_u32(&self, buf: &mut Bytes) -> Result<u32, ApplicationError> {
        self.ensure_remaining(buf, 4)?;
        Ok(buf.get_u32())
    }

    fn parse_i64(&self, buf: &mut Bytes) -> Result<i64, ApplicationError> {
        self.ensure_remaining(buf, 8)?;
        Ok(buf.get_i64())
    }

    fn peek_u8(&self, buf: &Bytes) -> Option<u8> {
        buf.first().copied()
    }
}

impl StringParser for BaseParser {
    fn parse_string(&self, buf: &mut Bytes) -> Result<String, ApplicationError> {
        let len = self.parse_u16(buf)? as usize;
        let bytes = self.parse_byte_array(buf, len)?;
        utf8(bytes)
    }

    fn parse_byte_array(&self, buf: &mut Bytes, len: usize) -> Result<Bytes, ApplicationError> {
        self.ensure_remaining(buf, len)?;
        Ok(buf.split_to(len))
    }
}

impl ArrayParser for BaseParser {
    fn parse_array<T, F>(&self, buf: &mut Bytes, mut parser: F) -> Result<Vec<T>, ApplicationError>
    where
        F: FnMut(&mut Bytes) -> Result<T, ApplicationError>,
    {
        let count = self.parse_u32(buf)? as usize;

        // count는 신뢰할 수 없는 값이라 남은 바이트 수로 용량을 제한함
        let mut items = Vec::with_capacity(count.min(buf.remaining()));
        for _ in 0..count {
            items.push(parser(buf)?);
        }

        Ok(items)
    }
}

fn utf8(bytes: Bytes) -> Result<String, ApplicationError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ApplicationError::Protocol(format!("invalid UTF-8 sequence: {}", e)))
}
