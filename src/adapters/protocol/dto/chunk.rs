use bytes::Bytes;

use crate::adapters::protocol::constants::CHUNK_TYPE_USER;
use crate::adapters::protocol::parser::{BaseParser, Deserialize, PrimitiveParser};
use crate::application::error::ApplicationError;

/// Header of an osiris chunk carried by a Deliver frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub magic_version: u8,
    pub chunk_type: u8,
    pub num_entries: u16,
    pub num_records: u32,
    pub timestamp: i64,
    pub epoch: i64,
    /// Offset of the first record in the chunk.
    pub chunk_first_offset: i64,
    // crc and sizes are read but not verified
    pub crc: u32,
    pub data_length: u32,
    pub trailer_length: u32,
    pub reserved: u32,
}

impl ChunkHeader {
    pub fn is_user_chunk(&self) -> bool {
        self.chunk_type == CHUNK_TYPE_USER
    }
}

impl Deserialize<ChunkHeader> for ChunkHeader {
    fn deserialize(src: &mut Bytes) -> Result<ChunkHeader, ApplicationError> {
        let parser = BaseParser;
        Ok(ChunkHeader {
            magic_version: parser.parse_u8(src)?,
            chunk_type: parser.parse_u8(src)?,
            num_entries: parser.parse_u16(src)?,
            num_records: parser.parse_u32(src)?,
            timestamp: parser.parse_i64(src)?,
            epoch: parser.parse_i64(src)?,
            chunk_first_offset: parser.parse_i64(src)?,
            crc: parser.parse_u32(src)?,
            data_length: parser.parse_u32(src)?,
            trailer_length: parser.parse_u32(src)?,
            reserved: parser.parse_u32(src)?,
        })
    }
}
