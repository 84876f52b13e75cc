/// 프로토콜 버전. 이 클라이언트가 보내는 모든 프레임은 버전 1을 사용함
pub const VERSION_1: u16 = 1;

/// 응답 프레임은 command key의 최상위 비트를 켜서 보냄
pub const RESPONSE_FLAG: u16 = 0x8000;
pub const COMMAND_MASK: u16 = 0x7FFF;

/// Command keys
pub const DECLARE_PUBLISHER_KEY: u16 = 0x0001;
pub const PUBLISH_CONFIRM_KEY: u16 = 0x0003;
pub const PUBLISH_ERROR_KEY: u16 = 0x0004;
pub const QUERY_PUBLISHER_SEQUENCE_KEY: u16 = 0x0005;
pub const DELETE_PUBLISHER_KEY: u16 = 0x0006;
pub const SUBSCRIBE_KEY: u16 = 0x0007;
pub const DELIVER_KEY: u16 = 0x0008;
pub const CREDIT_KEY: u16 = 0x0009;
pub const QUERY_OFFSET_KEY: u16 = 0x000b;
pub const UNSUBSCRIBE_KEY: u16 = 0x000c;
pub const CREATE_STREAM_KEY: u16 = 0x000d;
pub const DELETE_STREAM_KEY: u16 = 0x000e;
pub const METADATA_KEY: u16 = 0x000f;
pub const METADATA_UPDATE_KEY: u16 = 0x0010;
pub const PEER_PROPERTIES_KEY: u16 = 0x0011;
pub const SASL_HANDSHAKE_KEY: u16 = 0x0012;
pub const SASL_AUTHENTICATE_KEY: u16 = 0x0013;
pub const TUNE_KEY: u16 = 0x0014;
pub const OPEN_KEY: u16 = 0x0015;
pub const CLOSE_KEY: u16 = 0x0016;
pub const HEARTBEAT_KEY: u16 = 0x0017;

/// Chunk type of a chunk carrying user records
pub const CHUNK_TYPE_USER: u8 = 0;

/// 레코드 엔트리의 최상위 비트가 켜져 있으면 sub-batch 엔트리
pub const SUB_BATCH_ENTRY_FLAG: u8 = 0x80;

/// Name of the waiter the Tune handler completes
pub const TUNE_WAITER: &str = "tune";

/// Frame header size after the length prefix: key(2) + version(2)
pub const HEADER_SIZE: usize = 4;
