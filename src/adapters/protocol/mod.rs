pub mod constants;
pub mod dto;
pub mod parser;

pub use parser::{BaseParser, FrameEncoder};
